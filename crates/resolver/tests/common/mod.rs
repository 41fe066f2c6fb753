//! Scripted providers that count their calls
#![allow(dead_code)]

use async_trait::async_trait;
use rendezvous_core::config::ResolverConfig;
use rendezvous_core::retry::RetryConfig;
use rendezvous_geo::Coordinate;
use rendezvous_resolver::{
    BestLocation, CandidateLocation, LegStatus, Participant, PhotoResolver, PlacesProvider,
    ProgressEvent, ProviderError, Resolver, StoreError, TravelTimeProvider, TripStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const TRIP: &str = "trip-1";

pub fn ok(duration_secs: u64) -> LegStatus {
    LegStatus::Ok { duration_secs }
}

/// Participants at (0,0), (0,2), (2,0)
pub fn three_participants() -> Vec<Participant> {
    vec![
        Participant::located("alice", 0.0, 0.0),
        Participant::located("bob", 0.0, 2.0),
        Participant::located("carol", 2.0, 0.0),
    ]
}

pub fn venue(name: &str, latitude: f64, longitude: f64) -> CandidateLocation {
    CandidateLocation {
        name: name.into(),
        latitude,
        longitude,
        address: format!("{name} Street 1"),
        external_id: format!("place-{}", name.to_lowercase()),
        photos: Vec::new(),
    }
}

pub fn c1() -> CandidateLocation {
    venue("C1", 0.6, 0.6)
}

pub fn c2() -> CandidateLocation {
    venue("C2", 0.7, 0.7)
}

pub fn c3() -> CandidateLocation {
    venue("C3", 0.65, 0.65)
}

/// Resolver config with instant persistence retries
pub fn test_config() -> ResolverConfig {
    ResolverConfig {
        persist_retry: RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        },
        ..ResolverConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Trip store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ScriptedStore {
    participants: Option<Vec<Participant>>,
    failing_writes: AtomicUsize,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    saved: Mutex<Option<BestLocation>>,
}

impl ScriptedStore {
    pub fn with_participants(participants: Vec<Participant>) -> Self {
        Self {
            participants: Some(participants),
            ..Self::default()
        }
    }

    /// No trip at all
    pub fn missing_trip() -> Self {
        Self::default()
    }

    /// The next `n` writes fail with a retryable backend error
    pub fn failing_writes(self, n: usize) -> Self {
        self.failing_writes.store(n, Ordering::SeqCst);
        self
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> Option<BestLocation> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl TripStore for ScriptedStore {
    async fn get_participants(&self, trip_id: &str) -> Result<Vec<Participant>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.participants
            .clone()
            .ok_or_else(|| StoreError::TripNotFound(trip_id.to_string()))
    }

    async fn set_best_location(&self, _trip_id: &str, best: &BestLocation) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Backend("connection reset".into()));
        }
        *self.saved.lock().unwrap() = Some(best.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Places provider
// ---------------------------------------------------------------------------

pub struct ScriptedPlaces {
    response: Result<Vec<CandidateLocation>, ProviderError>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedPlaces {
    pub fn returning(candidates: Vec<CandidateLocation>) -> Self {
        Self {
            response: Ok(candidates),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            response: Err(error),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesProvider for ScriptedPlaces {
    async fn search_nearby(
        &self,
        _centre: Coordinate,
        _radius_meters: u32,
        _category: &str,
    ) -> Result<Vec<CandidateLocation>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Travel-time provider
// ---------------------------------------------------------------------------

struct Route {
    destination: Coordinate,
    legs: Vec<LegStatus>,
    delay: Duration,
}

/// Answers by destination; unknown destinations get a provider error
#[derive(Default)]
pub struct ScriptedTravel {
    routes: Vec<Route>,
    cancel_on_call: Option<(usize, CancellationToken)>,
    pub calls: AtomicUsize,
    pub origins_seen: Mutex<Vec<usize>>,
}

impl ScriptedTravel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, to: &CandidateLocation, legs: Vec<LegStatus>) -> Self {
        self.delayed_route(to, legs, Duration::ZERO)
    }

    pub fn delayed_route(
        mut self,
        to: &CandidateLocation,
        legs: Vec<LegStatus>,
        delay: Duration,
    ) -> Self {
        self.routes.push(Route {
            destination: to.coordinate(),
            legs,
            delay,
        });
        self
    }

    /// Cancel `token` when the `call`-th query (1-based) arrives
    pub fn cancel_on(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TravelTimeProvider for ScriptedTravel {
    async fn matrix(
        &self,
        origins: &[Coordinate],
        destination: Coordinate,
        _mode: &str,
    ) -> Result<Vec<LegStatus>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.origins_seen.lock().unwrap().push(origins.len());
        if let Some((at, token)) = &self.cancel_on_call {
            if *at == call {
                token.cancel();
            }
        }

        let Some(route) = self.routes.iter().find(|r| r.destination == destination) else {
            return Err(ProviderError::new(
                rendezvous_resolver::ProviderErrorKind::Transport,
                "no route scripted",
            ));
        };
        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }
        Ok(route.legs.clone())
    }
}

// ---------------------------------------------------------------------------
// Photos and progress
// ---------------------------------------------------------------------------

pub struct FakePhotos;

impl PhotoResolver for FakePhotos {
    fn resolve_photo_url(&self, external_id: &str, photo_ref: &str, max_width: u32) -> String {
        format!("https://photos.test/{external_id}/{photo_ref}?w={max_width}")
    }
}

/// Collects every progress event
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<ProgressEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl rendezvous_resolver::ProgressSink for Recorder {
    fn report(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Fakes plus a resolver wired to them
pub struct Harness {
    pub store: Arc<ScriptedStore>,
    pub places: Arc<ScriptedPlaces>,
    pub travel: Arc<ScriptedTravel>,
    pub resolver: Resolver,
}

impl Harness {
    pub fn new(store: ScriptedStore, places: ScriptedPlaces, travel: ScriptedTravel) -> Self {
        Self::with_config(store, places, travel, test_config())
    }

    pub fn with_config(
        store: ScriptedStore,
        places: ScriptedPlaces,
        travel: ScriptedTravel,
        config: ResolverConfig,
    ) -> Self {
        let store = Arc::new(store);
        let places = Arc::new(places);
        let travel = Arc::new(travel);
        let resolver = Resolver::new(store.clone(), places.clone(), travel.clone())
            .with_photo_resolver(Arc::new(FakePhotos))
            .with_config(config);
        Self {
            store,
            places,
            travel,
            resolver,
        }
    }
}
