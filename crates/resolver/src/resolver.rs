//! Resolution run orchestration
//!
//! Drives one [`ResolutionRun`] through the pipeline:
//!
//! 1. Participant Locator: read located participants from the trip store
//! 2. Midpoint: arithmetic mean of their starting points
//! 3. Candidate Finder: venues of the configured category around the midpoint
//! 4. Cost Evaluator / Selector: one travel-time query per candidate, folded
//!    in provider order with a strict `<`
//! 5. Finalize: expand photos and overwrite the trip's best location
//!
//! Every external call is raced against the caller's [`CancellationToken`].
//! A cancelled run never writes.

use crate::candidates::{find_candidates, CandidateSearch, SearchArea};
use crate::error::{ResolveError, Result, StoreError};
use crate::evaluator::{improve, BestSoFar, CandidateScore, Evaluator};
use crate::locator::locate_participants;
use crate::model::{BestLocation, CandidateLocation, TripId};
use crate::progress::ProgressSink;
use crate::providers::{PhotoResolver, PlacesProvider, RawPhotoReferences, TravelTimeProvider, TripStore};
use crate::run::{ResolutionRun, RunStatus, Stage};
use futures::stream::{self, StreamExt};
use rendezvous_core::config::ResolverConfig;
use rendezvous_core::retry::{retry_async, RetryError};
use rendezvous_geo::{midpoint, Coordinate};
use rendezvous_telemetry::{metrics, Timer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Trip resolved
    pub trip_id: TripId,
    /// Participants' midpoint, the search centre
    pub midpoint: Coordinate,
    /// Participants that had a starting location
    pub participants: usize,
    /// The winning venue as returned by the places provider
    pub winner: CandidateLocation,
    /// The record written to the trip store
    pub best: BestLocation,
    /// Winner's aggregate travel cost in seconds
    pub cost: f64,
    /// Every evaluated candidate, in provider order
    pub scores: Vec<CandidateScore>,
}

/// Per-trip run serialisation. Entries are dropped once no run holds them.
#[derive(Default)]
struct TripLocks {
    locks: Mutex<HashMap<TripId, Arc<tokio::sync::Mutex<()>>>>,
}

impl TripLocks {
    fn for_trip(&self, trip_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(trip_id.to_string()).or_default())
    }
}

/// Best meeting point resolver
pub struct Resolver {
    store: Arc<dyn TripStore>,
    places: Arc<dyn PlacesProvider>,
    travel: Arc<dyn TravelTimeProvider>,
    photos: Arc<dyn PhotoResolver>,
    config: ResolverConfig,
    locks: TripLocks,
}

impl Resolver {
    /// Resolver with default configuration. Photo references are kept as-is
    /// until a [`PhotoResolver`] is set.
    pub fn new(
        store: Arc<dyn TripStore>,
        places: Arc<dyn PlacesProvider>,
        travel: Arc<dyn TravelTimeProvider>,
    ) -> Self {
        Self {
            store,
            places,
            travel,
            photos: Arc::new(RawPhotoReferences),
            config: ResolverConfig::default(),
            locks: TripLocks::default(),
        }
    }

    /// Use `photos` to expand the winner's photo references
    #[must_use]
    pub fn with_photo_resolver(mut self, photos: Arc<dyn PhotoResolver>) -> Self {
        self.photos = photos;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Find and persist the best meeting point for `trip_id`.
    ///
    /// Progress goes to `progress` in order. Runs for the same trip are
    /// serialised; runs for different trips proceed independently.
    #[instrument(skip(self, progress, cancel))]
    pub async fn resolve_best_location(
        &self,
        trip_id: &str,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        let _timer = Timer::start("resolution.duration_ms");
        metrics().increment("resolution.runs_started");
        let mut run = ResolutionRun::new(trip_id);

        let lock = self.locks.for_trip(trip_id);
        let guard = until_cancelled(cancel, trip_id, Stage::WaitingForTrip, lock.lock()).await;
        let _guard = match guard {
            Ok(guard) => guard,
            Err(err) => return Err(fail(&mut run, progress, err)),
        };

        match self.execute(&mut run, progress, cancel).await {
            Ok(resolution) => {
                metrics().increment("resolution.runs_succeeded");
                info!(
                    winner = %resolution.best.name,
                    cost = resolution.cost,
                    candidates = resolution.scores.len(),
                    participants = resolution.participants,
                    "Best location resolved"
                );
                Ok(resolution)
            }
            Err(err) => Err(fail(&mut run, progress, err)),
        }
    }

    /// Write a previously resolved winner again, typically after
    /// [`ResolveError::PersistenceFailed`].
    #[instrument(skip(self, resolution), fields(trip_id = %resolution.trip_id))]
    pub async fn persist_best(&self, resolution: &Resolution) -> Result<()> {
        let lock = self.locks.for_trip(&resolution.trip_id);
        let _guard = lock.lock().await;

        self.write_best(&resolution.trip_id, &resolution.best)
            .await
            .map(|attempts| debug!(attempts, "Best location saved"))
            .map_err(|RetryError { last_error, attempts }| ResolveError::PersistenceFailed {
                trip_id: resolution.trip_id.clone(),
                resolution: Box::new(resolution.clone()),
                attempts,
                source: last_error,
            })
    }

    async fn execute(
        &self,
        run: &mut ResolutionRun,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        let trip_id = run.trip_id().to_string();
        let config = &self.config;

        advance(run, progress, RunStatus::ComputingMidpoint, "Locating participants")?;
        let located = until_cancelled(
            cancel,
            &trip_id,
            Stage::LocatingParticipants,
            locate_participants(self.store.as_ref(), &trip_id),
        )
        .await?
        .map_err(|source| match source {
            StoreError::TripNotFound(_) => ResolveError::TripNotFound {
                trip_id: trip_id.clone(),
            },
            source => ResolveError::Store {
                trip_id: trip_id.clone(),
                source,
            },
        })?;

        let origins: Vec<Coordinate> = located.iter().map(|p| p.origin).collect();
        let centre = midpoint(&origins).map_err(|_| ResolveError::NoParticipants {
            trip_id: trip_id.clone(),
        })?;
        metrics().gauge("resolution.participants_located", origins.len() as u64);
        debug!(%centre, participants = origins.len(), "Midpoint computed");

        advance(
            run,
            progress,
            RunStatus::FetchingCandidates,
            format!("Searching for {} near {centre}", config.category),
        )?;
        let area = SearchArea {
            centre,
            radius_meters: config.search_radius_meters,
            category: config.category.clone(),
        };
        let CandidateSearch {
            candidates,
            discarded,
        } = until_cancelled(
            cancel,
            &trip_id,
            Stage::FetchingCandidates,
            find_candidates(self.places.as_ref(), &area, config.places_timeout()),
        )
        .await?
        .map_err(|source| ResolveError::RetrievalFailed {
            trip_id: trip_id.clone(),
            source,
        })?;
        metrics().gauge("resolution.candidates_found", candidates.len() as u64);
        if candidates.is_empty() {
            return Err(ResolveError::NoCandidatesFound {
                trip_id,
                midpoint: centre,
                discarded,
            });
        }

        let participants = origins.len();
        let evaluator = Evaluator::new(
            self.travel.as_ref(),
            origins,
            centre,
            &config.travel_mode,
            config.travel_time_timeout(),
            config.aggregation,
        );
        let (best, scores) = self
            .evaluate_all(run, progress, cancel, &evaluator, &candidates)
            .await?;

        let message = best.as_ref().map_or_else(
            || "No candidate could be scored".to_string(),
            |b| format!("Saving best location: {}", b.candidate.name),
        );
        advance(run, progress, RunStatus::Finalizing, message)?;

        let Some(BestSoFar { candidate, cost, .. }) = best else {
            return Err(ResolveError::NoViableCandidate {
                trip_id,
                evaluated: scores.len(),
            });
        };
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled {
                trip_id,
                stage: Stage::Finalizing,
            });
        }

        let photo_urls = candidate
            .photos
            .iter()
            .map(|photo| {
                self.photos
                    .resolve_photo_url(&candidate.external_id, photo, config.photo_max_width)
            })
            .collect();
        let resolution = Resolution {
            trip_id: trip_id.clone(),
            midpoint: centre,
            participants,
            best: BestLocation::from_candidate(&candidate, photo_urls),
            winner: candidate,
            cost,
            scores,
        };

        match self.write_best(&trip_id, &resolution.best).await {
            Ok(attempts) => debug!(attempts, "Best location saved"),
            Err(RetryError { last_error, attempts }) => {
                return Err(ResolveError::PersistenceFailed {
                    trip_id,
                    resolution: Box::new(resolution),
                    attempts,
                    source: last_error,
                });
            }
        }

        advance(
            run,
            progress,
            RunStatus::Succeeded,
            format!("Best location: {}", resolution.best.name),
        )?;
        Ok(resolution)
    }

    /// Score every candidate, keeping at most `max_concurrent_evaluations`
    /// queries in flight. Results are folded in provider order regardless of
    /// completion order.
    async fn evaluate_all(
        &self,
        run: &mut ResolutionRun,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
        evaluator: &Evaluator<'_>,
        candidates: &[CandidateLocation],
    ) -> Result<(Option<BestSoFar>, Vec<CandidateScore>)> {
        let trip_id = run.trip_id().to_string();
        let total = candidates.len();
        let concurrency = self.config.max_concurrent_evaluations.max(1);
        run.begin_evaluation(total);

        let mut evaluations = std::pin::pin!(
            stream::iter(candidates.iter().enumerate())
                .map(move |(index, candidate)| evaluator.evaluate(index, candidate))
                .buffered(concurrency)
        );

        let mut best = None;
        let mut scores = Vec::with_capacity(total);
        while let Some(score) = until_cancelled(
            cancel,
            &trip_id,
            Stage::EvaluatingCandidates,
            evaluations.next(),
        )
        .await?
        {
            metrics().increment("resolution.candidates_evaluated");
            if score.failed_legs > 0 {
                metrics().increment_by("resolution.legs_failed", score.failed_legs as u64);
            }
            debug!(
                index = score.index,
                candidate = %score.candidate.name,
                cost = ?score.cost,
                failed_legs = score.failed_legs,
                distance_from_midpoint_m = score.distance_from_midpoint_m,
                "Candidate evaluated"
            );

            best = improve(best, &score);
            run.transition_to(RunStatus::EvaluatingCandidate(score.index))?;
            run.record_evaluated(best.clone());
            progress.report(&run.event(format!(
                "Evaluated {} ({}/{total})",
                score.candidate.name,
                score.index + 1
            )));
            scores.push(score);
        }

        Ok((best, scores))
    }

    /// Overwrite the trip's best location under the persistence retry
    /// policy. Returns the number of attempts made.
    async fn write_best(
        &self,
        trip_id: &str,
        best: &BestLocation,
    ) -> std::result::Result<u32, RetryError<StoreError>> {
        let store = self.store.as_ref();
        let timeout = self.config.persist_timeout();

        retry_async(
            self.config.persist_retry.clone(),
            StoreError::is_retryable,
            move || async move {
                tokio::time::timeout(timeout, store.set_best_location(trip_id, best))
                    .await
                    .map_err(|_| StoreError::Timeout)?
            },
        )
        .await
        .map(|done| done.attempts)
    }
}

/// Move the run to `next` and report it
fn advance(
    run: &mut ResolutionRun,
    progress: &dyn ProgressSink,
    next: RunStatus,
    message: impl Into<String>,
) -> Result<()> {
    run.transition_to(next)?;
    progress.report(&run.event(message));
    Ok(())
}

/// Record a fatal error on the run and hand it back
fn fail(run: &mut ResolutionRun, progress: &dyn ProgressSink, err: ResolveError) -> ResolveError {
    metrics().increment(&format!("resolution.runs_failed.{}", err.kind()));
    if run
        .transition_to(RunStatus::Failed(err.reason().to_string()))
        .is_ok()
    {
        progress.report(&run.event(err.to_string()));
    }
    warn!(code = %err.code(), stage = %err.stage(), error = %err, "Resolution failed");
    err
}

/// Await `fut` unless `cancel` fires first
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    trip_id: &str,
    stage: Stage,
    fut: F,
) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ResolveError::Cancelled {
            trip_id: trip_id.to_string(),
            stage,
        }),
        out = fut => Ok(out),
    }
}
