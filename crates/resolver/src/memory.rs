//! In-memory trip store

use crate::error::StoreError;
use crate::model::{BestLocation, Participant, TripId};
use crate::providers::TripStore;
use async_trait::async_trait;
use rendezvous_geo::Coordinate;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default, Clone)]
struct TripRecord {
    participants: Vec<Participant>,
    best: Option<BestLocation>,
}

/// [`TripStore`] backed by a map, for tests and single-process embedders
#[derive(Debug, Default)]
pub struct InMemoryTripStore {
    trips: RwLock<HashMap<TripId, TripRecord>>,
}

impl InMemoryTripStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trip with no participants and no best location
    pub fn create_trip(&self, trip_id: impl Into<TripId>) -> Result<(), StoreError> {
        let trip_id = trip_id.into();
        let mut trips = self.trips.write().unwrap_or_else(PoisonError::into_inner);
        if trips.contains_key(&trip_id) {
            return Err(StoreError::TripExists(trip_id));
        }
        trips.insert(trip_id, TripRecord::default());
        Ok(())
    }

    /// Add a member with no starting location
    pub fn add_participant(&self, trip_id: &str, user_id: &str) -> Result<(), StoreError> {
        self.with_trip(trip_id, |trip| {
            if trip.participants.iter().any(|p| p.user_id == user_id) {
                return Err(StoreError::DuplicateParticipant {
                    trip_id: trip_id.to_string(),
                    user_id: user_id.to_string(),
                });
            }
            trip.participants.push(Participant::new(user_id));
            Ok(())
        })
    }

    /// Set or update a member's starting location
    pub fn set_location(
        &self,
        trip_id: &str,
        user_id: &str,
        location: Coordinate,
    ) -> Result<(), StoreError> {
        let location = location
            .validated()
            .map_err(|e| StoreError::InvalidLocation(e.to_string()))?;

        self.with_trip(trip_id, |trip| {
            let participant = trip
                .participants
                .iter_mut()
                .find(|p| p.user_id == user_id)
                .ok_or_else(|| StoreError::UnknownParticipant {
                    trip_id: trip_id.to_string(),
                    user_id: user_id.to_string(),
                })?;
            participant.latitude = Some(location.latitude);
            participant.longitude = Some(location.longitude);
            Ok(())
        })
    }

    /// The trip's persisted best location, if a run has succeeded
    pub fn best_location(&self, trip_id: &str) -> Result<Option<BestLocation>, StoreError> {
        let trips = self.trips.read().unwrap_or_else(PoisonError::into_inner);
        trips
            .get(trip_id)
            .map(|trip| trip.best.clone())
            .ok_or_else(|| StoreError::TripNotFound(trip_id.to_string()))
    }

    fn with_trip<T>(
        &self,
        trip_id: &str,
        f: impl FnOnce(&mut TripRecord) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut trips = self.trips.write().unwrap_or_else(PoisonError::into_inner);
        let trip = trips
            .get_mut(trip_id)
            .ok_or_else(|| StoreError::TripNotFound(trip_id.to_string()))?;
        f(trip)
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn get_participants(&self, trip_id: &str) -> Result<Vec<Participant>, StoreError> {
        let trips = self.trips.read().unwrap_or_else(PoisonError::into_inner);
        trips
            .get(trip_id)
            .map(|trip| trip.participants.clone())
            .ok_or_else(|| StoreError::TripNotFound(trip_id.to_string()))
    }

    async fn set_best_location(&self, trip_id: &str, best: &BestLocation) -> Result<(), StoreError> {
        self.with_trip(trip_id, |trip| {
            trip.best = Some(best.clone());
            Ok(())
        })
    }
}
