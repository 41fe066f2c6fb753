//! External capabilities the resolver depends on
//!
//! Concrete backends live outside the core: see [`crate::google`] for the
//! Google Maps adapters, [`crate::memory`] for an in-memory trip store and
//! [`crate::straight_line`] for an offline travel-time oracle.

use crate::error::{ProviderError, StoreError};
use crate::model::{BestLocation, CandidateLocation, LegStatus, Participant};
use async_trait::async_trait;
use rendezvous_geo::Coordinate;

/// Venue search around a point
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Venues of `category` within `radius_meters` of `centre`, in the
    /// provider's order. An empty result is not an error.
    async fn search_nearby(
        &self,
        centre: Coordinate,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<CandidateLocation>, ProviderError>;
}

/// Travel time from many origins to one destination
#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    /// One entry per origin, aligned with `origins`
    async fn matrix(
        &self,
        origins: &[Coordinate],
        destination: Coordinate,
        mode: &str,
    ) -> Result<Vec<LegStatus>, ProviderError>;
}

/// Photo reference to URL formatting. No network call.
pub trait PhotoResolver: Send + Sync {
    /// URL for `photo_ref` belonging to the place `external_id`
    fn resolve_photo_url(&self, external_id: &str, photo_ref: &str, max_width: u32) -> String;
}

/// Trip persistence
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Every participant of the trip, located or not, in join order
    async fn get_participants(&self, trip_id: &str) -> Result<Vec<Participant>, StoreError>;

    /// Overwrite the trip's best location
    async fn set_best_location(&self, trip_id: &str, best: &BestLocation) -> Result<(), StoreError>;
}

/// Keeps photo references as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPhotoReferences;

impl PhotoResolver for RawPhotoReferences {
    fn resolve_photo_url(&self, _external_id: &str, photo_ref: &str, _max_width: u32) -> String {
        photo_ref.to_string()
    }
}
