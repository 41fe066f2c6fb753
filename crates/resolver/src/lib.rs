//! Best meeting point resolution for Rendezvous trips
//!
//! Given the starting points of a trip's participants, the resolver
//!
//! 1. averages them into a midpoint,
//! 2. asks a places provider for venues of one category near that midpoint,
//! 3. asks a travel-time provider how long each participant needs to reach
//!    each venue, and
//! 4. persists the venue with the lowest aggregate travel time as the trip's
//!    best location,
//!
//! reporting progress after every venue scored.
//!
//! # Example
//!
//! ```rust,no_run
//! use rendezvous_geo::Coordinate;
//! use rendezvous_resolver::{
//!     InMemoryTripStore, ProgressEvent, Resolver, StraightLineTravelTime,
//! };
//! use rendezvous_resolver::google::GooglePlacesProvider;
//! use rendezvous_api_client::MapsClient;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryTripStore::new());
//! store.create_trip("trip-1")?;
//! store.add_participant("trip-1", "alice")?;
//! store.set_location("trip-1", "alice", Coordinate::new(52.52, 13.405))?;
//!
//! let resolver = Resolver::new(
//!     store.clone(),
//!     Arc::new(GooglePlacesProvider::new(MapsClient::new()?)),
//!     Arc::new(StraightLineTravelTime::default()),
//! );
//!
//! let on_progress = |event: &ProgressEvent| println!("{:>4.0}% {}", event.fraction * 100.0, event.message);
//! let resolution = resolver
//!     .resolve_best_location("trip-1", &on_progress, &CancellationToken::new())
//!     .await?;
//! println!("Meet at {}", resolution.best.name);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod candidates;
pub mod error;
pub mod evaluator;
#[cfg(feature = "google")]
pub mod google;
pub mod locator;
pub mod memory;
pub mod model;
pub mod progress;
pub mod providers;
pub mod resolver;
pub mod run;
pub mod straight_line;

pub use error::{ProviderError, ProviderErrorKind, ResolveError, Result, StoreError};
pub use evaluator::{BestSoFar, CandidateScore};
pub use memory::InMemoryTripStore;
pub use model::{BestLocation, CandidateLocation, LegStatus, Participant, TripId, UserId};
pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use providers::{PhotoResolver, PlacesProvider, RawPhotoReferences, TravelTimeProvider, TripStore};
pub use resolver::{Resolution, Resolver};
pub use run::{ResolutionRun, RunStatus, Stage};
pub use straight_line::StraightLineTravelTime;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{ResolveError, Result};
    pub use crate::model::{BestLocation, CandidateLocation, Participant};
    pub use crate::progress::{NoProgress, ProgressEvent, ProgressSink};
    pub use crate::providers::{PhotoResolver, PlacesProvider, TravelTimeProvider, TripStore};
    pub use crate::resolver::{Resolution, Resolver};
    pub use tokio_util::sync::CancellationToken;
}
