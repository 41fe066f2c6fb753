//! Google Maps web services client for Rendezvous
//!
//! Typed access to the three services the meeting-point resolver consumes:
//!
//! - **Places Nearby Search**: candidate venues around a midpoint
//! - **Distance Matrix**: travel time from every participant to one venue
//! - **Place Photos**: photo reference to URL formatting (no request made)
//!
//! Every request goes through the same resilience stack: per-endpoint rate
//! limiting, a circuit breaker, retry with exponential backoff and request
//! correlation IDs.
//!
//! # Example
//!
//! ```rust,no_run
//! use rendezvous_api_client::{MapsClient, endpoints::NearbySearchParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MapsClient::new()?;
//!
//!     let params = NearbySearchParams::new(52.52, 13.405, 5000, "restaurant");
//!     let found = client.places().nearby(&params).await?;
//!     println!("{} venues", found.results.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod middleware;

pub use client::MapsClient;
pub use config::{ClientConfig, Environment};
pub use error::{ApiError, ApiResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::MapsClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{DistanceMatrixApi, PhotosApi, PlacesApi};
    pub use crate::error::{ApiError, ApiResult};
}
