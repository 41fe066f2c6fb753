//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for one maps web service.
//!
//! | Module | Service path | Description |
//! |--------|--------------|-------------|
//! | `places` | `place/nearbysearch/json` | Venues of a type within a radius |
//! | `distance_matrix` | `distancematrix/json` | Travel times, many origins to one destination |
//! | `photos` | `place/photo` | Photo URL formatting, no request made |

pub mod distance_matrix;
pub mod photos;
pub mod places;

pub use distance_matrix::{
    DistanceMatrixApi, DistanceMatrixParams, DistanceMatrixResponse, MatrixElement, MatrixRow,
    TextValue, MAX_MATRIX_ORIGINS,
};
pub use photos::PhotosApi;
pub use places::{
    Geometry, LatLng, NearbySearchParams, NearbySearchResponse, PlaceResult, PlacePhoto, PlacesApi,
};
