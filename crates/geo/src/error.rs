//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    /// A midpoint was requested for zero points
    #[error("Cannot compute a midpoint of zero coordinates")]
    EmptyInput,

    /// Invalid coordinate values
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Error code for integration with rendezvous-core error handling.
/// Range: 7xxx (validation).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Empty coordinate set
    EmptyInput = 7002,
    /// Invalid coordinate values
    InvalidCoordinate = 7001,
}

impl GeoError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::EmptyInput => GeoErrorCode::EmptyInput,
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
        }
    }
}
