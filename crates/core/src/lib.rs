//! Core utilities for the Rendezvous meeting-point resolver
//!
//! This crate provides shared functionality used by the resolver and its
//! provider backends:
//!
//! - **Error handling**: Error codes, context and serializable reports
//! - **Configuration**: TOML-based configuration with validation
//! - **Retry**: Exponential backoff and a circuit breaker for flaky providers
//! - **Rate limiting**: Token buckets keyed per provider endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use rendezvous_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid rendezvous.toml");
//! assert!(config.schema.resolver.search_radius_meters > 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use error::{Error, ErrorCode, ErrorReport, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        AggregationPolicy, Config, ConfigSchema, GoogleConfig, ResolverConfig, TelemetrySection,
    };
    pub use crate::error::{Error, ErrorCode, ErrorReport, Result, ResultExt};
    pub use crate::rate_limit::{RateLimitConfig, RateLimiter};
    pub use crate::retry::{retry_async, CircuitBreaker, RetryConfig};
}
