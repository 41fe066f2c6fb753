//! Resilience components used by the client
//!
//! Re-exported from `rendezvous-core` so embedders can tune them without a
//! direct dependency.

pub use rendezvous_core::rate_limit::{RateLimitConfig, RateLimiter};
pub use rendezvous_core::retry::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig, RetryResult,
};
