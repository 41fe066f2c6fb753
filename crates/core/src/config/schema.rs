//! Configuration schema definitions
//!
//! Shared configuration types for the resolver, the maps backend and logging.

use crate::error::{Error, Result};
use crate::rate_limit::RateLimitConfig;
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// Meeting-point resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Google Maps web services backend
    #[serde(default)]
    pub google: GoogleConfig,

    /// Logging output
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl ConfigSchema {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.resolver.validate()?;
        self.google.validate()
    }
}

/// How per-participant legs are folded into a candidate's aggregate cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Sum successful legs; failed legs contribute zero.
    #[default]
    ZeroFill,
    /// A candidate with any failed leg is not viable.
    ExcludePartial,
    /// Mean over successful legs only.
    AverageReachable,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Radius around the midpoint searched for candidates
    #[serde(default = "default_search_radius")]
    pub search_radius_meters: u32,

    /// Place category passed to the places provider
    #[serde(default = "default_category")]
    pub category: String,

    /// Travel mode passed to the travel-time provider
    #[serde(default = "default_travel_mode")]
    pub travel_mode: String,

    /// Timeout for the candidate search call
    #[serde(default = "default_call_timeout")]
    pub places_timeout_secs: u64,

    /// Timeout for one travel-time query
    #[serde(default = "default_call_timeout")]
    pub travel_time_timeout_secs: u64,

    /// Timeout for one persistence write attempt
    #[serde(default = "default_call_timeout")]
    pub persist_timeout_secs: u64,

    /// Travel-time queries in flight at once; 1 evaluates strictly in order
    #[serde(default = "default_concurrency")]
    pub max_concurrent_evaluations: usize,

    /// Aggregate cost policy
    #[serde(default)]
    pub aggregation: AggregationPolicy,

    /// Retry policy for the final best-location write
    #[serde(default = "RetryConfig::quick")]
    pub persist_retry: RetryConfig,

    /// Width requested when expanding photo references
    #[serde(default = "default_photo_max_width")]
    pub photo_max_width: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_radius_meters: default_search_radius(),
            category: default_category(),
            travel_mode: default_travel_mode(),
            places_timeout_secs: default_call_timeout(),
            travel_time_timeout_secs: default_call_timeout(),
            persist_timeout_secs: default_call_timeout(),
            max_concurrent_evaluations: default_concurrency(),
            aggregation: AggregationPolicy::default(),
            persist_retry: RetryConfig::quick(),
            photo_max_width: default_photo_max_width(),
        }
    }
}

impl ResolverConfig {
    /// Candidate search timeout
    #[must_use]
    pub fn places_timeout(&self) -> Duration {
        Duration::from_secs(self.places_timeout_secs)
    }

    /// Travel-time query timeout
    #[must_use]
    pub fn travel_time_timeout(&self) -> Duration {
        Duration::from_secs(self.travel_time_timeout_secs)
    }

    /// Persistence write timeout
    #[must_use]
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_secs(self.persist_timeout_secs)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.search_radius_meters == 0 {
            return Err(Error::invalid_config_value(
                "resolver.search_radius_meters",
                "must be greater than zero",
            ));
        }
        if self.category.trim().is_empty() {
            return Err(Error::invalid_config_value("resolver.category", "cannot be empty"));
        }
        if self.travel_mode.trim().is_empty() {
            return Err(Error::invalid_config_value("resolver.travel_mode", "cannot be empty"));
        }
        if self.max_concurrent_evaluations == 0 {
            return Err(Error::invalid_config_value(
                "resolver.max_concurrent_evaluations",
                "must be at least 1",
            ));
        }
        for (key, secs) in [
            ("resolver.places_timeout_secs", self.places_timeout_secs),
            ("resolver.travel_time_timeout_secs", self.travel_time_timeout_secs),
            ("resolver.persist_timeout_secs", self.persist_timeout_secs),
        ] {
            if secs == 0 {
                return Err(Error::invalid_config_value(key, "timeout cannot be zero"));
            }
        }
        Ok(())
    }
}

fn default_search_radius() -> u32 {
    5000
}

fn default_category() -> String {
    "restaurant".to_string()
}

fn default_travel_mode() -> String {
    "driving".to_string()
}

fn default_call_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    1
}

fn default_photo_max_width() -> u32 {
    400
}

/// Google Maps web services configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleConfig {
    /// Base URL of the maps API
    #[serde(default = "default_google_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP request timeout
    #[serde(default = "default_call_timeout")]
    pub timeout_secs: u64,

    /// Requests per minute allowed per endpoint
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: default_google_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_call_timeout(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

impl GoogleConfig {
    /// Rate limit derived from `requests_per_minute`
    #[must_use]
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::per_minute(self.requests_per_minute)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::invalid_config_value(
                "google.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_config_value("google.timeout_secs", "timeout cannot be zero"));
        }
        if self.requests_per_minute == 0 {
            return Err(Error::invalid_config_value(
                "google.requests_per_minute",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_google_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_MAPS_API_KEY".to_string()
}

fn default_requests_per_minute() -> u32 {
    600
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySection {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Print event targets
    #[serde(default)]
    pub show_target: bool,

    /// Print thread ids
    #[serde(default)]
    pub show_thread_ids: bool,

    /// Print source file and line
    #[serde(default)]
    pub show_location: bool,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            show_target: false,
            show_thread_ids: false,
            show_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
