//! Configuration for the maps API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use rendezvous_core::config::GoogleConfig;
use rendezvous_core::rate_limit::RateLimitConfig;
use rendezvous_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default Google Maps web services URL
const DEFAULT_MAPS_URL: &str = "https://maps.googleapis.com/maps/api";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development, usually against a stub server
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match env::var("RENDEZVOUS_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }

    fn retry(self) -> RetryConfig {
        match self {
            Self::Development => RetryConfig::quick(),
            Self::Staging => RetryConfig::default(),
            Self::Production => RetryConfig::patient(),
        }
    }
}

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the maps web services
    pub base_url: String,
    /// API key appended to every request
    pub api_key: Option<String>,
    /// Request timeout
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Rate limit applied per endpoint
    pub rate_limit: RateLimitConfig,
    /// Current environment
    pub environment: Environment,
}

// keep the key out of logs
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("rate_limit", &self.rate_limit)
            .field("environment", &self.environment)
            .finish()
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MAPS_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::per_minute(600),
            environment: Environment::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `RENDEZVOUS_MAPS_URL`: Base URL (defaults to the public Google endpoint)
    /// - `GOOGLE_MAPS_API_KEY`: API key (required)
    /// - `RENDEZVOUS_ENV`: Environment (development/staging/production)
    /// - `RENDEZVOUS_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        let environment = Environment::from_env();

        let base_url =
            env::var("RENDEZVOUS_MAPS_URL").unwrap_or_else(|_| DEFAULT_MAPS_URL.to_string());

        let api_key = env::var("GOOGLE_MAPS_API_KEY")
            .map_err(|_| ApiError::missing_env("GOOGLE_MAPS_API_KEY"))?;

        let timeout = env::var("RENDEZVOUS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(10), Duration::from_secs);

        Ok(Self {
            base_url,
            api_key: Some(api_key),
            timeout,
            retry: environment.retry(),
            rate_limit: RateLimitConfig::per_minute(600),
            environment,
        })
    }

    /// Build from the `[google]` section of `rendezvous.toml`.
    ///
    /// The key itself is read from the environment variable the section names.
    pub fn from_google_config(google: &GoogleConfig) -> ApiResult<Self> {
        let environment = Environment::from_env();
        let api_key =
            env::var(&google.api_key_env).map_err(|_| ApiError::missing_env(&google.api_key_env))?;

        Ok(Self {
            base_url: google.base_url.clone(),
            api_key: Some(api_key),
            timeout: Duration::from_secs(google.timeout_secs),
            retry: environment.retry(),
            rate_limit: google.rate_limit(),
            environment,
        })
    }

    /// Configuration for a local stub server
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: "http://localhost:8089/maps/api".to_string(),
            api_key: Some("dev-key".to_string()),
            timeout: Duration::from_secs(5),
            retry: RetryConfig::quick(),
            rate_limit: RateLimitConfig::per_minute(10_000),
            environment: Environment::Development,
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set rate limit config
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ApiError::config("api_key is required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.base_url.contains("maps.googleapis.com"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_development_config() {
        let config = ClientConfig::development();
        assert!(config.base_url.contains("localhost"));
        assert_eq!(config.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_base_url("https://maps.example.test/api")
            .with_api_key("k")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.base_url, "https://maps.example.test/api");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::default().validate().is_err());
        assert!(ClientConfig::default().with_api_key("  ").validate().is_err());
        assert!(ClientConfig::development().with_base_url("ftp://x").validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", ClientConfig::default().with_api_key("secret-key"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_from_google_config_missing_key() {
        let google = GoogleConfig {
            api_key_env: "RENDEZVOUS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        let err = ClientConfig::from_google_config(&google).unwrap_err();
        assert!(matches!(err, ApiError::MissingEnvVar(_)));
    }
}
