//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{DistanceMatrixApi, PhotosApi, PlacesApi};
use crate::error::{ApiError, ApiResult, ErrorContext};
use rendezvous_core::rate_limit::RateLimiter;
use rendezvous_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Maximum time to wait locally for a rate-limit token
const RATE_LIMIT_WAIT: std::time::Duration = std::time::Duration::from_secs(2);

/// Body of every maps web service response carries a `status` field.
pub trait ServiceStatus {
    /// Service status, `OK` on success
    fn status(&self) -> &str;

    /// Optional human-readable error from the service
    fn error_message(&self) -> Option<&str>;

    /// Statuses that count as success besides `OK`
    fn accepts(&self, status: &str) -> bool {
        status == "OK"
    }
}

/// Maps API client with built-in resilience patterns
///
/// This client wraps `reqwest` and adds:
/// - Automatic retry with exponential backoff
/// - Circuit breaker to prevent cascading failures
/// - Rate limiting per endpoint
/// - Request correlation IDs for tracing
#[derive(Clone)]
pub struct MapsClient {
    inner: Client,
    config: Arc<ClientConfig>,
    circuit_breaker: Arc<CircuitBreaker>,
    rate_limiter: RateLimiter,
}

impl MapsClient {
    /// Create a new client with configuration from environment
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("rendezvous-api-client/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        let circuit_breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()));
        let rate_limiter = RateLimiter::new(config.rate_limit.clone());

        Ok(Self {
            inner,
            config: Arc::new(config),
            circuit_breaker,
            rate_limiter,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get circuit breaker state
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Reset the circuit breaker
    pub fn reset_circuit(&self) {
        self.circuit_breaker.reset();
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access Places search endpoints
    #[must_use]
    pub fn places(&self) -> PlacesApi {
        PlacesApi::new(self.clone())
    }

    /// Access the Distance Matrix endpoint
    #[must_use]
    pub fn distance_matrix(&self) -> DistanceMatrixApi {
        DistanceMatrixApi::new(self.clone())
    }

    /// Access photo URL formatting
    #[must_use]
    pub fn photos(&self) -> PhotosApi {
        PhotosApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // URL building
    // -------------------------------------------------------------------------

    /// Absolute URL for `endpoint` with `query` and the API key appended.
    ///
    /// Values are percent-encoded; `endpoint` is e.g. `place/nearbysearch/json`.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str, query: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        let mut pairs: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        if let Some(ref key) = self.config.api_key {
            pairs.push(format!("key={}", urlencoding::encode(key)));
        }

        if !pairs.is_empty() {
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP with resilience
    // -------------------------------------------------------------------------

    /// Perform a GET against a JSON web service and validate its `status`.
    #[instrument(skip(self, query), fields(request_id))]
    pub async fn get<T>(&self, endpoint: &str, query: &[(&str, String)]) -> ApiResult<T>
    where
        T: DeserializeOwned + ServiceStatus,
    {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());
        let rate_limit_key = rate_limit_key(endpoint);

        if !self.circuit_breaker.can_execute() {
            warn!(request_id = %request_id, endpoint, "Circuit breaker is open, rejecting request");
            return Err(ApiError::CircuitOpen);
        }

        if !self.rate_limiter.acquire(&rate_limit_key, RATE_LIMIT_WAIT).await {
            warn!(request_id = %request_id, endpoint, "Rate limited");
            return Err(ApiError::RateLimited(rate_limit_key));
        }

        let url = self.endpoint_url(endpoint, query);
        let context = ErrorContext {
            request_id: Some(request_id),
            endpoint: endpoint.to_string(),
        };
        self.execute_with_retry(&context, &url).await
    }

    /// Execute request with retry logic
    async fn execute_with_retry<T>(&self, context: &ErrorContext, url: &str) -> ApiResult<T>
    where
        T: DeserializeOwned + ServiceStatus,
    {
        let retry_config = &self.config.retry;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..retry_config.max_attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(%context, attempt, delay_ms = delay.as_millis(), "Retrying after delay");
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self.execute_single_request(context, url).await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    self.circuit_breaker.record_success();
                    debug!(
                        %context,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    // a well-formed refusal says nothing about service health
                    if !matches!(e, ApiError::Provider { .. }) || e.is_retryable() {
                        self.circuit_breaker.record_failure();
                    }

                    if e.is_retryable() && attempt + 1 < retry_config.max_attempts {
                        debug!(%context, attempt = attempt + 1, error = %e, "Request failed, will retry");
                        last_error = Some(e);
                    } else {
                        debug!(%context, attempt = attempt + 1, error = %e, "Request failed, not retrying");
                        return Err(e);
                    }
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request<T>(&self, context: &ErrorContext, url: &str) -> ApiResult<T>
    where
        T: DeserializeOwned + ServiceStatus,
    {
        let mut request = self.inner.get(url);
        if let Some(ref id) = context.request_id {
            request = request.header(X_REQUEST_ID, id);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.config.timeout)
            } else {
                ApiError::Request(e)
            }
        })?;
        let body: T = self.handle_response(response).await?;
        check_status(&body)?;
        Ok(body)
    }

    /// Handle HTTP response and deserialize
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::api_response(status.as_u16(), message))
        }
    }
}

/// Reject bodies whose service status is not a success.
pub(crate) fn check_status<T: ServiceStatus>(body: &T) -> ApiResult<()> {
    let status = body.status();
    if body.accepts(status) {
        Ok(())
    } else {
        Err(ApiError::provider(
            status,
            body.error_message().unwrap_or_default(),
        ))
    }
}

/// Rate limit key: the service family (`place`, `distancematrix`)
fn rate_limit_key(endpoint: &str) -> String {
    endpoint
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("default")
        .to_string()
}
