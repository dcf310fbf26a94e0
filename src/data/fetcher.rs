//! Star Wars API client with retry and linear backoff
//!
//! Every network request in the application goes through [`RetryingFetcher`]. A
//! request fails if the transport fails, the status is not 2xx, the body is not
//! JSON, or the body lacks the field the caller expects. Failed attempts are retried
//! after `backoff_step * attempt_index` until the attempt limit is reached.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::{CatalogItem, CategoryKind, DetailRecord};

/// Base URL of the public Star Wars API
pub const DEFAULT_API_BASE: &str = "https://www.swapi.tech/api/";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that end a fetch after all attempts are used up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be completed or returned a non-success status
    #[error("could not fetch '{path}': {reason}")]
    Transport {
        path: String,
        status: Option<u16>,
        reason: String,
    },

    /// The response arrived but did not have the expected structure
    #[error("unexpected response for '{path}': {reason}")]
    Shape { path: String, reason: String },
}

impl FetchError {
    /// HTTP status of a transport failure, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status, .. } => *status,
            FetchError::Shape { .. } => None,
        }
    }

    fn transport(path: &str, status: Option<u16>, reason: impl Into<String>) -> Self {
        FetchError::Transport {
            path: path.to_string(),
            status,
            reason: reason.into(),
        }
    }

    fn shape(path: &str, reason: impl Into<String>) -> Self {
        FetchError::Shape {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// The minimal structure a response must have to count as a success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Category listing: `{ "results": [...] }`
    Listing,
    /// Item detail: `{ "result": { "properties": {...} } }`
    Detail,
}

impl Shape {
    /// Name of the required field, for diagnostics
    pub fn required_field(self) -> &'static str {
        match self {
            Shape::Listing => "results",
            Shape::Detail => "result.properties",
        }
    }

    /// Whether `body` has the required field
    pub fn matches(self, body: &Value) -> bool {
        match self {
            Shape::Listing => body.get("results").is_some_and(Value::is_array),
            Shape::Detail => body
                .pointer("/result/properties")
                .is_some_and(Value::is_object),
        }
    }
}

/// How many times to try a request and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Wait before attempt `i` is `backoff_step * i`
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before the zero-based `attempt_index`
    pub fn delay_before(&self, attempt_index: u32) -> Duration {
        self.backoff_step * attempt_index
    }

    /// Number of attempts actually made
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// HTTP client that validates and retries Star Wars API requests
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    /// Creates a fetcher against `base_url` with the given policy
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("holocron/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, policy))
    }

    /// Creates a fetcher with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            policy,
        }
    }

    /// The retry policy in use
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Full URL for a resource path
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Fetches `path`, retrying until the body matches `shape` or attempts run out
    ///
    /// # Returns
    /// * `Ok(Value)` - The parsed response body
    /// * `Err(FetchError)` - The error from the final attempt
    pub async fn fetch(&self, path: &str, shape: Shape) -> Result<Value, FetchError> {
        self.fetch_decoded(path, shape, Ok).await
    }

    /// Fetches and decodes a category listing
    pub async fn fetch_listing(&self, category: CategoryKind) -> Result<Vec<CatalogItem>, FetchError> {
        let path = category.path_segment();
        self.fetch_decoded(path, Shape::Listing, |mut body| {
            let results = body.get_mut("results").map(Value::take).unwrap_or_default();
            serde_json::from_value(results)
                .map_err(|e| FetchError::shape(path, format!("malformed listing entry: {}", e)))
        })
        .await
    }

    /// Fetches and decodes one item's detail record
    pub async fn fetch_detail(&self, category: CategoryKind, uid: &str) -> Result<DetailRecord, FetchError> {
        let path = format!("{}/{}", category.path_segment(), uid);
        self.fetch_decoded(&path, Shape::Detail, |body| {
            body.pointer("/result/properties")
                .and_then(Value::as_object)
                .map(|properties| DetailRecord::from_properties(uid, category, properties))
                .ok_or_else(|| FetchError::shape(&path, "missing `result.properties`"))
        })
        .await
    }

    /// Retry loop shared by every request
    ///
    /// `decode` runs inside each attempt, so a body that passes the shape check but
    /// cannot be decoded counts as a failed attempt.
    async fn fetch_decoded<T>(
        &self,
        path: &str,
        shape: Shape,
        decode: impl Fn(Value) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 0..attempts {
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(path, attempt = attempt + 1, attempts, "fetch attempt");
            match self.attempt(path, shape).await.and_then(&decode) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    tracing::warn!(path, attempt = attempt + 1, attempts, %error, "fetch attempt failed");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::transport(path, None, "no attempt was made")))
    }

    /// Makes a single request and validates the response
    async fn attempt(&self, path: &str, shape: Shape) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(self.url_for(path))
            .send()
            .await
            .map_err(|e| FetchError::transport(path, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::transport(
                path,
                Some(status.as_u16()),
                format!("HTTP {}", status),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::transport(path, Some(status.as_u16()), e.to_string()))?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| FetchError::shape(path, format!("body is not JSON: {}", e)))?;

        if !shape.matches(&body) {
            return Err(FetchError::shape(
                path,
                format!("missing `{}`", shape.required_field()),
            ));
        }
        Ok(body)
    }
}
