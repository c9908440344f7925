//! Client configuration.
//!
//! [`ClientConfig`] is built once, validated at construction, and shared
//! read-only between all calls issued through a [`Client`](crate::Client).

use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::retry::RetryConfig;

/// The production OmniLLM gateway endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.omnillm.com/v1";

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const API_KEY_ENV: &str = "OMNILLM_API_KEY";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for an OmniLLM client.
///
/// Immutable after construction. The base URL defaults to the production
/// gateway; overriding it is intended for tests against a local mock
/// server.
#[derive(Clone)]
pub struct ClientConfig {
    /// The API key. Never empty.
    pub api_key: String,

    /// Base URL of the gateway, without a trailing slash.
    pub base_url: String,

    /// Per-attempt request timeout. Exceeding it aborts the in-flight
    /// exchange and counts as a retryable failure.
    pub timeout: Duration,

    /// Retry behavior for the request execution engine.
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Create a configuration with the given API key and defaults for
    /// everything else.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::InvalidConfig("API key must not be empty".into()));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        })
    }

    /// Create a configuration from the `OMNILLM_API_KEY` environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the variable is unset or
    /// empty.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| ClientError::InvalidConfig(format!("set {API_KEY_ENV} env var")))?;
        Self::new(key)
    }

    /// Override the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the maximum number of attempts (must be at least 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts.max(1);
        self
    }

    /// Override the full retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Point the client at a different base URL.
    ///
    /// Intended for tests against a mock server; production callers use
    /// the fixed default endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}
