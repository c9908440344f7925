//! HTTP transport: one exchange per attempt, retries around it.
//!
//! [`Transport`] owns the `reqwest::Client` and the retry loop. A single
//! attempt ([`Transport::send_once`]) applies authentication and the
//! per-attempt timeout, and turns any non-2xx response into a classified
//! error via [`crate::error::classify`]. The retry decision itself lives
//! in [`crate::retry`]; the transport never suppresses an error.

use std::sync::Arc;

use reqwest::Method;
use reqwest::multipart::Form;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, classify};
use crate::retry::run_with_retries;
use crate::surface::AuthMode;

/// The body of one request attempt.
pub(crate) enum RequestBody {
    /// No body (GET, DELETE).
    Empty,
    /// A JSON body, sent with `Content-Type: application/json`.
    Json(Value),
    /// A multipart form. No manual content-type: the HTTP client must
    /// generate the boundary itself.
    Multipart(Form),
}

/// The per-attempt bundle of method, path, body and headers.
///
/// Envelopes are built fresh for every attempt by a factory closure, so a
/// retried request recomputes its body and headers rather than reusing a
/// possibly-consumed form.
pub(crate) struct RequestEnvelope {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    pub headers: Vec<(&'static str, String)>,
    pub auth: AuthMode,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            headers: Vec::new(),
            auth: AuthMode::ApiKey,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Issues HTTP exchanges against the gateway.
pub(crate) struct Transport {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Transport {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run the envelope factory through the retry loop until an attempt
    /// succeeds, a non-retryable error occurs, or attempts are exhausted.
    pub async fn execute<F>(&self, make_envelope: F) -> Result<reqwest::Response>
    where
        F: Fn() -> Result<RequestEnvelope>,
    {
        run_with_retries(&self.config.retry, || {
            let envelope = make_envelope();
            async move { self.send_once(envelope?).await }
        })
        .await
    }

    /// Issue exactly one HTTP exchange.
    ///
    /// A timeout aborts the in-flight exchange and surfaces as
    /// [`ClientError::Timeout`] (a retryable, Generic-kind failure). A
    /// non-2xx status is classified from its parsed body; an unparseable
    /// error body is treated as `{}` rather than failing. The error-body
    /// read is bounded by the same timeout as the exchange itself.
    pub async fn send_once(&self, envelope: RequestEnvelope) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.base_url, envelope.path);
        debug!(method = %envelope.method, path = %envelope.path, "sending request");

        let mut request = self.http.request(envelope.method, &url);

        request = match envelope.auth {
            AuthMode::ApiKey => request.header("x-api-key", &self.config.api_key),
            AuthMode::Bearer => {
                request.header("Authorization", format!("Bearer {}", self.config.api_key))
            }
        };

        for (name, value) in &envelope.headers {
            request = request.header(*name, value);
        }

        request = match envelope.body {
            RequestBody::Empty => request,
            RequestBody::Json(body) => request
                .header("Content-Type", "application/json")
                .json(&body),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = match tokio::time::timeout(self.config.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ClientError::Timeout),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status = status.as_u16();
        let body_text = match tokio::time::timeout(self.config.timeout, response.text()).await {
            Ok(text) => text.unwrap_or_default(),
            Err(_) => return Err(ClientError::Timeout),
        };
        let body: Value =
            serde_json::from_str(&body_text).unwrap_or_else(|_| Value::Object(Default::default()));
        Err(classify(status, &body))
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .finish()
    }
}
