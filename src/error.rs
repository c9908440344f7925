//! Error types and HTTP status classification for omnillm.
//!
//! All client operations return [`Result<T>`] which uses [`ClientError`]
//! as the error type. Every error maps onto one of four [`ErrorKind`]
//! categories; the retry controller uses the kind (and nothing else) to
//! decide whether an attempt may be retried.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the OmniLLM gateway.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The gateway rejected the API key (HTTP 401).
    #[error("authentication failed: {message}")]
    Authentication {
        /// Human-readable message from the gateway, or a default.
        message: String,
        /// Provider error-type string, when present in the body.
        code: Option<String>,
    },

    /// The account has no remaining credits (HTTP 402).
    #[error("insufficient credits: {message}")]
    InsufficientCredits {
        /// Human-readable message from the gateway, or a default.
        message: String,
        /// Provider error-type string, when present in the body.
        code: Option<String>,
        /// Remediation details forwarded from the gateway, if any.
        details: Option<Value>,
    },

    /// The gateway returned a rate-limit response (HTTP 429).
    #[error("rate limited: {message}")]
    RateLimited {
        /// Human-readable message from the gateway, or a default.
        message: String,
        /// Provider error-type string, when present in the body.
        code: Option<String>,
    },

    /// Any other non-success HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The body's nested error message, else `HTTP {status}`.
        message: String,
        /// Provider error-type string, when present in the body.
        code: Option<String>,
    },

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The client was constructed with invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A successful response could not be parsed into the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// An HTTP-level error from reqwest (connection failure, TLS, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// The closed set of failure categories that drive retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid credentials. Never retried.
    Authentication,
    /// Account out of credits. Never retried.
    InsufficientCredits,
    /// Transient rate limit. Retried with exponential backoff.
    RateLimit,
    /// Everything else, including timeouts and network failures.
    /// Retried with linear backoff.
    Generic,
}

impl ClientError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Authentication { .. } => ErrorKind::Authentication,
            ClientError::InsufficientCredits { .. } => ErrorKind::InsufficientCredits,
            ClientError::RateLimited { .. } => ErrorKind::RateLimit,
            _ => ErrorKind::Generic,
        }
    }

    /// The HTTP status associated with this error, if it came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Authentication { .. } => Some(401),
            ClientError::InsufficientCredits { .. } => Some(402),
            ClientError::RateLimited { .. } => Some(429),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The provider error-type string, if the gateway sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Authentication { code, .. }
            | ClientError::InsufficientCredits { code, .. }
            | ClientError::RateLimited { code, .. }
            | ClientError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Opaque remediation payload, currently only on credit errors.
    pub fn details(&self) -> Option<&Value> {
        match self {
            ClientError::InsufficientCredits { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

/// Map a non-success HTTP status and its parsed error body to a
/// [`ClientError`].
///
/// Pure function: no I/O and no retry decision. The body is whatever JSON
/// the gateway returned (the transport substitutes `{}` when the body is
/// not parseable), typically `{"error": {"message": ..., "type": ...,
/// "details": ...}}`.
pub fn classify(status: u16, body: &Value) -> ClientError {
    let message = nested_message(body);
    let code = nested_code(body);

    match status {
        401 => ClientError::Authentication {
            message: message.unwrap_or_else(|| "Invalid API key".into()),
            code,
        },
        402 => ClientError::InsufficientCredits {
            message: message.unwrap_or_else(|| "Insufficient credits".into()),
            code,
            details: body.get("error").and_then(|e| e.get("details")).cloned(),
        },
        429 => ClientError::RateLimited {
            message: message.unwrap_or_else(|| "Rate limit exceeded".into()),
            code,
        },
        _ => ClientError::Api {
            status,
            message: message.unwrap_or_else(|| format!("HTTP {status}")),
            code,
        },
    }
}

/// Extract the nested error message from a gateway error body.
///
/// Handles both `{"error": {"message": "..."}}` and `{"error": "..."}`.
fn nested_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .map(String::from)
        .or_else(|| error.as_str().map(String::from))
}

/// Extract the provider error-type string (`type` or `code`) if present.
fn nested_code(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("type")
        .or_else(|| error.get("code"))
        .and_then(|c| c.as_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_401_is_authentication() {
        let err = classify(401, &json!({}));
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "authentication failed: Invalid API key");
    }

    #[test]
    fn classify_401_regardless_of_body() {
        let err = classify(401, &json!({"unrelated": true}));
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn classify_402_is_insufficient_credits() {
        let err = classify(402, &json!({}));
        assert_eq!(err.kind(), ErrorKind::InsufficientCredits);
        assert_eq!(err.status(), Some(402));
        assert_eq!(
            err.to_string(),
            "insufficient credits: Insufficient credits"
        );
    }

    #[test]
    fn classify_402_carries_details() {
        let body = json!({
            "error": {
                "message": "Out of credits",
                "type": "billing_error",
                "details": {"top_up_url": "https://omnillm.com/billing"}
            }
        });
        let err = classify(402, &body);
        assert_eq!(err.code(), Some("billing_error"));
        let details = err.details().unwrap();
        assert_eq!(
            details["top_up_url"].as_str(),
            Some("https://omnillm.com/billing")
        );
    }

    #[test]
    fn classify_429_is_rate_limit() {
        let err = classify(429, &json!({}));
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.to_string(), "rate limited: Rate limit exceeded");
    }

    #[test]
    fn classify_other_statuses_are_generic() {
        for status in [400, 403, 404, 409, 422, 500, 502, 503, 504] {
            let err = classify(status, &json!({}));
            assert_eq!(err.kind(), ErrorKind::Generic, "status {status}");
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn classify_generic_uses_nested_message() {
        let body = json!({"error": {"message": "model is overloaded"}});
        let err = classify(503, &body);
        assert_eq!(err.to_string(), "API error (HTTP 503): model is overloaded");
    }

    #[test]
    fn classify_generic_default_message() {
        let err = classify(500, &json!({}));
        assert_eq!(err.to_string(), "API error (HTTP 500): HTTP 500");
    }

    #[test]
    fn classify_string_error_body() {
        let err = classify(500, &json!({"error": "backend exploded"}));
        assert_eq!(err.to_string(), "API error (HTTP 500): backend exploded");
    }

    #[test]
    fn classify_code_from_type_field() {
        let body = json!({"error": {"message": "nope", "type": "invalid_request_error"}});
        let err = classify(400, &body);
        assert_eq!(err.code(), Some("invalid_request_error"));
    }

    #[test]
    fn classify_code_from_code_field() {
        let body = json!({"error": {"message": "nope", "code": "bad_param"}});
        let err = classify(400, &body);
        assert_eq!(err.code(), Some("bad_param"));
    }

    #[test]
    fn timeout_is_generic_kind() {
        assert_eq!(ClientError::Timeout.kind(), ErrorKind::Generic);
        assert_eq!(ClientError::Timeout.status(), None);
    }

    #[test]
    fn json_error_is_generic_kind() {
        let serde_err = serde_json::from_str::<Value>("not json").unwrap_err();
        let err: ClientError = serde_err.into();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert!(err.to_string().starts_with("json error:"));
    }

    #[test]
    fn display_timeout() {
        assert_eq!(ClientError::Timeout.to_string(), "request timed out");
    }

    #[test]
    fn details_absent_on_non_credit_errors() {
        let err = classify(429, &json!({"error": {"details": {"x": 1}}}));
        assert!(err.details().is_none());
    }
}
