//! Bounded retry loop with per-kind backoff.
//!
//! The retry controller is the only component allowed to suppress an
//! error (by retrying it). Policy, per [`ErrorKind`]:
//!
//! - `Authentication` / `InsufficientCredits`: re-raised immediately.
//!   These never become transient.
//! - `RateLimit`: exponential backoff, `2^attempt * base_delay`.
//! - `Generic` (other HTTP errors, timeouts, network failures): linear
//!   backoff, `attempt * base_delay`.
//!
//! Both schedules are capped at `max_delay`. Once attempts are exhausted
//! the most recent classified error is surfaced unchanged, never wrapped.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ErrorKind, Result};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt ceiling, including the first attempt (default: 3).
    pub max_attempts: u32,
    /// Backoff unit (default: 1 second).
    pub base_delay: Duration,
    /// Upper bound on any single sleep (default: 30 seconds).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Compute the sleep before the retry that follows failed attempt
/// `attempt` (1-indexed).
///
/// Rate-limit failures back off exponentially (`2^attempt * base`); all
/// other retryable failures back off linearly (`attempt * base`). Both
/// are capped at `max_delay`.
pub fn backoff_delay(config: &RetryConfig, kind: ErrorKind, attempt: u32) -> Duration {
    let base_ms = config.base_delay.as_millis() as u64;
    let raw_ms = match kind {
        ErrorKind::RateLimit => base_ms.saturating_mul(2u64.saturating_pow(attempt)),
        _ => base_ms.saturating_mul(u64::from(attempt)),
    };
    Duration::from_millis(raw_ms.min(config.max_delay.as_millis() as u64))
}

/// Run `attempt_fn` up to `config.max_attempts` times.
///
/// The closure is invoked once per attempt so that request envelopes
/// (auth headers, deadlines, body serialization) are freshly built each
/// time. Non-retryable kinds short-circuit without sleeping; retryable
/// kinds sleep per [`backoff_delay`] between attempts.
pub async fn run_with_retries<T, F, Fut>(config: &RetryConfig, mut attempt_fn: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match attempt_fn().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                let kind = err.kind();
                match kind {
                    ErrorKind::Authentication | ErrorKind::InsufficientCredits => {
                        return Err(err);
                    }
                    ErrorKind::RateLimit | ErrorKind::Generic => {
                        if attempt >= max_attempts {
                            return Err(err);
                        }
                        let delay = backoff_delay(config, kind, attempt);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "retrying after transient error"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(50),
        }
    }

    fn auth_error() -> ClientError {
        crate::error::classify(401, &json!({}))
    }

    fn credits_error() -> ClientError {
        crate::error::classify(402, &json!({}))
    }

    fn rate_limit_error() -> ClientError {
        crate::error::classify(429, &json!({}))
    }

    fn server_error() -> ClientError {
        crate::error::classify(500, &json!({}))
    }

    // ── Backoff arithmetic ──────────────────────────────────────────

    #[test]
    fn rate_limit_backoff_is_exponential() {
        let config = RetryConfig::default();
        let d1 = backoff_delay(&config, ErrorKind::RateLimit, 1);
        let d2 = backoff_delay(&config, ErrorKind::RateLimit, 2);
        assert_eq!(d1, Duration::from_millis(2000));
        assert_eq!(d2, Duration::from_millis(4000));
    }

    #[test]
    fn generic_backoff_is_linear() {
        let config = RetryConfig::default();
        let d1 = backoff_delay(&config, ErrorKind::Generic, 1);
        let d2 = backoff_delay(&config, ErrorKind::Generic, 2);
        assert_eq!(d1, Duration::from_millis(1000));
        assert_eq!(d2, Duration::from_millis(2000));
    }

    #[test]
    fn backoff_capped_at_max_delay() {
        let config = RetryConfig::default();
        // 2^10 * 1000ms = ~17 minutes uncapped
        let d = backoff_delay(&config, ErrorKind::RateLimit, 10);
        assert_eq!(d, Duration::from_secs(30));

        let d = backoff_delay(&config, ErrorKind::Generic, 100);
        assert_eq!(d, Duration::from_secs(30));
    }

    #[test]
    fn backoff_does_not_overflow_on_large_attempts() {
        let config = RetryConfig::default();
        let d = backoff_delay(&config, ErrorKind::RateLimit, 200);
        assert_eq!(d, Duration::from_secs(30));
    }

    // ── Retry loop behavior ─────────────────────────────────────────

    #[tokio::test]
    async fn success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = run_with_retries(&fast_config(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ClientError>(42) }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn auth_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let err = run_with_retries(&fast_config(3), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(auth_error())
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn credits_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let err = run_with_retries(&fast_config(3), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(credits_error())
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientCredits);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limit_retried_until_exhaustion() {
        let calls = Arc::new(AtomicU32::new(0));
        let err = run_with_retries(&fast_config(3), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(rate_limit_error())
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn generic_retried_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = run_with_retries(&fast_config(3), || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok("ok")
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_surfaces_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let err = run_with_retries(&fast_config(2), || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                // First a 500, then a 503; the 503 must be the one surfaced.
                if n == 0 {
                    Err::<(), _>(crate::error::classify(500, &json!({})))
                } else {
                    Err(crate::error::classify(503, &json!({})))
                }
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn timeout_is_retryable() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = run_with_retries(&fast_config(2), || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ClientError::Timeout)
                } else {
                    Ok(7)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn max_attempts_one_means_no_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let err = run_with_retries(&fast_config(1), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(server_error())
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
