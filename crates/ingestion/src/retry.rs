//! Retry with exponential backoff for transient source failures.

use std::future::Future;
use std::time::Duration;

use mev_lens_source::{SourceError, SourceResult};
use tokio::time::sleep;
use tracing::{info, warn};

/// How many times to attempt a request and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    /// Delay after the first failure; doubles after each further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt number `attempt` (0-based).
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16) as u32);
        self.base_delay.saturating_mul(factor)
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
///
/// Only retryable errors (see [`SourceError::is_retryable`]) are retried.
/// Running out of attempts yields [`SourceError::RetriesExhausted`].
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> SourceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SourceResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut failures = 0;

    loop {
        match call().await {
            Ok(value) => {
                if failures > 0 {
                    info!(operation, retries = failures, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() => {
                failures += 1;
                if failures >= attempts {
                    return Err(SourceError::RetriesExhausted {
                        attempts,
                        last_error: e.to_string(),
                    });
                }
                let delay = policy.backoff_delay(failures - 1);
                warn!(
                    operation,
                    attempt = failures,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request attempt failed, retrying"
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = with_retry(&fast_policy(3), "test", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(SourceError::Transport("connection reset".into()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: SourceResult<()> = with_retry(&fast_policy(3), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Transport("timed out".into()))
        })
        .await;

        assert!(matches!(
            result,
            Err(SourceError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: SourceResult<()> = with_retry(&fast_policy(3), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Rpc {
                code: -32602,
                message: "Invalid param".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(SourceError::Rpc { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
