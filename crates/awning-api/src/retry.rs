//! Explicit retry policy for transient transport failures.
//!
//! Each client owns a [`RetryPolicy`] and wraps its raw HTTP exchange in
//! [`RetryPolicy::run`]. The policy decides *whether* to retry through its
//! `retry_if` predicate and *how long* to wait through a capped exponential
//! curve: `min(base * 2^(attempt - 1), max)`.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Error;

/// Bounded exponential-backoff retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Which errors are worth another attempt.
    pub retry_if: fn(&Error) -> bool,
}

impl RetryPolicy {
    /// Policy retrying only [`Error::is_transient`] failures.
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            retry_if: Error::is_transient,
        }
    }

    /// Bond Bridge calls: 3 attempts, 1s base, 10s cap.
    pub const fn bridge() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(10))
    }

    /// Open-Meteo calls: 3 attempts, 2s base, 30s cap.
    pub const fn weather() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(30))
    }

    /// Telegram calls: 2 attempts, 1s base, 5s cap.
    pub const fn notification() -> Self {
        Self::new(2, Duration::from_secs(1), Duration::from_secs(5))
    }

    /// Same attempt budget and predicate with a different delay curve.
    #[must_use]
    pub const fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Delay to wait after `failed_attempt` (1-based) before the next try.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(failed_attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && (self.retry_if)(&err) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn unavailable() -> Error {
        Error::Status {
            status: 503,
            message: "busy".into(),
        }
    }

    fn retry_on_503(err: &Error) -> bool {
        err.status() == Some(503)
    }

    #[test]
    fn bridge_delays_double_then_cap() {
        let policy = RetryPolicy::bridge();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(10));
        assert_eq!(policy.delay_for(40), Duration::from_secs(10));
    }

    #[test]
    fn weather_delays_start_at_two_seconds() {
        let policy = RetryPolicy::weather();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
    }

    #[test]
    fn status_errors_are_not_transient() {
        assert!(!unavailable().is_transient());
        assert!(!Error::missing("current").is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_up_to_the_attempt_cap() {
        let policy = RetryPolicy {
            retry_if: retry_on_503,
            ..RetryPolicy::bridge()
        };
        let calls = AtomicU32::new(0);

        let result: Result<(), Error> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(unavailable()) }
            })
            .await;

        assert!(matches!(result, Err(Error::Status { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_a_transient_failure() {
        let policy = RetryPolicy {
            retry_if: retry_on_503,
            ..RetryPolicy::weather()
        };
        let calls = AtomicU32::new(0);

        let result = policy
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n == 0 { Err(unavailable()) } else { Ok(n) } }
            })
            .await;

        assert_eq!(result.ok(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_errors_fail_on_first_attempt() {
        let policy = RetryPolicy::bridge();
        let calls = AtomicU32::new(0);

        let result: Result<(), Error> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(Error::Status {
                        status: 404,
                        message: "missing".into(),
                    })
                }
            })
            .await;

        assert!(result.is_err_and(|e| e.is_not_found()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
