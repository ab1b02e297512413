//! Retry-with-backoff for read operations.
//!
//! One policy is applied uniformly to reads. Only failures the caller
//! classifies as transient are retried; everything else is returned on the
//! first attempt. Writes are never routed through here.

use std::future::Future;
use std::time::Duration;

/// Default number of attempts (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the second attempt.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. `1` disables retrying.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after `current`, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// `policy.max_attempts` is exhausted. The last error is returned.
pub async fn retry_read<T, E, F, Fut, P>(
    operation_name: &str,
    policy: &RetryPolicy,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Read succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts && is_transient(&err) => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient read failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = policy.next_delay(delay);
            }
            Err(err) => {
                if attempt > 1 {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Read failed after retries"
                    );
                }
                return Err(err);
            }
        }
    }
}
