//! Retry logic with linear backoff
//!
//! One generic combinator wraps every fetch site. The wait after attempt `n`
//! is `base_delay * n`; there is no wait after the final attempt. Exhausting
//! the budget yields `RetryOutcome::GivenUp`, which callers treat as "this
//! branch has nothing to offer" rather than as an error.
//!
//! # Example
//!
//! ```no_run
//! use paper_harvest::crawler::{with_retry, IsRetryable, RetryOutcome, RetryPolicy};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Flaky;
//!
//! impl std::fmt::Display for Flaky {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "flaky")
//!     }
//! }
//!
//! impl IsRetryable for Flaky {
//!     fn is_retryable(&self) -> bool {
//!         true
//!     }
//! }
//!
//! # async fn example() {
//! let policy = RetryPolicy::new(5, Duration::from_secs(1));
//! let outcome = with_retry(&policy, "https://example.com/", Some("2021"), |_attempt| async {
//!     Ok::<_, Flaky>("body")
//! })
//! .await;
//! assert!(matches!(outcome, RetryOutcome::Completed("body")));
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, error statuses, resets) return `true`.
/// Terminal failures return `false` and end the retry loop immediately.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

/// Attempt ceiling and backoff base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Wait after the failed attempt `attempt` (1-based): `base_delay * attempt`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Terminal result of a retried operation
#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded on some attempt
    Completed(T),

    /// The attempt budget ran out, or a terminal error was returned
    GivenUp { attempts: u32, last_error: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_given_up(&self) -> bool {
        matches!(self, Self::GivenUp { .. })
    }
}

/// Executes an async operation with linear-backoff retry
///
/// # Arguments
///
/// * `policy` - Attempt ceiling and base delay
/// * `target` - What is being attempted (usually a URL), for logging
/// * `period` - Crawl branch the attempt belongs to, for logging (`None` for the root)
/// * `operation` - Called with the 1-based attempt number
///
/// # Returns
///
/// `Completed` on the first success, otherwise `GivenUp` with the number of
/// attempts actually made and the last error seen.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    target: &str,
    period: Option<&str>,
    mut operation: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        tracing::debug!(target_url = target, period, attempt, max_attempts, "Attempting fetch");

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(target_url = target, period, attempt, "Succeeded after retry");
                }
                return RetryOutcome::Completed(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    target_url = target,
                    period,
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        target_url = target,
                        period,
                        error = %e,
                        attempts = attempt,
                        "Max retries reached, giving up"
                    );
                } else {
                    tracing::error!(
                        target_url = target,
                        period,
                        error = %e,
                        attempt,
                        "Non-retryable failure, giving up"
                    );
                }
                return RetryOutcome::GivenUp {
                    attempts: attempt,
                    last_error: e,
                };
            }
        }
    }
}
