//! Retry logic with a fixed delay
//!
//! Operations are attempted up to a bounded number of times with a constant pause
//! between attempts. There is no exponential growth and no jitter.
//!
//! Every attempt and every pause races a [`CancellationToken`]; cancellation wins
//! immediately and does not consume the remaining attempts.
//!
//! # Example
//!
//! ```no_run
//! use product_img_dl::retry::{IsRetryable, RetryPolicy, with_retry};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
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
//! let policy = RetryPolicy::fixed(3, Duration::from_secs(2));
//! let cancel = CancellationToken::new();
//! let result = with_retry(&policy, &cancel, || async { Ok::<_, Flaky>(42) }).await;
//! # let _ = result;
//! # }
//! ```

use crate::config::HttpConfig;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Trait for errors that can be classified as retryable or not
///
/// Attempt failures (connection errors, timeouts, error statuses) return `true`.
/// Failures that would repeat identically on every attempt (malformed request)
/// return `false`.
pub trait IsRetryable {
    /// Returns true if the operation should be attempted again
    fn is_retryable(&self) -> bool;
}

/// Bounded attempts with a constant pause between them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (0 is treated as 1)
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a fixed-delay policy
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A single attempt, no retry
    pub fn once() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Effective number of attempts
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self::fixed(config.max_attempts, config.retry_delay)
    }
}

/// Why [`with_retry`] gave up
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed; carries the last failure
    Exhausted {
        /// Failure of the final attempt
        error: E,
        /// Attempts made
        attempts: u32,
    },
    /// A non-retryable failure stopped the loop early
    Permanent(E),
    /// The cancellation token fired
    Cancelled,
}

/// Execute an async operation under a fixed-delay retry policy
///
/// # Arguments
///
/// * `policy` - Attempt bound and delay
/// * `cancel` - Cancellation token observed during attempts and pauses
/// * `operation` - Async closure that returns `Result<T, E>` where E implements IsRetryable
///
/// # Returns
///
/// The first successful result, or a [`RetryError`] describing why the loop stopped.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            outcome = operation() => outcome,
        };

        match outcome {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !e.is_retryable() => {
                tracing::error!(error = %e, "Operation failed with non-retryable error");
                return Err(RetryError::Permanent(e));
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!(
                    error = %e,
                    attempts = attempt,
                    "Operation failed after all attempts exhausted"
                );
                return Err(RetryError::Exhausted {
                    error: e,
                    attempts: attempt,
                });
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = policy.delay.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(policy.delay) => {}
                }
            }
        }
    }
}
