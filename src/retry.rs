//! Retry logic with exponential backoff
//!
//! Download attempts are retried under an explicit [`RetryPolicy`]. The wait
//! between attempts goes through a [`Sleeper`], so the policy can be exercised
//! without touching the network or the wall clock.
//!
//! # Example
//!
//! ```no_run
//! use verdict_dl::config::RetryConfig;
//! use verdict_dl::retry::{IsRetryable, RetryPolicy, TokioSleeper, retry_with_backoff};
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
//! let policy = RetryPolicy::from_config(&RetryConfig::default());
//! let result = retry_with_backoff(
//!     &policy,
//!     &TokioSleeper,
//!     |_attempt| async { Ok::<_, Flaky>(42) },
//!     |_attempt, _error, _next_delay| {},
//! )
//! .await;
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network errors, error statuses, interrupted writes)
/// should return `true`. Failures another attempt cannot fix (bad
/// configuration, permissions) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Timeouts, resets and truncated bodies all look alike from here
            Error::Network(_) => true,
            // Every non-2xx status is retried, 4xx included
            Error::HttpStatus { .. } => true,
            Error::Io(e) => !matches!(
                e.kind(),
                std::io::ErrorKind::PermissionDenied
                    | std::io::ErrorKind::NotFound
                    | std::io::ErrorKind::StorageFull
                    | std::io::ErrorKind::ReadOnlyFilesystem
            ),
            Error::Config { .. } => false,
            Error::Serialization(_) => false,
            Error::InvalidUrl(_) => false,
            Error::Other(_) => false,
        }
    }
}

/// Source of backoff delays
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeper backed by `tokio::time::sleep`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry policy
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first attempt included
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
    /// Randomize each delay into `[delay, 2 * delay]`
    pub jitter: bool,
}

impl RetryPolicy {
    /// Build a policy from configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: config.initial_delay,
            max_delay: config.max_delay,
            backoff_multiplier: config.backoff_multiplier,
            jitter: config.jitter,
        }
    }

    /// Base delay to wait after failed attempt `attempt` (1-based), before jitter
    ///
    /// Returns `None` once `attempt` reaches `max_attempts`: there is no wait
    /// after the final attempt.
    ///
    /// ```
    /// use std::time::Duration;
    /// use verdict_dl::config::RetryConfig;
    /// use verdict_dl::retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::from_config(&RetryConfig::default());
    /// assert_eq!(policy.delay_after(1), Some(Duration::from_secs(2)));
    /// assert_eq!(policy.delay_after(4), Some(Duration::from_secs(16)));
    /// assert_eq!(policy.delay_after(5), None);
    /// ```
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        if self.initial_delay.is_zero() {
            return Some(Duration::ZERO);
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Some(Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Final error of a retried operation
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts made before giving up
    pub attempts: u32,
    /// Error from the last attempt
    pub error: E,
}

/// Run `operation` until it succeeds, fails permanently, or the policy is exhausted
///
/// `operation` receives the 1-based attempt number. `on_failure` is called
/// after every failed attempt with the attempt number, its error, and the delay
/// before the next attempt (`None` when no further attempt will be made).
pub async fn retry_with_backoff<F, Fut, T, E, N>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
    mut on_failure: N,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
    N: FnMut(u32, &E, Option<Duration>),
{
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                let next_delay = if e.is_retryable() {
                    policy.delay_after(attempt).map(|delay| {
                        if policy.jitter {
                            add_jitter(delay)
                        } else {
                            delay
                        }
                    })
                } else {
                    None
                };

                on_failure(attempt, &e, next_delay);

                match next_delay {
                    Some(delay) => {
                        sleeper.sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        if e.is_retryable() {
                            tracing::debug!(
                                error = %e,
                                attempts = attempt,
                                "retry budget exhausted"
                            );
                        } else {
                            tracing::debug!(error = %e, "non-retryable error");
                        }
                        return Err(RetryFailure {
                            attempts: attempt,
                            error: e,
                        });
                    }
                }
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::try_from_secs_f64(jittered_secs).unwrap_or(Duration::MAX)
}
