//! Retry policy for throttled and transient failures.
//!
//! A [`RetryConfig`] pairs a [`Backoff`] strategy with a time limit. The
//! client keeps resending a request while its error is retryable, sleeping
//! for the next delay between attempts, and gives up with
//! [`ClientError::RetryTimeout`](crate::ClientError::RetryTimeout) once the
//! next sleep would cross the limit.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default time budget for retrying one request.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 60;

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Backoff {
    /// Never retry.
    Disabled,
    /// The same delay before every attempt.
    #[serde(rename_all = "camelCase")]
    Static {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Each delay is drawn from `[base, previous * 3]`, capped at `max`.
    #[serde(rename_all = "camelCase")]
    DecorrelatedJitter {
        /// Lower bound and first delay, in milliseconds.
        base_delay_ms: u64,
        /// Upper bound, in milliseconds.
        max_delay_ms: u64,
    },
    /// Full jitter: attempt `n` sleeps a random share of `base * 2^n`,
    /// capped at `max`.
    #[serde(rename_all = "camelCase")]
    Exponential {
        /// Ceiling of the first delay, in milliseconds.
        base_delay_ms: u64,
        /// Upper bound, in milliseconds.
        max_delay_ms: u64,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base_delay_ms: 1_000,
            max_delay_ms: 20_000,
        }
    }
}

impl Backoff {
    /// The delay before retry number `attempt` (0-based).
    ///
    /// `previous` is the delay used before the last retry, `sample` a uniform
    /// draw from `[0, 1)`. Returns `None` when retries are disabled.
    #[must_use]
    pub fn delay(&self, attempt: u32, previous: Duration, sample: f64) -> Option<Duration> {
        let sample = if sample.is_finite() { sample.clamp(0.0, 1.0) } else { 0.0 };
        let delay = match *self {
            Self::Disabled => return None,
            Self::Static { delay_ms } => Duration::from_millis(delay_ms),
            Self::DecorrelatedJitter {
                base_delay_ms,
                max_delay_ms,
            } => {
                let base = Duration::from_millis(base_delay_ms);
                let upper = previous.max(base).saturating_mul(3);
                let drawn = base + (upper - base).mul_f64(sample);
                drawn.min(Duration::from_millis(max_delay_ms))
            }
            Self::Exponential {
                base_delay_ms,
                max_delay_ms,
            } => {
                let ceiling = Duration::from_millis(base_delay_ms)
                    .saturating_mul(2_u32.saturating_pow(attempt))
                    .min(Duration::from_millis(max_delay_ms));
                ceiling.mul_f64(sample)
            }
        };
        Some(delay)
    }
}

/// Retry policy of a [`Client`](crate::Client).
///
/// # Examples
///
/// ```
/// use dynaxpr_http::retry::{Backoff, RetryConfig};
///
/// let retry = RetryConfig::builder()
///     .backoff(Backoff::Static { delay_ms: 100 })
///     .time_limit_secs(5)
///     .build();
/// assert_eq!(retry.time_limit().as_secs(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Delay strategy.
    #[builder(default)]
    pub backoff: Backoff,

    /// Total time allowed for retrying one request.
    #[builder(default = DEFAULT_TIME_LIMIT_SECS)]
    pub time_limit_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff: Backoff::default(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            backoff: Backoff::Disabled,
            time_limit_secs: 0,
        }
    }

    /// The time budget as a `Duration`.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// The next delay, drawing the jitter from the thread-local RNG.
    pub(crate) fn next_delay(&self, attempt: u32, previous: Duration) -> Option<Duration> {
        self.backoff.delay(attempt, previous, rand::random::<f64>())
    }
}
