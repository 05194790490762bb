//! Retry policy for transient tile fetch failures.
//!
//! Only transport-level failures are retried (see
//! [`ProviderError::is_transient`](super::ProviderError::is_transient)).
//!
//! # Example
//!
//! ```
//! use aerialview::provider::RetryPolicy;
//! use std::time::Duration;
//!
//! // Three attempts in total, doubling the wait after each failure
//! let policy = RetryPolicy::exponential(3, Duration::from_millis(100));
//! assert_eq!(policy.max_attempts(), 3);
//! assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(100)));
//! assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(200)));
//! assert_eq!(policy.delay_for_attempt(3), None);
//! ```

use std::time::Duration;

/// Default maximum delay for exponential backoff (5 seconds).
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Default multiplier for exponential backoff.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// How a tile fetch handles transient failures.
#[derive(Clone, Debug, PartialEq)]
pub enum RetryPolicy {
    /// No retries - fail immediately on error.
    None,

    /// Fixed number of attempts with constant delay between them.
    Fixed {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay between attempts.
        delay: Duration,
    },

    /// Exponential backoff.
    ///
    /// The delay is multiplied after each failed attempt, up to a maximum.
    ExponentialBackoff {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay after the first failure.
        initial_delay: Duration,
        /// Maximum delay cap.
        max_delay: Duration,
        /// Multiplier applied to delay after each failure.
        multiplier: f64,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::None
    }
}

impl RetryPolicy {
    /// Creates an exponential backoff policy capped at [`DEFAULT_MAX_DELAY`].
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum number of attempts (including initial)
    /// * `initial_delay` - Delay after the first failure
    pub fn exponential(max_attempts: u32, initial_delay: Duration) -> Self {
        Self::ExponentialBackoff {
            max_attempts,
            initial_delay,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Creates a fixed retry policy.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    /// Calculates the delay before the next attempt.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The number of the attempt that just failed (1-based)
    ///
    /// # Returns
    ///
    /// The delay to wait, or `None` if no attempts remain.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts() {
            return None;
        }

        match self {
            Self::None => None,
            Self::Fixed { delay, .. } => Some(*delay),
            Self::ExponentialBackoff {
                initial_delay,
                max_delay,
                multiplier,
                ..
            } => {
                let factor = multiplier.powi(attempt.saturating_sub(1) as i32);
                let delay_ms = initial_delay.as_millis() as f64 * factor;
                let capped = delay_ms.min(max_delay.as_millis() as f64);
                Some(Duration::from_millis(capped as u64))
            }
        }
    }

    /// Returns the maximum number of attempts for this policy (at least 1).
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } => (*max_attempts).max(1),
            Self::ExponentialBackoff { max_attempts, .. } => (*max_attempts).max(1),
        }
    }
}
