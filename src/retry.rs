//! Retry strategies and predicates for transient request failures.
//!
//! The request engine repeats an attempt when the configured
//! [`RetryPredicate`] accepts the failure, waiting as long as the
//! [`RetryStrategy`] says between attempts.

use crate::Error;
use rand::Rng;
use std::time::Duration;

/// Defines how long to wait between attempts and when to stop.
///
/// The default strategy of a [`Config`](crate::Config) is `Fixed`, built from
/// its delay interval and maximum number of retries.
///
/// # Examples
///
/// ```
/// use gsclient::RetryStrategy;
/// use std::time::Duration;
///
/// // 1s, 1s, 1s, then give up
/// let fixed = RetryStrategy::Fixed {
///     delay: Duration::from_secs(1),
///     max_retries: 3,
/// };
/// assert_eq!(fixed.delay_for_attempt(4), None);
///
/// // 100ms, 200ms, 400ms, ... capped at 5s
/// let exponential = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(5),
///     max_retries: 5,
///     jitter: false,
/// };
/// assert_eq!(exponential.delay_for_attempt(3), Some(Duration::from_millis(400)));
/// ```
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    None,

    /// Retry after the same delay every time.
    Fixed {
        /// The delay between attempts.
        delay: Duration,
        /// The maximum number of retries after the first attempt.
        max_retries: usize,
    },

    /// Retry with exponentially increasing delays.
    ///
    /// Each retry waits for `initial_delay * 2^(attempt - 1)` (capped at `max_delay`).
    ExponentialBackoff {
        /// The delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between retries.
        max_delay: Duration,
        /// The maximum number of retries after the first attempt.
        max_retries: usize,
        /// Whether to scale each delay by a random factor between 0.5 and 1.0.
        jitter: bool,
    },

    /// Custom retry logic.
    ///
    /// The function receives the attempt that just failed (1-indexed) and
    /// returns the delay before the next one, or `None` to stop.
    Custom {
        /// Function that determines retry delay.
        delay_fn: fn(attempt: usize) -> Option<Duration>,
    },
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::Fixed {
            delay: crate::config::DEFAULT_DELAY_INTERVAL,
            max_retries: crate::config::DEFAULT_MAX_NUMBER_OF_RETRIES,
        }
    }
}

impl RetryStrategy {
    /// Returns the delay before the retry following failed attempt `attempt`,
    /// or `None` if retries are exhausted.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::Fixed { delay, max_retries } => {
                if attempt > *max_retries {
                    None
                } else {
                    Some(*delay)
                }
            }
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                max_retries,
                jitter,
            } => {
                if attempt > *max_retries {
                    return None;
                }

                let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1) as u32);
                let delay = initial_delay.saturating_mul(multiplier).min(*max_delay);

                if *jitter {
                    let factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(factor))
                } else {
                    Some(delay)
                }
            }
            RetryStrategy::Custom { delay_fn } => delay_fn(attempt),
        }
    }

    /// Returns the maximum number of retries, if bounded.
    pub fn max_retries(&self) -> Option<usize> {
        match self {
            RetryStrategy::None => Some(0),
            RetryStrategy::Fixed { max_retries, .. } => Some(*max_retries),
            RetryStrategy::ExponentialBackoff { max_retries, .. } => Some(*max_retries),
            RetryStrategy::Custom { .. } => None,
        }
    }
}

/// Decides whether a failed attempt should be repeated.
///
/// # Examples
///
/// ```
/// use gsclient::{Error, RetryPredicate};
///
/// /// Only retry when the gateway is unavailable.
/// struct RetryOn503;
///
/// impl RetryPredicate for RetryOn503 {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         error.status_code() == 503
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the attempt that produced `error` should be repeated.
    ///
    /// `attempt` is 1-indexed.
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry every error whose [`Error::is_retryable`] is `true`.
///
/// This is the default: transport failures, 5xx responses and rate-limited
/// 429 responses.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnRetryable;

impl RetryPredicate for RetryOnRetryable {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Retry only 5xx responses.
#[derive(Debug, Clone, Copy)]
pub struct RetryOn5xx;

impl RetryPredicate for RetryOn5xx {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Http { status, .. } if status.is_server_error())
    }
}

/// Retry only transport failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTransport;

impl RetryPredicate for RetryOnTransport {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_delays() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            max_retries: 5,
            jitter: false,
        };

        assert_eq!(
            strategy.delay_for_attempt(1),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            strategy.delay_for_attempt(2),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            strategy.delay_for_attempt(4),
            Some(Duration::from_millis(800))
        );
        assert_eq!(strategy.delay_for_attempt(5), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(6), None);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            max_retries: 3,
            jitter: true,
        };

        for _ in 0..20 {
            let delay = strategy.delay_for_attempt(1).unwrap();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(200));
        }
    }

    #[test]
    fn test_fixed_delays() {
        let strategy = RetryStrategy::Fixed {
            delay: Duration::from_secs(1),
            max_retries: 3,
        };

        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(4), None);
        assert_eq!(strategy.max_retries(), Some(3));
    }

    #[test]
    fn test_default_matches_configuration_defaults() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.max_retries(), Some(5));
        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(RetryStrategy::None.delay_for_attempt(1), None);
    }

    #[test]
    fn test_custom_strategy() {
        let strategy = RetryStrategy::Custom {
            delay_fn: |attempt| (attempt < 3).then(|| Duration::from_millis(5)),
        };
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(5)));
        assert_eq!(strategy.delay_for_attempt(3), None);
        assert_eq!(strategy.max_retries(), None);
    }

    #[test]
    fn test_stock_predicates() {
        let unavailable = Error::http(
            http::StatusCode::SERVICE_UNAVAILABLE,
            String::new(),
            http::HeaderMap::new(),
            None,
            None,
        );
        let conflict = Error::http(
            http::StatusCode::CONFLICT,
            String::new(),
            http::HeaderMap::new(),
            None,
            None,
        );

        assert!(RetryOnRetryable.should_retry(&unavailable, 1));
        assert!(!RetryOnRetryable.should_retry(&conflict, 1));
        assert!(RetryOn5xx.should_retry(&unavailable, 1));
        assert!(!RetryOnTransport.should_retry(&unavailable, 1));
        assert!(!RetryOnTransport.should_retry(&Error::Cancelled, 1));
    }
}
