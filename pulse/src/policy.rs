use std::time::Duration;

use bounded_integer::bounded_integer;
use serde::{Deserialize, Serialize};

use crate::backoff::Backoff;

bounded_integer! {
    /// Number of retries after the first attempt (0-16).
    /// Only rate-limited attempts are retried.
    #[repr(u8)]
    pub struct RetryLimit { 0..=16 }
}

/// Per-call cache, throttle and retry settings.
///
/// Durations are written in humantime form when deserialized:
///
/// ```
/// use pulse::RequestPolicy;
/// use std::time::Duration;
///
/// let policy: RequestPolicy = serde_saphyr::from_str(
///     "ttl: 15m\nthrottle: 30s\nmax_retries: 2\ninitial_delay: 2s\n",
/// ).unwrap();
/// assert_eq!(policy.ttl, Duration::from_secs(15 * 60));
/// assert_eq!(policy.max_retries.get(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RequestPolicy {
    /// How long a stored payload counts as fresh.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// A fresh entry is returned without calling the provider only if the
    /// last successful provider call is younger than this window.
    #[serde(with = "humantime_serde")]
    pub throttle: Duration,
    /// Retries after a rate-limited first attempt.
    pub max_retries: RetryLimit,
    /// Delay before the first retry, without jitter.
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Growth of the delay between retries. Values below 1.0 act as 1.0.
    pub backoff_factor: f64,
    /// Upper bound of the random jitter added to every delay.
    #[serde(with = "humantime_serde")]
    pub max_jitter: Duration,
    /// Optional cap for the delay before jitter.
    #[serde(default, with = "humantime_serde")]
    pub max_delay: Option<Duration>,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            throttle: Duration::from_secs(30),
            max_retries: RetryLimit::new_saturating(2),
            initial_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_jitter: Duration::from_secs(1),
            max_delay: None,
        }
    }
}

impl RequestPolicy {
    /// Sets the TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the throttle window.
    pub fn throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sets the retry limit, saturating at the bounds of [`RetryLimit`].
    pub fn max_retries(mut self, retries: u8) -> Self {
        self.max_retries = RetryLimit::new_saturating(retries);
        self
    }

    /// Sets the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the delay growth factor.
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Sets the maximum jitter.
    pub fn max_jitter(mut self, jitter: Duration) -> Self {
        self.max_jitter = jitter;
        self
    }

    /// Caps the pre-jitter delay.
    pub fn max_delay(mut self, cap: Duration) -> Self {
        self.max_delay = Some(cap);
        self
    }

    /// Total number of provider attempts a call may make.
    pub fn max_attempts(&self) -> u32 {
        u32::from(self.max_retries.get()) + 1
    }

    /// Delay sequence for this policy.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = RequestPolicy::default();
        assert_eq!(policy.ttl, Duration::from_secs(900));
        assert_eq!(policy.throttle, Duration::from_secs(30));
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(2));
        assert_eq!(policy.backoff_factor, 2.0);
        assert_eq!(policy.max_jitter, Duration::from_secs(1));
        assert_eq!(policy.max_delay, None);
    }

    #[test]
    fn retry_limit_saturates() {
        let policy = RequestPolicy::default().max_retries(200);
        assert_eq!(policy.max_retries.get(), 16);
        assert_eq!(policy.max_attempts(), 17);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let policy: RequestPolicy =
            serde_saphyr::from_str("ttl: 500ms\nmax_delay: 10s\n").unwrap();
        assert_eq!(policy.ttl, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Some(Duration::from_secs(10)));
        assert_eq!(policy.throttle, Duration::from_secs(30));
    }

    #[test]
    fn retry_limit_out_of_range_is_rejected() {
        let result: Result<RequestPolicy, _> = serde_saphyr::from_str("max_retries: 17\n");
        assert!(result.is_err());
    }
}
