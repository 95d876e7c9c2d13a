//! Retry delays.
//!
//! Each delay is `base + jitter`, where `base` starts at the policy's
//! `initial_delay` and is multiplied by `backoff_factor` after every step,
//! optionally capped by `max_delay`. Jitter is drawn uniformly from
//! `0..=max_jitter` on every step.

use std::time::Duration;

use rand::Rng;

use crate::RequestPolicy;

/// Infinite iterator of retry delays for one call.
///
/// ```
/// use pulse::RequestPolicy;
/// use std::time::Duration;
///
/// let policy = RequestPolicy::default()
///     .initial_delay(Duration::from_millis(100))
///     .backoff_factor(2.0)
///     .max_jitter(Duration::ZERO);
/// let delays: Vec<_> = policy.backoff().take(3).collect();
/// assert_eq!(
///     delays,
///     [100, 200, 400].map(Duration::from_millis),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    factor: f64,
    max_delay: Option<Duration>,
    max_jitter: Duration,
}

impl Backoff {
    /// Creates the delay sequence for `policy`.
    pub fn new(policy: &RequestPolicy) -> Self {
        let factor = if policy.backoff_factor.is_finite() {
            policy.backoff_factor.max(1.0)
        } else {
            1.0
        };
        let mut backoff = Self {
            next: policy.initial_delay,
            factor,
            max_delay: policy.max_delay,
            max_jitter: policy.max_jitter,
        };
        backoff.next = backoff.cap(backoff.next);
        backoff
    }

    /// Base delay of the next step, before jitter.
    #[cfg(test)]
    fn peek_base(&self) -> Duration {
        self.next
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    fn jitter(&self) -> Duration {
        let max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max))
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let base = self.next;
        let scaled = Duration::try_from_secs_f64(base.as_secs_f64() * self.factor)
            .unwrap_or(Duration::MAX);
        self.next = self.cap(scaled);
        Some(base.saturating_add(self.jitter()))
    }
}
