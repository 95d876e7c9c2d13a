//! Wall-clock abstraction.
//!
//! Entry timestamps and the throttle window are both measured with a
//! [`Clock`], so tests can move time explicitly instead of sleeping.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
mod manual {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};

    use super::Clock;

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::at_millis(0)
        }
    }

    impl ManualClock {
        /// Creates a clock set to the given instant.
        pub fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        /// Creates a clock set to `millis` after the Unix epoch.
        pub fn at_millis(millis: i64) -> Self {
            let now = Utc
                .timestamp_millis_opt(millis)
                .single()
                .unwrap_or_default();
            Self::new(now)
        }

        /// Moves the clock forward.
        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
            *now += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        }

        /// Sets the clock to `millis` after the Unix epoch.
        pub fn set_millis(&self, millis: i64) {
            let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
            *now = Utc
                .timestamp_millis_opt(millis)
                .single()
                .unwrap_or_default();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(|e| e.into_inner())
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use manual::ManualClock;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::at_millis(0);
        let shared = clock.clone();
        assert_eq!(clock.now().timestamp_millis(), 0);

        shared.advance(Duration::from_millis(200));
        assert_eq!(clock.now().timestamp_millis(), 200);

        clock.set_millis(1500);
        assert_eq!(shared.now().timestamp_millis(), 1500);
    }
}
