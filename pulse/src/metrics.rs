//! Orchestrator metrics.
//!
//! Enable the `metrics` feature to emit them through the [`metrics`] facade.
//! Every metric carries an `operation` label set to the cache key prefix.
//!
//! - `pulse_throttled_hits_total` - calls answered from a fresh entry
//! - `pulse_provider_attempts_total` - provider invocations
//! - `pulse_rate_limited_total` - rate-limited attempts
//! - `pulse_stale_fallback_total` - calls answered from an expired entry
//! - `pulse_failures_total` - calls that returned an error
//! - `pulse_store_write_failures_total` - results that could not be stored
//! - `pulse_upstream_duration_seconds` - provider call latency
//!
//! [`metrics`]: https://docs.rs/metrics

use std::time::Duration;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Calls answered from a fresh entry inside the throttle window.
    pub static ref THROTTLED_HITS: &'static str = {
        metrics::describe_counter!(
            "pulse_throttled_hits_total",
            "Total number of calls answered from a fresh entry without contacting the provider."
        );
        "pulse_throttled_hits_total"
    };
    /// Provider invocations, retries included.
    pub static ref PROVIDER_ATTEMPTS: &'static str = {
        metrics::describe_counter!(
            "pulse_provider_attempts_total",
            "Total number of provider invocations."
        );
        "pulse_provider_attempts_total"
    };
    /// Rate-limited attempts.
    pub static ref RATE_LIMITED: &'static str = {
        metrics::describe_counter!(
            "pulse_rate_limited_total",
            "Total number of provider attempts rejected by a rate limit."
        );
        "pulse_rate_limited_total"
    };
    /// Calls answered from an expired entry.
    pub static ref STALE_FALLBACKS: &'static str = {
        metrics::describe_counter!(
            "pulse_stale_fallback_total",
            "Total number of calls answered from an expired entry after a rate limit."
        );
        "pulse_stale_fallback_total"
    };
    /// Calls that returned an error.
    pub static ref FAILURES: &'static str = {
        metrics::describe_counter!(
            "pulse_failures_total",
            "Total number of orchestrated calls that returned an error."
        );
        "pulse_failures_total"
    };
    /// Results that could not be written to the store.
    pub static ref STORE_WRITE_FAILURES: &'static str = {
        metrics::describe_counter!(
            "pulse_store_write_failures_total",
            "Total number of provider results that could not be stored."
        );
        "pulse_store_write_failures_total"
    };
    /// Provider call latency.
    pub static ref UPSTREAM_DURATION: &'static str = {
        metrics::describe_histogram!(
            "pulse_upstream_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of provider calls in seconds."
        );
        "pulse_upstream_duration_seconds"
    };
}

/// Events counted by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Fresh entry returned inside the throttle window.
    ThrottledHit,
    /// Provider invoked.
    Attempt,
    /// Provider answered with a rate limit.
    RateLimited,
    /// Expired entry returned.
    StaleFallback,
    /// Error returned to the caller.
    Failure,
    /// Result not stored.
    StoreWriteFailure,
}

/// Zero-cost timer: captures an instant only with the `metrics` feature.
pub struct Timer {
    #[cfg(feature = "metrics")]
    start: std::time::Instant,
}

impl Timer {
    /// Starts timing.
    #[inline]
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "metrics")]
            start: std::time::Instant::now(),
        }
    }

    /// Elapsed time, or zero without the `metrics` feature.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        #[cfg(feature = "metrics")]
        {
            self.start.elapsed()
        }
        #[cfg(not(feature = "metrics"))]
        {
            Duration::ZERO
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts one occurrence of `event` for `operation`.
#[cfg(feature = "metrics")]
#[inline]
pub fn record(operation: &str, event: Event) {
    let name = match event {
        Event::ThrottledHit => *THROTTLED_HITS,
        Event::Attempt => *PROVIDER_ATTEMPTS,
        Event::RateLimited => *RATE_LIMITED,
        Event::StaleFallback => *STALE_FALLBACKS,
        Event::Failure => *FAILURES,
        Event::StoreWriteFailure => *STORE_WRITE_FAILURES,
    };
    metrics::counter!(name, "operation" => operation.to_string()).increment(1);
}

/// Counts one occurrence of `event` (no-op without the `metrics` feature).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record(_operation: &str, _event: Event) {}

/// Records the latency of one provider call.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_upstream_duration(operation: &str, duration: Duration) {
    metrics::histogram!(*UPSTREAM_DURATION, "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

/// Records the latency of one provider call (no-op without the `metrics` feature).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_upstream_duration(_operation: &str, _duration: Duration) {}
