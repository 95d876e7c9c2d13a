//! Moka store utilization gauges.
//!
//! - `pulse_moka_entries` - current number of entries
//! - `pulse_moka_size_bytes` - current weighted size
//!
//! Both carry a `backend` label. Enable the `metrics` feature to emit them.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for the entry count gauge.
    pub static ref MOKA_ENTRIES: &'static str = {
        metrics::describe_gauge!(
            "pulse_moka_entries",
            "Current number of entries in the Moka store."
        );
        "pulse_moka_entries"
    };

    /// Metric name for the weighted size gauge.
    pub static ref MOKA_SIZE_BYTES: &'static str = {
        metrics::describe_gauge!(
            "pulse_moka_size_bytes",
            "Current weighted size of the Moka store."
        );
        "pulse_moka_size_bytes"
    };
}

/// Records current utilization for `backend`.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_capacity(backend: &str, entries: u64, size: u64) {
    metrics::gauge!(*MOKA_ENTRIES, "backend" => backend.to_string()).set(entries as f64);
    metrics::gauge!(*MOKA_SIZE_BYTES, "backend" => backend.to_string()).set(size as f64);
}

/// Records current utilization (no-op without the `metrics` feature).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_capacity(_backend: &str, _entries: u64, _size: u64) {}
