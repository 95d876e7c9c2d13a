#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # pulse
//!
//! Request orchestration for a rate-limited content provider.
//!
//! [`RequestOrchestrator::execute`] takes a cache key, a [`RequestPolicy`] and
//! a repeatable unit of work ([`Upstream`](pulse_core::Upstream)) and:
//!
//! 1. returns a fresh stored payload without calling the provider when the
//!    last successful provider call is inside the policy's throttle window;
//! 2. otherwise waits for the process-wide provider slot, so at most one
//!    provider call runs at a time, then re-checks step 1;
//! 3. calls the provider, storing any non-empty result;
//! 4. on a rate limit returns any stored payload for the key, however old,
//!    or retries with exponential backoff and jitter until the retry budget
//!    is spent;
//! 5. propagates every other provider error immediately.

/// Retry delay sequence.
pub mod backoff;

/// Error types for orchestrated calls.
pub mod error;

/// One-slot gate serializing provider calls.
pub mod gate;

/// Metrics collection for orchestrator observability.
///
/// With the `metrics` feature enabled, counters and a latency histogram are
/// emitted for throttled hits, provider attempts, rate limits, stale
/// fallbacks, failures and store write failures.
pub mod metrics;

mod orchestrator;

/// Per-call cache and retry configuration.
pub mod policy;

pub use backoff::Backoff;
pub use error::OrchestratorError;
pub use gate::{GatePermit, ProviderGate};
pub use orchestrator::RequestOrchestrator;
pub use policy::{RequestPolicy, RetryLimit};

pub use pulse_core::{
    BackendLabel, CacheKey, CacheStatus, CallContext, CallState, Clock, KeyPart, RateLimitAware,
    ResponseSource, SystemClock, Upstream,
};
