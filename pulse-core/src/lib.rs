#![warn(missing_docs)]
//! # pulse-core
//!
//! Core traits and types shared by every crate of the pulse workspace.
//!
//! The request orchestrator in `pulse` wraps calls to an external content
//! provider with a TTL cache, a throttle window, rate-limit backoff and a
//! stale-data fallback. This crate holds the vocabulary that the orchestrator,
//! the storage backends and the provider client agree on:
//!
//! - **Address** cached payloads ([`CacheKey`])
//! - **Timestamp** stored payloads ([`CacheEntry`], [`Clock`])
//! - **Call** the provider ([`Upstream`])
//! - **Classify** provider failures ([`RateLimitAware`], [`ProviderError`])
//! - **Report** what happened to a call ([`CallContext`])

pub mod clock;
pub mod context;
pub mod entry;
pub mod error;
pub mod key;
pub mod label;
pub mod upstream;

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use context::{CacheStatus, CallContext, CallState, ResponseSource};
pub use entry::{CacheEntry, Freshness};
pub use error::{ProviderError, RateLimitAware};
pub use key::{CacheKey, KeyPart};
pub use label::BackendLabel;
pub use upstream::Upstream;

/// Raw byte data type used for serialized cache payloads.
/// Using `Bytes` provides cheap cloning via reference counting.
pub type Raw = bytes::Bytes;
