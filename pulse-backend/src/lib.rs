//! Storage traits for the pulse request orchestrator.
//!
//! A [`Backend`] is a plain key/value store for timestamped byte payloads.
//! It never expires anything on its own: freshness is a read-time decision
//! made by [`CacheBackend::get_fresh`], while [`CacheBackend::get_any`] returns
//! whatever is stored regardless of age so that callers can fall back to stale
//! data.
//!
//! Implement [`Backend`] for a new store; [`CacheBackend`] comes with typed
//! `get`/`set` defaults built on top of it.
mod backend;
mod error;
pub mod format;
mod key;
#[cfg(feature = "test-helpers")]
pub mod mock;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use error::BackendError;
pub use format::{Format, FormatError, JsonFormat};
pub use key::CacheKeyFormat;
#[cfg(feature = "test-helpers")]
pub use mock::MockBackend;

/// Outcome of a remove operation.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record removed.
    Deleted(u32),
    /// Record was not there.
    Missing,
}
