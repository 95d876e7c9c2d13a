#![warn(missing_docs)]
//! Persistent store for pulse backed by [FeOxDB](https://docs.rs/feoxdb).
//!
//! Entries survive restarts and are never expired by the store itself, so an
//! entry written days ago is still there to serve as a stale fallback. The
//! store is capacity-limited: once `max_memory` or `max_file_size` is
//! reached, writes fail with [`BackendError::InternalError`] and the
//! orchestrator logs and skips them.
//!
//! [`BackendError::InternalError`]: pulse_backend::BackendError::InternalError

mod backend;
mod error;

pub use backend::{FeOxDbBackend, FeOxDbBackendBuilder};
pub use error::FeOxDbError;
