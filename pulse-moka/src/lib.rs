#![warn(missing_docs)]
//! In-memory store for pulse backed by [`moka`].
//!
//! Entries live for the lifetime of the process and are only evicted under
//! capacity pressure. Age is never a reason for eviction here: expired
//! entries must stay readable for the stale fallback.
//!
//! ```
//! use pulse_moka::MokaBackend;
//!
//! let backend = MokaBackend::builder().max_entries(1_000).build();
//! ```

mod backend;
mod builder;
pub mod metrics;

pub use backend::MokaBackend;
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
