//! Builder for configuring [`MokaBackend`].
//!
//! Capacity is mandatory and chosen exactly once, enforced with typestate:
//! `build()` only exists after [`max_entries`](MokaBackendBuilder::max_entries)
//! or [`max_bytes`](MokaBackendBuilder::max_bytes).

use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;
use pulse_backend::CacheKeyFormat;
use pulse_core::{BackendLabel, CacheEntry, CacheKey, Raw};

use crate::backend::MokaBackend;

/// Capacity not configured yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// At most `n` entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// At most `n` bytes, approximately.
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for [`MokaBackend`], created with [`MokaBackend::builder`].
///
/// ```
/// use pulse_moka::{EvictionPolicy, MokaBackend};
///
/// let backend = MokaBackend::builder()
///     .label("session")
///     .max_bytes(8 * 1024 * 1024)
///     .eviction_policy(EvictionPolicy::lru())
///     .build();
/// ```
pub struct MokaBackendBuilder<Cap> {
    capacity: Cap,
    key_format: CacheKeyFormat,
    label: BackendLabel,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaBackendBuilder<NoCapacity> {
    /// Creates a builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            key_format: CacheKeyFormat::Plain,
            label: BackendLabel::new_static("moka"),
            eviction_policy: None,
        }
    }

    /// Limits the cache by entry count.
    pub fn max_entries(self, capacity: u64) -> MokaBackendBuilder<EntryCapacity> {
        self.with_capacity(EntryCapacity(capacity))
    }

    /// Limits the cache by approximate memory usage of keys and payloads.
    pub fn max_bytes(self, bytes: u64) -> MokaBackendBuilder<ByteCapacity> {
        self.with_capacity(ByteCapacity(bytes))
    }

    fn with_capacity<Cap>(self, capacity: Cap) -> MokaBackendBuilder<Cap> {
        MokaBackendBuilder {
            capacity,
            key_format: self.key_format,
            label: self.label,
            eviction_policy: self.eviction_policy,
        }
    }
}

impl Default for MokaBackendBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaBackendBuilder<Cap> {
    /// Sets the label reported as the response source. Defaults to `"moka"`.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the key format. Defaults to [`CacheKeyFormat::Plain`].
    pub fn key_format(mut self, format: CacheKeyFormat) -> Self {
        self.key_format = format;
        self
    }

    /// Overrides the eviction policy.
    ///
    /// Defaults to TinyLFU for entry capacity and LRU for byte capacity.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    fn finish(self, cache: Cache<CacheKey, CacheEntry<Raw>>) -> MokaBackend {
        MokaBackend {
            cache,
            key_format: self.key_format,
            label: self.label,
        }
    }
}

impl MokaBackendBuilder<EntryCapacity> {
    /// Builds the backend with entry-count capacity.
    pub fn build(self) -> MokaBackend {
        let policy = self
            .eviction_policy
            .clone()
            .unwrap_or_else(EvictionPolicy::tiny_lfu);
        let cache = CacheBuilder::new(self.capacity.0)
            .eviction_policy(policy)
            .build();
        self.finish(cache)
    }
}

impl MokaBackendBuilder<ByteCapacity> {
    /// Builds the backend with byte capacity.
    pub fn build(self) -> MokaBackend {
        let policy = self
            .eviction_policy
            .clone()
            .unwrap_or_else(EvictionPolicy::lru);
        let cache = CacheBuilder::new(self.capacity.0)
            .weigher(byte_weigher)
            .eviction_policy(policy)
            .build();
        self.finish(cache)
    }
}

fn byte_weigher(key: &CacheKey, entry: &CacheEntry<Raw>) -> u32 {
    (key.memory_size() + entry.memory_size()).min(u32::MAX as usize) as u32
}
