use async_trait::async_trait;
use moka::future::Cache;
use pulse_backend::{Backend, BackendResult, CacheKeyFormat, DeleteStatus};
use pulse_core::{BackendLabel, CacheEntry, CacheKey, Raw};

use crate::builder::{MokaBackendBuilder, NoCapacity};

/// In-memory store powered by Moka's async cache.
///
/// Clones share the same underlying cache.
///
/// Data is not persisted and not shared across processes; use
/// `pulse-feoxdb` when entries should survive a restart.
#[derive(Clone)]
pub struct MokaBackend {
    pub(crate) cache: Cache<CacheKey, CacheEntry<Raw>>,
    pub(crate) key_format: CacheKeyFormat,
    pub(crate) label: BackendLabel,
}

impl std::fmt::Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .field("key_format", &self.key_format)
            .finish()
    }
}

impl MokaBackend {
    /// Creates a builder. A capacity must be chosen before `build()`.
    pub fn builder() -> MokaBackendBuilder<NoCapacity> {
        MokaBackendBuilder::new()
    }

    /// Underlying Moka cache, for inspection and `run_pending_tasks()`.
    pub fn cache(&self) -> &Cache<CacheKey, CacheEntry<Raw>> {
        &self.cache
    }
}

#[async_trait]
impl Backend for MokaBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()> {
        self.cache.insert(key.clone(), entry).await;
        crate::metrics::record_capacity(
            self.label.as_str(),
            self.cache.entry_count(),
            self.cache.weighted_size(),
        );
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn key_format(&self) -> &CacheKeyFormat {
        &self.key_format
    }
}

impl pulse_backend::CacheBackend for MokaBackend {}
