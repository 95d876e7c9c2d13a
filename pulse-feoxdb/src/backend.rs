use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use bincode::{
    config::standard as bincode_config,
    serde::{decode_from_slice, encode_to_vec},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use feoxdb::{FeoxError, FeoxStore};
use pulse_backend::{Backend, BackendError, BackendResult, CacheKeyFormat, DeleteStatus};
use pulse_core::{BackendLabel, CacheEntry, CacheKey, Raw};
use serde::{Deserialize, Serialize};

use crate::FeOxDbError;

const DB_FILE_NAME: &str = "pulse.db";

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,
    stored_at: DateTime<Utc>,
}

impl From<CacheEntry<Raw>> for StoredEntry {
    fn from(entry: CacheEntry<Raw>) -> Self {
        let (stored_at, data) = entry.into_parts();
        Self {
            data: data.to_vec(),
            stored_at,
        }
    }
}

impl From<StoredEntry> for CacheEntry<Raw> {
    fn from(entry: StoredEntry) -> Self {
        CacheEntry::new(Bytes::from(entry.data), entry.stored_at)
    }
}

/// Disk-backed store using FeOxDB.
///
/// ```no_run
/// use pulse_feoxdb::FeOxDbBackend;
///
/// let backend = FeOxDbBackend::builder()
///     .path("/var/cache/pulse")
///     .max_file_size(64 * 1024 * 1024)
///     .max_memory(16 * 1024 * 1024)
///     .build()?;
/// # Ok::<(), pulse_feoxdb::FeOxDbError>(())
/// ```
///
/// Clones share the same database.
#[derive(Clone)]
pub struct FeOxDbBackend {
    store: Arc<FeoxStore>,
    key_format: CacheKeyFormat,
    label: BackendLabel,
}

impl std::fmt::Debug for FeOxDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeOxDbBackend")
            .field("label", &self.label)
            .field("key_format", &self.key_format)
            .finish_non_exhaustive()
    }
}

impl FeOxDbBackend {
    /// Starts building a new backend.
    pub fn builder() -> FeOxDbBackendBuilder {
        FeOxDbBackendBuilder::default()
    }

    /// Memory-only backend. Data is lost when dropped.
    pub fn in_memory() -> Result<Self, FeOxDbError> {
        Self::builder().build()
    }

    /// Forces buffered writes to disk. No-op in memory-only mode.
    pub fn flush(&self) {
        self.store.flush();
    }
}

/// Builder for [`FeOxDbBackend`].
#[derive(Debug)]
pub struct FeOxDbBackendBuilder {
    path: Option<PathBuf>,
    max_file_size: Option<u64>,
    max_memory: Option<usize>,
    key_format: CacheKeyFormat,
    label: BackendLabel,
}

impl Default for FeOxDbBackendBuilder {
    fn default() -> Self {
        Self {
            path: None,
            max_file_size: None,
            max_memory: None,
            key_format: CacheKeyFormat::Plain,
            label: BackendLabel::new_static("feoxdb"),
        }
    }
}

impl FeOxDbBackendBuilder {
    /// Enables persistent storage.
    ///
    /// If `path` is a directory, the database file `pulse.db` is created
    /// inside it.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Caps the database file. Writes fail once it is full.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Caps RAM usage. In memory-only mode this is the total capacity.
    pub fn max_memory(mut self, bytes: usize) -> Self {
        self.max_memory = Some(bytes);
        self
    }

    /// Key serialization format.
    pub fn key_format(mut self, format: CacheKeyFormat) -> Self {
        self.key_format = format;
        self
    }

    /// Label reported as the response source.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Opens the database.
    pub fn build(self) -> Result<FeOxDbBackend, FeOxDbError> {
        let mut builder = FeoxStore::builder();

        if let Some(mut path) = self.path {
            if path.is_dir() {
                path.push(DB_FILE_NAME);
            } else if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            builder = builder.device_path(path.to_string_lossy().to_string());
        }

        if let Some(file_size) = self.max_file_size {
            builder = builder.file_size(file_size);
        }

        if let Some(memory) = self.max_memory {
            builder = builder.max_memory(memory);
        }

        let store = builder.build()?;
        tracing::debug!(label = %self.label, "feoxdb store opened");

        Ok(FeOxDbBackend {
            store: Arc::new(store),
            key_format: self.key_format,
            label: self.label,
        })
    }
}

#[async_trait]
impl Backend for FeOxDbBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>> {
        let store = self.store.clone();
        let key_bytes = self.key_format.serialize(key)?;

        tokio::task::spawn_blocking(move || match store.get(&key_bytes) {
            Ok(encoded) => {
                let (stored, _): (StoredEntry, _) =
                    decode_from_slice(&encoded, bincode_config()).map_err(BackendError::internal)?;
                Ok(Some(stored.into()))
            }
            Err(FeoxError::KeyNotFound) => Ok(None),
            Err(e) => Err(BackendError::internal(e)),
        })
        .await
        .map_err(BackendError::internal)?
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()> {
        let store = self.store.clone();
        let key_bytes = self.key_format.serialize(key)?;

        let stored: StoredEntry = entry.into();
        let value_bytes = encode_to_vec(&stored, bincode_config()).map_err(BackendError::internal)?;

        tokio::task::spawn_blocking(move || {
            store
                .insert(&key_bytes, &value_bytes)
                .map_err(BackendError::internal)?;
            Ok(())
        })
        .await
        .map_err(BackendError::internal)?
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        let store = self.store.clone();
        let key_bytes = self.key_format.serialize(key)?;

        tokio::task::spawn_blocking(move || {
            if store.contains_key(&key_bytes) {
                store.delete(&key_bytes).map_err(BackendError::internal)?;
                Ok(DeleteStatus::Deleted(1))
            } else {
                Ok(DeleteStatus::Missing)
            }
        })
        .await
        .map_err(BackendError::internal)?
    }

    fn key_format(&self) -> &CacheKeyFormat {
        &self.key_format
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }
}

impl pulse_backend::CacheBackend for FeOxDbBackend {}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_backend::CacheBackend;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::TempDir;

    fn entry(data: &'static [u8]) -> CacheEntry<Raw> {
        CacheEntry::new(Bytes::from_static(data), Utc::now())
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FeOxDbBackend::builder()
            .path(temp_dir.path())
            .build()
            .unwrap();

        let key = CacheKey::from_str("feed", "All");
        let written = entry(b"[1,2]");
        backend.write(&key, written.clone()).await.unwrap();

        let read = backend.read(&key).await.unwrap().unwrap();
        assert_eq!(read.data().as_ref(), b"[1,2]");
        assert_eq!(read.stored_at(), written.stored_at());
    }

    #[tokio::test]
    async fn test_old_entries_are_kept() {
        let backend = FeOxDbBackend::in_memory().unwrap();
        let key = CacheKey::from_str("memes", "hot");
        let long_ago = Utc::now() - chrono::Duration::days(30);
        backend.set(&key, &json!(["meme"]), long_ago).await.unwrap();

        let fresh: Option<CacheEntry<Value>> = backend
            .get_fresh(&key, Duration::from_secs(1800), Utc::now())
            .await
            .unwrap();
        assert!(fresh.is_none());

        let stale: CacheEntry<Value> = backend.get_any(&key).await.unwrap().unwrap();
        assert_eq!(stale.data(), &json!(["meme"]));
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = FeOxDbBackend::in_memory().unwrap();
        let key = CacheKey::from_str("rewrite", "hello");

        backend.write(&key, entry(b"{}")).await.unwrap();
        assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Deleted(1));
        assert!(backend.read(&key).await.unwrap().is_none());
        assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Missing);
    }

    #[tokio::test]
    async fn test_clone_shares_store() {
        let backend1 = FeOxDbBackend::in_memory().unwrap();
        let backend2 = backend1.clone();
        let key = CacheKey::from_str("shared", "1");

        backend1.write(&key, entry(b"\"v\"")).await.unwrap();
        assert!(backend2.read(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_limit_exceeded() {
        let backend = FeOxDbBackend::builder().max_memory(1024).build().unwrap();
        let key = CacheKey::from_str("big", "1");
        let value = CacheEntry::new(Bytes::from(vec![b'x'; 2048]), Utc::now());

        let result = backend.write(&key, value).await;
        assert!(matches!(result, Err(BackendError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_builder_with_label() {
        let backend = FeOxDbBackend::builder().label("disk").build().unwrap();
        assert_eq!(backend.label().as_str(), "disk");
    }

    #[tokio::test]
    async fn test_flush_persists_data() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join(DB_FILE_NAME);
        let key = CacheKey::from_str("persist", "1");

        {
            let backend = FeOxDbBackend::builder()
                .path(temp_dir.path())
                .build()
                .unwrap();
            backend.write(&key, entry(b"\"kept\"")).await.unwrap();
            backend.flush();
        }

        let backend = FeOxDbBackend::builder().path(&db_path).build().unwrap();
        let result = backend.read(&key).await.unwrap();
        assert_eq!(result.unwrap().data().as_ref(), b"\"kept\"");
    }
}
