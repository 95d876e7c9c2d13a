use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{BackendLabel, CacheEntry, CacheKey, Raw};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    BackendError, CacheKeyFormat, DeleteStatus,
    format::{Format, FormatError, JsonFormat},
};

pub type BackendResult<T> = Result<T, BackendError>;

/// Raw key/value store for timestamped payloads.
///
/// `read` returns an entry of any age. Stores must not drop entries because
/// they are old; eviction under capacity pressure is allowed.
#[async_trait]
pub trait Backend: Sync + Send {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>>;

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()>;

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// Name reported in [`ResponseSource::Backend`](pulse_core::ResponseSource::Backend).
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }

    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }

    fn key_format(&self) -> &CacheKeyFormat {
        &CacheKeyFormat::Plain
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()> {
        (*self).write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    fn label(&self) -> BackendLabel {
        (*self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }

    fn key_format(&self) -> &CacheKeyFormat {
        (*self).key_format()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }

    fn key_format(&self) -> &CacheKeyFormat {
        (**self).key_format()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + 'static> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }

    fn key_format(&self) -> &CacheKeyFormat {
        (**self).key_format()
    }
}

fn decode<T: DeserializeOwned>(format: &dyn Format, raw: &[u8]) -> BackendResult<T> {
    let value = format.decode(raw)?;
    serde_json::from_value(value)
        .map_err(|err| BackendError::FormatError(FormatError::Deserialize(Box::new(err))))
}

/// Typed operations over a [`Backend`].
///
/// One store abstraction serves both lookups the orchestrator needs: a
/// TTL-aware read for the cache check and an any-age read for the stale
/// fallback.
pub trait CacheBackend: Backend {
    /// Reads and decodes the entry under `key` regardless of its age.
    fn get_any<T>(
        &self,
        key: &CacheKey,
    ) -> impl Future<Output = BackendResult<Option<CacheEntry<T>>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.read(key).await? {
                Some(entry) => {
                    let (stored_at, raw) = entry.into_parts();
                    let data = decode::<T>(self.value_format(), &raw)?;
                    Ok(Some(CacheEntry::new(data, stored_at)))
                }
                None => Ok(None),
            }
        }
    }

    /// Reads the entry under `key` only if it is younger than `ttl` at `now`.
    fn get_fresh<T>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> impl Future<Output = BackendResult<Option<CacheEntry<T>>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.read(key).await? {
                Some(entry) if entry.is_fresh(ttl, now) => {
                    let (stored_at, raw) = entry.into_parts();
                    let data = decode::<T>(self.value_format(), &raw)?;
                    Ok(Some(CacheEntry::new(data, stored_at)))
                }
                Some(_) => {
                    tracing::trace!(cache_key = %key, "entry expired");
                    Ok(None)
                }
                None => Ok(None),
            }
        }
    }

    /// Encodes and stores `value` under `key`.
    ///
    /// The stored timestamp never moves backwards: if the previous entry is
    /// newer than `stored_at`, the previous timestamp is kept. Returns the
    /// timestamp actually written.
    fn set<T>(
        &self,
        key: &CacheKey,
        value: &T,
        stored_at: DateTime<Utc>,
    ) -> impl Future<Output = BackendResult<DateTime<Utc>>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let json = serde_json::to_value(value)
                .map_err(|err| BackendError::FormatError(FormatError::Serialize(Box::new(err))))?;
            let raw = self.value_format().encode(&json)?;

            let stored_at = match self.read(key).await {
                Ok(Some(previous)) => stored_at.max(previous.stored_at()),
                Ok(None) => stored_at,
                Err(error) => {
                    tracing::debug!(cache_key = %key, %error, "previous entry unreadable");
                    stored_at
                }
            };

            self.write(key, CacheEntry::new(raw, stored_at)).await?;
            Ok(stored_at)
        }
    }

    /// Removes the entry under `key`.
    fn delete(&self, key: &CacheKey) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move { self.remove(key).await }
    }
}

impl CacheBackend for &dyn Backend {}

impl CacheBackend for Box<dyn Backend> {}

impl CacheBackend for Arc<dyn Backend + Send + 'static> {}
