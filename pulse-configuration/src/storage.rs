use std::sync::Arc;

use pulse_backend::{Backend, CacheKeyFormat};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum KeySerialization {
    #[default]
    Plain,
    UrlEncoded,
}

impl KeySerialization {
    pub fn to_cache_key_format(self) -> CacheKeyFormat {
        match self {
            KeySerialization::Plain => CacheKeyFormat::Plain,
            KeySerialization::UrlEncoded => CacheKeyFormat::UrlEncoded,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Moka {
    pub max_entries: u64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub key_format: KeySerialization,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FeOxDb {
    /// File or directory. Without a path the store lives in memory.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub max_memory: Option<usize>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub key_format: KeySerialization,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Storage {
    Moka(Moka),
    FeOxDb(FeOxDb),
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Moka(Moka {
            max_entries: 1024,
            label: None,
            key_format: KeySerialization::Plain,
        })
    }
}

impl Storage {
    pub fn into_backend(self) -> Result<Arc<dyn Backend + Send + 'static>, ConfigError> {
        match self {
            Storage::Moka(config) => config.into_backend(),
            Storage::FeOxDb(config) => config.into_backend(),
        }
    }
}

impl Moka {
    #[cfg(feature = "moka")]
    pub fn into_backend(self) -> Result<Arc<dyn Backend + Send + 'static>, ConfigError> {
        use pulse_moka::MokaBackend;

        if self.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.max_entries",
                reason: "must be greater than zero".to_owned(),
            });
        }
        let mut builder = MokaBackend::builder()
            .max_entries(self.max_entries)
            .key_format(self.key_format.to_cache_key_format());
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        Ok(Arc::new(builder.build()))
    }

    #[cfg(not(feature = "moka"))]
    pub fn into_backend(self) -> Result<Arc<dyn Backend + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Moka".to_owned()))
    }
}

impl FeOxDb {
    #[cfg(feature = "feoxdb")]
    pub fn into_backend(self) -> Result<Arc<dyn Backend + Send + 'static>, ConfigError> {
        use pulse_feoxdb::FeOxDbBackend;

        let mut builder =
            FeOxDbBackend::builder().key_format(self.key_format.to_cache_key_format());
        if let Some(path) = self.path {
            builder = builder.path(path);
        }
        if let Some(bytes) = self.max_file_size {
            builder = builder.max_file_size(bytes);
        }
        if let Some(bytes) = self.max_memory {
            builder = builder.max_memory(bytes);
        }
        if let Some(label) = self.label {
            builder = builder.label(label);
        }

        let backend = builder
            .build()
            .map_err(|e| ConfigError::BackendNotAvailable(format!("FeOxDb: {e}")))?;
        Ok(Arc::new(backend))
    }

    #[cfg(not(feature = "feoxdb"))]
    pub fn into_backend(self) -> Result<Arc<dyn Backend + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("FeOxDb".to_owned()))
    }
}
