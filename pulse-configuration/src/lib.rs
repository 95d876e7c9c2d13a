//! # pulse-configuration
//!
//! Builds a ready [`ContentService`] from YAML.
//!
//! ```yaml
//! provider:
//!   model: gemini-3-flash-preview
//!   timeout: 60s
//!   api_key_env: GEMINI_API_KEY
//! storage:
//!   type: FeOxDb
//!   path: /var/cache/pulse
//!   max_file_size: 10485760
//! policies:
//!   feed:
//!     ttl: 15m
//!     throttle: 30s
//!   memes:
//!     max_retries: 3
//! ```
//!
//! Every section is optional. Storage defaults to an in-memory Moka store.

use std::path::Path;
use std::sync::Arc;

use pulse::RequestOrchestrator;
use pulse_backend::Backend;
use pulse_gemini::{ContentService, GeminiClient};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod policy;
pub mod provider;
pub mod storage;

pub use error::ConfigError;
pub use policy::{PolicyConfig, Policies};
pub use provider::ProviderConfig;
pub use storage::{FeOxDb, KeySerialization, Moka, Storage};

/// Store type produced by [`Storage::into_backend`].
pub type DynBackend = Arc<dyn Backend + Send + 'static>;

/// Service type produced by [`Settings::into_service`].
pub type ConfiguredService = ContentService<GeminiClient, DynBackend>;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderConfig,
    pub storage: Storage,
    pub policies: Policies,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Builds the store, the provider client and the service. Reads the API
    /// key from the process environment.
    pub fn into_service(self) -> Result<ConfiguredService, ConfigError> {
        self.into_service_with(|name| std::env::var(name).ok())
    }

    pub fn into_service_with(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ConfiguredService, ConfigError> {
        let policies = self.policies.to_service_policies();
        let backend = self.storage.into_backend()?;
        let client = self.provider.into_client_with(lookup)?;
        let orchestrator = RequestOrchestrator::new(backend);
        Ok(ContentService::new(client, orchestrator).with_policies(policies))
    }
}
