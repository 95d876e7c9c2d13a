use std::time::Duration;

use pulse_gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, GeminiClient};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Variables consulted for the API key when none is named explicitly.
pub const DEFAULT_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    pub model: String,
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Environment variable holding the API key. Falls back to
    /// `GEMINI_API_KEY`, then `API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            api_key_env: None,
        }
    }
}

impl ProviderConfig {
    /// Looks the key up with `lookup` instead of the process environment.
    pub fn resolve_api_key(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let found = match &self.api_key_env {
            Some(name) => lookup(name),
            None => DEFAULT_KEY_VARS.iter().find_map(|name| lookup(name)),
        };
        found.filter(|key| !key.trim().is_empty())
    }

    pub fn into_client(self) -> Result<GeminiClient, ConfigError> {
        self.into_client_with(|name| std::env::var(name).ok())
    }

    /// A missing key is not an error: the client is built without one and
    /// every operation degrades to its fallback.
    pub fn into_client_with(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<GeminiClient, ConfigError> {
        let mut builder = GeminiClient::builder()
            .model(self.model.clone())
            .base_url(self.base_url.clone())
            .timeout(self.timeout);
        match self.resolve_api_key(lookup) {
            Some(key) => builder = builder.api_key(key),
            None => warn!(
                env = self.api_key_env.as_deref().unwrap_or("GEMINI_API_KEY"),
                "no API key found, provider calls are disabled"
            ),
        }
        Ok(builder.build()?)
    }
}
