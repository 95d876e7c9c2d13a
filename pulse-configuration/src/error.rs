use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML configuration: {0}")]
    Yaml(String),

    #[error("could not read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("provider client could not be built: {0}")]
    Provider(#[from] pulse_core::ProviderError),
}
