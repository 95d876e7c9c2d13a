use crate::format::FormatError;
use thiserror::Error;

/// General groups of errors raised while talking to a store.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal store failure: a full disk, a poisoned state, a failed task.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// The store could not be reached.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// The payload or key could not be encoded or decoded.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

impl BackendError {
    /// Wraps any error as an [`InternalError`](BackendError::InternalError).
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        BackendError::InternalError(Box::new(err))
    }
}
