use feoxdb::FeoxError;
use thiserror::Error;

/// Errors raised while opening a [`FeOxDbBackend`](crate::FeOxDbBackend).
#[derive(Debug, Error)]
pub enum FeOxDbError {
    /// The database refused to open.
    #[error("FeOxDB error: {0}")]
    FeOxDb(#[from] FeoxError),

    /// The storage directory could not be prepared.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
