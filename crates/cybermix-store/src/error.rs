//! Settings store error types.

use cybermix_core::PersistenceError;
use thiserror::Error;

/// Settings store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine data directory")]
    NoDataDir,
}

impl From<StoreError> for PersistenceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => Self::Io(e),
            StoreError::Json(e) => Self::Serialize(e),
            StoreError::NoDataDir => Self::NoConfigDir,
        }
    }
}

/// Result type for settings store operations.
pub type StoreResult<T> = Result<T, StoreError>;
