use std::path::PathBuf;

use thiserror::Error;

/// Failures of the file-backed persistence layer shared by both stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the new document failed. `restored` reports whether the previous
    /// contents were put back from the backup taken before the write.
    #[error("failed to write {path}: {source} (previous version restored: {restored})")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        restored: bool,
    },

    #[error("{0}")]
    Other(String),
}

/// Result alias for persistence operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
