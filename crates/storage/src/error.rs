//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Key product discovery errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key directory name {}: {source}", .directory.display())]
    InvalidSerialFormat {
        directory: PathBuf,
        #[source]
        source: ceremony_core::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
