//! Metadata repository error types.

use ceremony_core::KeyId;
use std::path::PathBuf;
use thiserror::Error;

/// Repository store and metadata parsing errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata not found: {0}")]
    NotFound(String),

    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("key id {key_id} does not match its key")]
    WrongKeyId { key_id: KeyId },

    #[error(transparent)]
    Core(#[from] ceremony_core::Error),
}

/// Result type for metadata operations.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
