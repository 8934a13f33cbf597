//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid serial number {value:?}: {reason}")]
    InvalidSerialFormat { value: String, reason: String },

    #[error("invalid key id: {0}")]
    InvalidKeyId(String),

    #[error("key id derivation error: {0}")]
    IdentifierDerivation(String),

    #[error("canonical json error: {0}")]
    Canonicalization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
