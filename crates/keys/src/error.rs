//! Key verification error types.

use ceremony_core::{ArtifactKind, KeyId, SerialNumber};
use ceremony_storage::StorageError;
use thiserror::Error;

fn format_missing(missing: &[ArtifactKind]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A certificate chain check that failed.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("failed to parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("{what} signature does not verify under {issuer}: {reason}")]
    BadSignature {
        what: &'static str,
        issuer: &'static str,
        reason: String,
    },

    #[error("{what} is outside its validity period ({not_before} to {not_after})")]
    OutsideValidity {
        what: &'static str,
        not_before: String,
        not_after: String,
    },

    #[error("{what} is not a certificate authority and cannot issue {issued}")]
    NotCa {
        what: &'static str,
        issued: &'static str,
    },

    #[error("invalid basic constraints on {what}: {reason}")]
    BasicConstraints { what: &'static str, reason: String },

    #[error("key certificate does not certify the device public key")]
    KeyMismatch,
}

/// Registry construction errors. Any of these aborts the whole build.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to load key products: {0}")]
    Source(#[from] StorageError),

    #[error("key {serial_number} is incomplete: missing {}", format_missing(.missing))]
    IncompleteKeyArtifact {
        serial_number: SerialNumber,
        missing: Vec<ArtifactKind>,
    },

    #[error("chain verification failed for key {serial_number}: {cause}")]
    ChainVerificationFailed {
        serial_number: SerialNumber,
        #[source]
        cause: ChainError,
    },

    #[error("invalid public key for key {serial_number}: {reason}")]
    InvalidPublicKey {
        serial_number: SerialNumber,
        reason: String,
    },

    #[error("failed to derive key id for key {serial_number}: {source}")]
    IdentifierDerivation {
        serial_number: SerialNumber,
        #[source]
        source: ceremony_core::Error,
    },

    #[error("duplicate key id {key_id}: key {serial_number} has the same public key as key {existing}")]
    DuplicateKeyId {
        key_id: KeyId,
        serial_number: SerialNumber,
        existing: SerialNumber,
    },
}

impl RegistryError {
    /// Serial number of the key that caused the failure, if known.
    pub fn serial_number(&self) -> Option<SerialNumber> {
        match self {
            Self::Source(_) => None,
            Self::IncompleteKeyArtifact { serial_number, .. }
            | Self::ChainVerificationFailed { serial_number, .. }
            | Self::InvalidPublicKey { serial_number, .. }
            | Self::IdentifierDerivation { serial_number, .. }
            | Self::DuplicateKeyId { serial_number, .. } => Some(*serial_number),
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
