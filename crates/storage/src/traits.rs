//! Artifact source trait definitions.

use crate::error::StorageResult;
use ceremony_core::SigningKeyArtifact;

/// A lazy, finite sequence of key product sets.
pub type ArtifactIter<'a> = Box<dyn Iterator<Item = StorageResult<SigningKeyArtifact>> + 'a>;

/// Something that can enumerate the key products of a ceremony.
///
/// Each call to [`ArtifactSource::scan`] starts a fresh pass, so a source can be
/// scanned more than once. Consumers stop at the first `Err` item.
pub trait ArtifactSource: Send + Sync {
    /// Start enumerating artifacts, one per device.
    fn scan(&self) -> StorageResult<ArtifactIter<'_>>;

    /// Human-readable location of the source, for log lines.
    fn describe(&self) -> String;
}
