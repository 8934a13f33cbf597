//! In-memory artifact source.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ArtifactIter, ArtifactSource};
use ceremony_core::SigningKeyArtifact;
use std::path::PathBuf;

/// One entry of an in-memory key directory.
#[derive(Clone, Debug)]
pub enum MemoryEntry {
    /// A successfully loaded device directory.
    Artifact(SigningKeyArtifact),
    /// A device directory whose name is not a serial number.
    InvalidDirectory(String),
}

/// Serves a fixed list of key products, for tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryArtifactSource {
    entries: Vec<MemoryEntry>,
}

impl MemoryArtifactSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device's key products.
    pub fn with_artifact(mut self, artifact: SigningKeyArtifact) -> Self {
        self.entries.push(MemoryEntry::Artifact(artifact));
        self
    }

    /// Add a directory whose name fails serial number parsing.
    pub fn with_invalid_directory(mut self, name: impl Into<String>) -> Self {
        self.entries.push(MemoryEntry::InvalidDirectory(name.into()));
        self
    }

    /// Number of entries served per scan.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<SigningKeyArtifact> for MemoryArtifactSource {
    fn from_iter<I: IntoIterator<Item = SigningKeyArtifact>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(MemoryEntry::Artifact).collect(),
        }
    }
}

impl ArtifactSource for MemoryArtifactSource {
    fn scan(&self) -> StorageResult<ArtifactIter<'_>> {
        Ok(Box::new(self.entries.iter().map(|entry| match entry {
            MemoryEntry::Artifact(artifact) => Ok(artifact.clone()),
            MemoryEntry::InvalidDirectory(name) => {
                let source = name
                    .parse::<ceremony_core::SerialNumber>()
                    .err()
                    .unwrap_or_else(|| ceremony_core::Error::InvalidSerialFormat {
                        value: name.clone(),
                        reason: "rejected by fixture".to_string(),
                    });
                Err(StorageError::InvalidSerialFormat {
                    directory: PathBuf::from(name),
                    source,
                })
            }
        })))
    }

    fn describe(&self) -> String {
        format!("memory ({} entries)", self.entries.len())
    }
}
