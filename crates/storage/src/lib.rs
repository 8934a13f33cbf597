//! Key product discovery for ceremony audits.
//!
//! This crate provides:
//! - The [`ArtifactSource`] abstraction over a ceremony key directory
//! - A filesystem loader grouping key products by device serial number
//! - An in-memory source for tests

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::filesystem::{FilesystemArtifactSource, load_device_directory};
pub use backends::memory::{MemoryArtifactSource, MemoryEntry};
pub use error::{StorageError, StorageResult};
pub use traits::{ArtifactIter, ArtifactSource};

use ceremony_core::SigningKeyArtifact;

/// Load every artifact from a source, stopping at the first error.
pub fn load_all(source: &dyn ArtifactSource) -> StorageResult<Vec<SigningKeyArtifact>> {
    source.scan()?.collect()
}
