//! Repository store trait and implementations.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{ROOT_METADATA, RootMetadata, SignedDocument};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Read access to a metadata repository.
pub trait RepositoryStore: Send + Sync {
    /// Raw bytes of a metadata document, e.g. `targets.json`.
    fn get_meta(&self, name: &str) -> MetadataResult<Vec<u8>>;

    /// Human-readable location, for log lines.
    fn describe(&self) -> String;

    /// Parse a metadata document.
    fn signed_meta(&self, name: &str) -> MetadataResult<SignedDocument> {
        let bytes = self.get_meta(name)?;
        SignedDocument::from_slice(name, &bytes)
    }

    /// Root metadata along with its signed document.
    fn root(&self) -> MetadataResult<(SignedDocument, RootMetadata)> {
        let document = self.signed_meta(ROOT_METADATA)?;
        let root = RootMetadata::from_document(&document)?;
        Ok((document, root))
    }
}

/// Repository on local disk.
///
/// Documents under `staged/` shadow the published ones under `repository/`.
pub struct FileSystemStore {
    base: PathBuf,
}

impl FileSystemStore {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn read_candidate(&self, path: &Path) -> MetadataResult<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => {
                debug!(path = %path.display(), "read metadata");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(MetadataError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl RepositoryStore for FileSystemStore {
    fn get_meta(&self, name: &str) -> MetadataResult<Vec<u8>> {
        validate_name(name)?;
        for dir in ["staged", "repository"] {
            if let Some(bytes) = self.read_candidate(&self.base.join(dir).join(name))? {
                return Ok(bytes);
            }
        }
        Err(MetadataError::NotFound(name.to_string()))
    }

    fn describe(&self) -> String {
        self.base.display().to_string()
    }
}

/// In-memory repository for tests.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace a document.
    pub fn put(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        documents.insert(name.into(), bytes.into());
    }

    /// Serialize and store a signed document.
    pub fn put_document(&self, name: impl Into<String>, document: &SignedDocument) {
        // Value-backed documents always serialize
        if let Ok(bytes) = serde_json::to_vec(document) {
            self.put(name, bytes);
        }
    }
}

impl RepositoryStore for MemoryStore {
    fn get_meta(&self, name: &str) -> MetadataResult<Vec<u8>> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        documents
            .get(name)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(name.to_string()))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Metadata names are plain file names.
fn validate_name(name: &str) -> MetadataResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(MetadataError::InvalidMetadata(format!(
            "invalid metadata name {name:?}"
        )));
    }
    Ok(())
}
