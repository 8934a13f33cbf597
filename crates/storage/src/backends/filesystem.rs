//! Key product discovery on the local filesystem.
//!
//! Layout: one subdirectory per device, named by its serial number, holding
//! `*_pubkey.pem`, `*_device_cert.pem` and `*_key_cert.pem` anywhere below it.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ArtifactIter, ArtifactSource};
use bytes::Bytes;
use ceremony_core::{ArtifactKind, SerialNumber, SigningKeyArtifact};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads key products from a ceremony key directory.
pub struct FilesystemArtifactSource {
    root: PathBuf,
}

impl FilesystemArtifactSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The key directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Immediate subdirectories of the root, sorted by name.
    fn device_directories(&self) -> StorageResult<Vec<PathBuf>> {
        let metadata = fs::metadata(&self.root).map_err(|e| StorageError::io(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(StorageError::NotADirectory(self.root.clone()));
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| StorageError::io(&self.root, e))? {
            let entry = entry.map_err(|e| StorageError::io(&self.root, e))?;
            // file_type() does not follow symlinks
            let file_type = entry
                .file_type()
                .map_err(|e| StorageError::io(entry.path(), e))?;
            if file_type.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

impl ArtifactSource for FilesystemArtifactSource {
    fn scan(&self) -> StorageResult<ArtifactIter<'_>> {
        let dirs = self.device_directories()?;
        debug!(root = %self.root.display(), devices = dirs.len(), "scanning key directory");
        Ok(Box::new(dirs.into_iter().map(|dir| load_device_directory(&dir))))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Load the key products of one device directory.
pub fn load_device_directory(dir: &Path) -> StorageResult<SigningKeyArtifact> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let serial_number = name
        .parse::<SerialNumber>()
        .map_err(|source| StorageError::InvalidSerialFormat {
            directory: dir.to_path_buf(),
            source,
        })?;

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;

    let mut artifact = SigningKeyArtifact::empty(serial_number);
    for path in files {
        let Some(kind) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(ArtifactKind::from_file_name)
        else {
            continue;
        };
        let data = fs::read(&path).map_err(|e| StorageError::io(&path, e))?;
        if !artifact.part(kind).is_empty() {
            warn!(
                serial = %serial_number,
                path = %path.display(),
                "multiple {kind} files found, using the last one"
            );
        }
        artifact.set_part(kind, Bytes::from(data));
    }

    debug!(
        serial = %serial_number,
        missing = artifact.missing_parts().len(),
        "loaded key directory"
    );
    Ok(artifact)
}

/// Recursively collect files below `dir` in lexical order.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> StorageResult<()> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))? {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| StorageError::io(entry.path(), e))?;
        entries.push((entry.path(), file_type));
    }
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (path, file_type) in entries {
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        } else if file_type.is_symlink() && !fs::metadata(&path).is_ok_and(|m| m.is_dir()) {
            // File symlinks are read through; directory symlinks are not walked
            out.push(path);
        }
    }
    Ok(())
}
