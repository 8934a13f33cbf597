//! Signed metadata repository audit for key ceremonies.
//!
//! This crate reads a TUF-style metadata repository and checks, role by role,
//! whether each document carries enough valid signatures:
//! - Repository stores (staged and published documents)
//! - Root metadata, roles and keys
//! - Threshold signature verification
//! - The concurrent per-role auditor

pub mod audit;
pub mod error;
pub mod models;
pub mod store;
pub mod verify;

pub use audit::MetadataAuditor;
pub use error::{MetadataError, MetadataResult};
pub use models::{ROOT_METADATA, RoleKeys, RootMetadata, SignatureEntry, SignedDocument};
pub use store::{FileSystemStore, MemoryStore, RepositoryStore};
pub use verify::{KeyDb, ThresholdError, ThresholdSignatureVerifier};
