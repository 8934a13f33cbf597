//! Core domain types shared by the ceremony audit crates.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Device serial numbers and on-disk key products
//! - Canonical JSON and key identifiers
//! - Metadata role descriptors
//! - Per-role audit results
//! - Run configuration

pub mod artifact;
pub mod audit;
pub mod canonical;
pub mod config;
pub mod error;
pub mod key_id;
pub mod role;

pub use artifact::{ArtifactKind, SerialNumber, SigningKeyArtifact};
pub use audit::{AuditOutcome, AuditSummary, SignatureAuditResult};
pub use canonical::{canonical_json, to_canonical_vec};
pub use config::AuditConfig;
pub use error::{Error, Result};
pub use key_id::{
    KEY_ID_HASH_ALGORITHMS, KEY_SCHEME_ECDSA_SHA2_P256, KEY_TYPE_ECDSA_SHA2_P256,
    KEY_TYPE_ED25519, KeyDescriptor, KeyId, KeyValue,
};
pub use role::RoleDescriptor;
