//! Certificate chain verification and key registry for ceremony audits.
//!
//! This crate provides:
//! - X.509 chain and key binding verification against a root CA
//! - P-256 public key parsing and canonical key ids
//! - A fail-closed registry of verified ceremony keys

pub mod chain;
pub mod error;
pub mod key;
pub mod registry;

pub use chain::{ChainVerifier, X509ChainVerifier};
pub use error::{ChainError, RegistryError, RegistryResult};
pub use key::{VerifiedSigningKey, descriptor_for, key_id_for, parse_public_key_pem};
pub use registry::{KeyRegistry, KeyRegistryBuilder};
