//! Registry of verified ceremony keys.

use crate::chain::ChainVerifier;
use crate::error::{RegistryError, RegistryResult};
use crate::key::{VerifiedSigningKey, key_id_for, parse_public_key_pem};
use ceremony_core::{KeyId, SigningKeyArtifact};
use ceremony_storage::ArtifactSource;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{error, info};

/// Verified keys indexed by key id. Every entry passed chain verification.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: BTreeMap<KeyId, VerifiedSigningKey>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, rejecting a key id that is already present.
    pub fn insert(&mut self, key: VerifiedSigningKey) -> RegistryResult<KeyId> {
        match self.keys.entry(key.key_id.clone()) {
            Entry::Occupied(existing) => Err(RegistryError::DuplicateKeyId {
                key_id: key.key_id,
                serial_number: key.serial_number,
                existing: existing.get().serial_number,
            }),
            Entry::Vacant(slot) => {
                let id = slot.key().clone();
                slot.insert(key);
                Ok(id)
            }
        }
    }

    pub fn get(&self, key_id: &KeyId) -> Option<&VerifiedSigningKey> {
        self.keys.get(key_id)
    }

    pub fn contains(&self, key_id: &KeyId) -> bool {
        self.keys.contains_key(key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate keys in key id order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &VerifiedSigningKey)> {
        self.keys.iter()
    }
}

/// Builds a [`KeyRegistry`] from a key directory, failing closed.
///
/// The first incomplete artifact, chain failure, bad public key or duplicate
/// key id aborts the build and no registry is returned.
pub struct KeyRegistryBuilder<'a> {
    verifier: &'a dyn ChainVerifier,
}

impl<'a> KeyRegistryBuilder<'a> {
    pub fn new(verifier: &'a dyn ChainVerifier) -> Self {
        Self { verifier }
    }

    /// Verify every artifact of `source` and collect the keys.
    pub fn build(&self, source: &dyn ArtifactSource) -> RegistryResult<KeyRegistry> {
        let mut registry = KeyRegistry::new();

        for artifact in source.scan()? {
            let artifact = match artifact {
                Ok(artifact) => artifact,
                Err(err) => {
                    error!("error loading key directory: {err}");
                    return Err(err.into());
                }
            };

            let serial = artifact.serial_number;
            match self
                .verify_artifact(&artifact)
                .and_then(|key| registry.insert(key))
            {
                Ok(key_id) => {
                    info!(serial = %serial, key_id = %key_id.short(), "verified key {serial}");
                }
                Err(err) => {
                    error!(serial = %serial, "error verifying key {serial}: {err}");
                    return Err(err);
                }
            }
        }

        Ok(registry)
    }

    /// Check one artifact and derive its key id.
    pub fn verify_artifact(
        &self,
        artifact: &SigningKeyArtifact,
    ) -> RegistryResult<VerifiedSigningKey> {
        let serial_number = artifact.serial_number;

        let missing = artifact.missing_parts();
        if !missing.is_empty() {
            return Err(RegistryError::IncompleteKeyArtifact {
                serial_number,
                missing,
            });
        }

        self.verifier
            .verify_artifact(artifact)
            .map_err(|cause| RegistryError::ChainVerificationFailed {
                serial_number,
                cause,
            })?;

        let public_key = parse_public_key_pem(&artifact.public_key)
            .map_err(|reason| RegistryError::InvalidPublicKey {
                serial_number,
                reason,
            })?;
        let key_id = key_id_for(&public_key).map_err(|source| {
            RegistryError::IdentifierDerivation {
                serial_number,
                source,
            }
        })?;

        Ok(VerifiedSigningKey {
            serial_number,
            public_key,
            key_id,
        })
    }
}
