//! Threshold signature verification.

use crate::models::{RootMetadata, SignedDocument};
use ceremony_core::{KEY_TYPE_ECDSA_SHA2_P256, KEY_TYPE_ED25519, KeyId, RoleDescriptor};
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Why a role document does not meet its signing requirements.
#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("signature threshold not met: {actual}/{required} valid signatures")]
    RoleThreshold { actual: u32, required: u32 },

    #[error("document has no signatures")]
    NoSignatures,

    #[error("signature from key {0} not authorized for this role")]
    UnauthorizedKey(KeyId),

    #[error("signature from unknown key {0}")]
    UnknownKey(KeyId),

    #[error("invalid signature from key {key_id}: {reason}")]
    InvalidSignature { key_id: KeyId, reason: String },

    #[error("key {key_id} has unsupported type {keytype}")]
    UnsupportedKey { key_id: KeyId, keytype: String },

    #[error("failed to canonicalize signed content: {0}")]
    Canonicalization(#[from] ceremony_core::Error),
}

/// Checks a role's document against its keys and threshold.
pub trait ThresholdSignatureVerifier: Send + Sync {
    fn verify_role(
        &self,
        role: &RoleDescriptor,
        document: &SignedDocument,
    ) -> Result<(), ThresholdError>;
}

/// Public key able to check one signature scheme.
enum SignatureKey {
    EcdsaP256(VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl SignatureKey {
    /// None if the key type is unsupported or the key material is malformed.
    fn from_descriptor(keytype: &str, public: &[u8]) -> Option<Self> {
        match keytype {
            KEY_TYPE_ECDSA_SHA2_P256 => VerifyingKey::from_sec1_bytes(public)
                .ok()
                .map(Self::EcdsaP256),
            KEY_TYPE_ED25519 => {
                let bytes: [u8; 32] = public.try_into().ok()?;
                ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                    .ok()
                    .map(Self::Ed25519)
            }
            _ => None,
        }
    }

    /// ECDSA signatures are DER encoded; Ed25519 signatures are 64 raw bytes.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), String> {
        match self {
            Self::EcdsaP256(key) => {
                let signature =
                    Signature::from_der(signature).map_err(|e| format!("not DER: {e}"))?;
                key.verify(message, &signature)
                    .map_err(|_| "verification failed".to_string())
            }
            Self::Ed25519(key) => {
                let bytes: [u8; 64] = signature.try_into().map_err(|_| {
                    format!("expected 64 signature bytes, got {}", signature.len())
                })?;
                let signature = ed25519_dalek::Signature::from_bytes(&bytes);
                ed25519_dalek::Verifier::verify(key, message, &signature)
                    .map_err(|_| "verification failed".to_string())
            }
        }
    }
}

struct TrustedKey {
    /// Primary id, so a key listed under several ids counts once.
    primary: KeyId,
    key: SignatureKey,
}

/// Keys declared by root metadata, indexed by every id they are listed under.
pub struct KeyDb {
    keys: HashMap<KeyId, TrustedKey>,
    unsupported: HashMap<KeyId, String>,
}

impl KeyDb {
    /// Build the key database from root metadata.
    ///
    /// Keys of unsupported types are remembered so signatures made with them
    /// can be reported precisely.
    pub fn from_root(root: &RootMetadata) -> ceremony_core::Result<Self> {
        let mut keys = HashMap::new();
        let mut unsupported = HashMap::new();

        for (key_id, descriptor) in &root.keys {
            let public = descriptor.public_bytes()?;
            let Some(key) = SignatureKey::from_descriptor(&descriptor.keytype, &public) else {
                unsupported.insert(key_id.clone(), descriptor.keytype.clone());
                continue;
            };
            keys.insert(
                key_id.clone(),
                TrustedKey {
                    primary: descriptor.key_id()?,
                    key,
                },
            );
        }

        Ok(Self { keys, unsupported })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn check_signature(
        &self,
        key_id: &KeyId,
        message: &[u8],
        sig_hex: &str,
    ) -> Result<KeyId, ThresholdError> {
        let Some(trusted) = self.keys.get(key_id) else {
            if let Some(keytype) = self.unsupported.get(key_id) {
                return Err(ThresholdError::UnsupportedKey {
                    key_id: key_id.clone(),
                    keytype: keytype.clone(),
                });
            }
            return Err(ThresholdError::UnknownKey(key_id.clone()));
        };

        let invalid = |reason: String| ThresholdError::InvalidSignature {
            key_id: key_id.clone(),
            reason,
        };
        let signature = hex::decode(sig_hex).map_err(|e| invalid(format!("not hex: {e}")))?;
        trusted.key.verify(message, &signature).map_err(invalid)?;

        Ok(trusted.primary.clone())
    }
}

impl ThresholdSignatureVerifier for KeyDb {
    fn verify_role(
        &self,
        role: &RoleDescriptor,
        document: &SignedDocument,
    ) -> Result<(), ThresholdError> {
        if document.signatures.is_empty() {
            return Err(ThresholdError::NoSignatures);
        }

        let message = document.canonical_signed()?;
        let mut valid = BTreeSet::new();

        for entry in &document.signatures {
            if entry.is_placeholder() {
                continue;
            }
            if !role.is_authorized(&entry.keyid) {
                return Err(ThresholdError::UnauthorizedKey(entry.keyid.clone()));
            }
            let primary = self.check_signature(&entry.keyid, &message, &entry.sig)?;
            valid.insert(primary);
        }

        let actual = u32::try_from(valid.len()).unwrap_or(u32::MAX);
        if actual < role.threshold {
            return Err(ThresholdError::RoleThreshold {
                actual,
                required: role.threshold,
            });
        }
        Ok(())
    }
}
