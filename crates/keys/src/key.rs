//! Verified ceremony signing keys and their identifiers.

use ceremony_core::{KeyDescriptor, KeyId, SerialNumber};
use p256::PublicKey;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePublicKey;
use std::fmt;

/// A ceremony key whose certificate chain has been verified.
#[derive(Clone)]
pub struct VerifiedSigningKey {
    pub serial_number: SerialNumber,
    pub public_key: PublicKey,
    pub key_id: KeyId,
}

impl VerifiedSigningKey {
    /// Metadata key form of this key.
    pub fn descriptor(&self) -> KeyDescriptor {
        descriptor_for(&self.public_key)
    }
}

impl fmt::Debug for VerifiedSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedSigningKey")
            .field("serial_number", &self.serial_number)
            .field("key_id", &self.key_id)
            .finish()
    }
}

/// Parse a PEM SubjectPublicKeyInfo holding a P-256 key.
pub fn parse_public_key_pem(pem: &[u8]) -> Result<PublicKey, String> {
    let pem = std::str::from_utf8(pem).map_err(|e| format!("public key is not UTF-8: {e}"))?;
    PublicKey::from_public_key_pem(pem).map_err(|e| format!("not a P-256 public key: {e}"))
}

/// Metadata key form of a P-256 public key (uncompressed point).
pub fn descriptor_for(public_key: &PublicKey) -> KeyDescriptor {
    let point = public_key.to_encoded_point(false);
    KeyDescriptor::ecdsa_p256(point.as_bytes())
}

/// Canonical key id of a P-256 public key.
pub fn key_id_for(public_key: &PublicKey) -> ceremony_core::Result<KeyId> {
    descriptor_for(public_key).key_id()
}
