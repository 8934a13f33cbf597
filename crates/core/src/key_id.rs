//! Key descriptors and canonical key identifiers.

use crate::canonical::to_canonical_vec;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

/// Key type for ECDSA over NIST P-256 with SHA-256.
pub const KEY_TYPE_ECDSA_SHA2_P256: &str = "ecdsa-sha2-nistp256";

/// Signature scheme for ECDSA over NIST P-256 with SHA-256.
pub const KEY_SCHEME_ECDSA_SHA2_P256: &str = "ecdsa-sha2-nistp256";

/// Key type and signature scheme for Ed25519.
pub const KEY_TYPE_ED25519: &str = "ed25519";

/// Hash algorithms used to derive key identifiers, in canonical order.
pub const KEY_ID_HASH_ALGORITHMS: [&str; 2] = ["sha256", "sha512"];

/// Canonical identifier of a public key (lowercase hex digest).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Parse a key id from its hex form.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidKeyId("empty key id".to_string()));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(Error::InvalidKeyId(format!(
                "expected lowercase hex, got {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl TryFrom<String> for KeyId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.short())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public value of a key as carried in metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Hex-encoded public key material.
    pub public: String,
}

/// A public key in the metadata key format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    pub keytype: String,
    pub scheme: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyid_hash_algorithms: Vec<String>,
    pub keyval: KeyValue,
}

impl KeyDescriptor {
    /// Describe an ECDSA P-256 key from its uncompressed SEC1 point encoding.
    pub fn ecdsa_p256(uncompressed_point: &[u8]) -> Self {
        Self {
            keytype: KEY_TYPE_ECDSA_SHA2_P256.to_string(),
            scheme: KEY_SCHEME_ECDSA_SHA2_P256.to_string(),
            keyid_hash_algorithms: KEY_ID_HASH_ALGORITHMS
                .iter()
                .map(|alg| alg.to_string())
                .collect(),
            keyval: KeyValue {
                public: hex::encode(uncompressed_point),
            },
        }
    }

    /// Describe an Ed25519 key from its 32 public key bytes.
    pub fn ed25519(public_key: &[u8]) -> Self {
        Self {
            keytype: KEY_TYPE_ED25519.to_string(),
            scheme: KEY_TYPE_ED25519.to_string(),
            keyid_hash_algorithms: KEY_ID_HASH_ALGORITHMS
                .iter()
                .map(|alg| alg.to_string())
                .collect(),
            keyval: KeyValue {
                public: hex::encode(public_key),
            },
        }
    }

    /// Decode the hex public value.
    pub fn public_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.keyval.public)
            .map_err(|e| Error::IdentifierDerivation(format!("invalid public key hex: {e}")))
    }

    /// All identifiers of this key, one per supported hash algorithm, in listed order.
    ///
    /// Unsupported algorithms are skipped. A key listing no algorithms is
    /// identified by SHA-256 alone.
    pub fn ids(&self) -> Result<Vec<KeyId>> {
        let canonical = to_canonical_vec(self)?;
        let algorithms: Vec<&str> = if self.keyid_hash_algorithms.is_empty() {
            vec!["sha256"]
        } else {
            self.keyid_hash_algorithms.iter().map(String::as_str).collect()
        };

        let ids = algorithms
            .into_iter()
            .filter_map(|alg| match alg {
                "sha256" => Some(hex::encode(Sha256::digest(&canonical))),
                "sha512" => Some(hex::encode(Sha512::digest(&canonical))),
                _ => None,
            })
            .map(KeyId)
            .collect();
        Ok(ids)
    }

    /// The canonical identifier: the first derived id.
    pub fn key_id(&self) -> Result<KeyId> {
        self.ids()?.into_iter().next().ok_or_else(|| {
            Error::IdentifierDerivation(format!(
                "no supported hash algorithm in {:?}",
                self.keyid_hash_algorithms
            ))
        })
    }

    /// True if `id` is one of this key's identifiers.
    pub fn has_id(&self, id: &KeyId) -> Result<bool> {
        Ok(self.ids()?.iter().any(|candidate| candidate == id))
    }
}
