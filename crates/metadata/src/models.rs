//! Signed metadata document models.

use crate::error::{MetadataError, MetadataResult};
use ceremony_core::{KeyDescriptor, KeyId, RoleDescriptor, canonical_json};
use serde::de::{Deserializer, Error as _, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// File name of the root metadata document.
pub const ROOT_METADATA: &str = "root.json";

/// One signature over a document's `signed` content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub keyid: KeyId,
    /// Hex-encoded signature: DER for ECDSA, raw bytes for Ed25519. Empty while
    /// not yet collected.
    #[serde(default)]
    pub sig: String,
}

impl SignatureEntry {
    /// A placeholder for a signature that has not been collected yet.
    pub fn is_placeholder(&self) -> bool {
        self.sig.is_empty()
    }
}

/// A metadata document and the signatures collected for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedDocument {
    pub signed: Value,
    #[serde(default)]
    pub signatures: Vec<SignatureEntry>,
}

impl SignedDocument {
    /// Parse a document from JSON bytes.
    pub fn from_slice(name: &str, bytes: &[u8]) -> MetadataResult<Self> {
        serde_json::from_slice(bytes).map_err(|source| MetadataError::Parse {
            name: name.to_string(),
            source,
        })
    }

    /// Bytes covered by the signatures.
    pub fn canonical_signed(&self) -> ceremony_core::Result<Vec<u8>> {
        canonical_json(&self.signed)
    }
}

/// Keys and threshold of one role, as declared in root metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleKeys {
    pub keyids: Vec<KeyId>,
    pub threshold: u32,
}

/// The `signed` content of root metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct RootMetadata {
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub expires: String,
    pub keys: BTreeMap<KeyId, KeyDescriptor>,
    /// Roles in declaration order.
    #[serde(deserialize_with = "ordered_roles")]
    pub roles: Vec<(String, RoleKeys)>,
}

impl RootMetadata {
    /// Extract root metadata from its signed document.
    pub fn from_document(document: &SignedDocument) -> MetadataResult<Self> {
        let root: Self =
            serde_json::from_value(document.signed.clone()).map_err(|source| {
                MetadataError::Parse {
                    name: ROOT_METADATA.to_string(),
                    source,
                }
            })?;
        if !root.kind.is_empty() && root.kind != "root" {
            return Err(MetadataError::InvalidMetadata(format!(
                "expected root metadata, got type {:?}",
                root.kind
            )));
        }
        root.check_key_ids()?;
        Ok(root)
    }

    /// Every declared key id must be one of the ids derived from its key.
    fn check_key_ids(&self) -> MetadataResult<()> {
        for (key_id, key) in &self.keys {
            if !key.has_id(key_id)? {
                return Err(MetadataError::WrongKeyId {
                    key_id: key_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Role descriptors in declaration order.
    pub fn role_descriptors(&self) -> MetadataResult<Vec<RoleDescriptor>> {
        self.roles
            .iter()
            .map(|(name, keys)| {
                if keys.threshold == 0 {
                    return Err(MetadataError::InvalidMetadata(format!(
                        "role {name} has a threshold of 0"
                    )));
                }
                Ok(RoleDescriptor {
                    name: name.clone(),
                    threshold: keys.threshold,
                    authorized_key_ids: keys.keyids.iter().cloned().collect::<BTreeSet<_>>(),
                })
            })
            .collect()
    }
}

fn ordered_roles<'de, D>(deserializer: D) -> Result<Vec<(String, RoleKeys)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RolesVisitor;

    impl<'de> Visitor<'de> for RolesVisitor {
        type Value = Vec<(String, RoleKeys)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of role names to role keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut roles: Vec<(String, RoleKeys)> = Vec::new();
            while let Some((name, keys)) = map.next_entry::<String, RoleKeys>()? {
                if roles.iter().any(|(existing, _)| *existing == name) {
                    return Err(A::Error::custom(format!("duplicate role {name}")));
                }
                roles.push((name, keys));
            }
            Ok(roles)
        }
    }

    deserializer.deserialize_map(RolesVisitor)
}
