use ceremony_core::{KeyDescriptor, KeyId};
use ceremony_metadata::{SignatureEntry, SignedDocument};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;

/// A deterministic P-256 metadata signing key.
pub struct TestKey {
    signing_key: SigningKey,
    pub descriptor: KeyDescriptor,
    pub id: KeyId,
}

impl TestKey {
    pub fn new(seed: u8) -> Self {
        let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
        let point = signing_key.verifying_key().to_encoded_point(false);
        let descriptor = KeyDescriptor::ecdsa_p256(point.as_bytes());
        let id = descriptor.key_id().unwrap();
        Self {
            signing_key,
            descriptor,
            id,
        }
    }

    /// Hex DER signature over `message`.
    pub fn sign_hex(&self, message: &[u8]) -> String {
        let signature: Signature = self.signing_key.sign(message);
        hex::encode(signature.to_der().as_bytes())
    }
}

/// Unsigned root metadata declaring `keys` and `roles` in the given order.
pub fn root_document(keys: &[&TestKey], roles: &[(&str, &[&TestKey], u32)]) -> SignedDocument {
    let mut key_map = Map::new();
    for key in keys {
        key_map.insert(
            key.id.as_str().to_string(),
            serde_json::to_value(&key.descriptor).unwrap(),
        );
    }

    let mut role_map = Map::new();
    for (name, role_keys, threshold) in roles {
        let keyids: Vec<&str> = role_keys.iter().map(|k| k.id.as_str()).collect();
        role_map.insert(
            name.to_string(),
            json!({ "keyids": keyids, "threshold": threshold }),
        );
    }

    SignedDocument {
        signed: json!({
            "_type": "root",
            "version": 1,
            "expires": "2031-05-03T00:00:00Z",
            "consistent_snapshot": false,
            "keys": Value::Object(key_map),
            "roles": Value::Object(role_map),
        }),
        signatures: vec![],
    }
}

/// Unsigned metadata for a non-root role.
pub fn targets_document(kind: &str) -> SignedDocument {
    SignedDocument {
        signed: json!({
            "_type": kind,
            "version": 1,
            "expires": "2021-08-03T00:00:00Z",
            "targets": {},
        }),
        signatures: vec![],
    }
}

/// Append a signature from each of `keys`.
pub fn sign(document: &mut SignedDocument, keys: &[&TestKey]) {
    let message = document.canonical_signed().unwrap();
    for key in keys {
        document.signatures.push(SignatureEntry {
            keyid: key.id.clone(),
            sig: key.sign_hex(&message),
        });
    }
}

/// Write a document under `<base>/<dir>/<name>`.
pub fn write_document(base: &Path, dir: &str, name: &str, document: &SignedDocument) {
    let dir = base.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), serde_json::to_vec_pretty(document).unwrap()).unwrap();
}
