use ceremony_core::KeyDescriptor;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::{EncodePrivateKey, LineEnding};
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A ceremony on disk: root CA, key directory and metadata repository.
pub struct Ceremony {
    pub dir: TempDir,
    pub signing_keys: Vec<SigningKey>,
}

impl Ceremony {
    /// Generate a root CA and `devices` certified signing keys.
    pub fn new(devices: u8) -> Self {
        let dir = TempDir::new().unwrap();

        let root_key = KeyPair::generate().unwrap();
        let mut root_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        root_params
            .distinguished_name
            .push(DnType::CommonName, "Ceremony Root CA");
        root_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let root_cert = root_params.self_signed(&root_key).unwrap();
        fs::write(dir.path().join("root.pem"), root_cert.pem()).unwrap();

        let mut signing_keys = Vec::new();
        for serial in 1..=devices {
            let signing_key = SigningKey::from_slice(&[serial; 32]).unwrap();
            let pkcs8 = signing_key.to_pkcs8_pem(LineEnding::LF).unwrap();
            let key_pair = KeyPair::from_pem(&pkcs8).unwrap();

            let device_key = KeyPair::generate().unwrap();
            let mut device_params = CertificateParams::new(Vec::<String>::new()).unwrap();
            device_params
                .distinguished_name
                .push(DnType::CommonName, format!("Device {serial}"));
            let device_cert = device_params
                .signed_by(&device_key, &root_cert, &root_key)
                .unwrap();

            let mut key_params = CertificateParams::new(Vec::<String>::new()).unwrap();
            key_params
                .distinguished_name
                .push(DnType::CommonName, format!("Key {serial}"));
            let key_cert = key_params
                .signed_by(&key_pair, &device_cert, &device_key)
                .unwrap();

            let device_dir = dir.path().join("keys").join(serial.to_string());
            fs::create_dir_all(&device_dir).unwrap();
            fs::write(
                device_dir.join(format!("{serial}_pubkey.pem")),
                key_pair.public_key_pem(),
            )
            .unwrap();
            fs::write(
                device_dir.join(format!("{serial}_device_cert.pem")),
                device_cert.pem(),
            )
            .unwrap();
            fs::write(
                device_dir.join(format!("{serial}_key_cert.pem")),
                key_cert.pem(),
            )
            .unwrap();

            signing_keys.push(signing_key);
        }

        Self { dir, signing_keys }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("root.pem")
    }

    pub fn keys(&self) -> PathBuf {
        self.dir.path().join("keys")
    }

    pub fn repository(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    fn descriptor(&self, index: usize) -> KeyDescriptor {
        let point = self.signing_keys[index]
            .verifying_key()
            .to_encoded_point(false);
        KeyDescriptor::ecdsa_p256(point.as_bytes())
    }

    /// Write `root.json` declaring every ceremony key and the given roles
    /// (name, key indexes, threshold), signed by `signers`.
    pub fn write_root(&self, roles: &[(&str, &[usize], u32)], signers: &[usize]) {
        let mut keys = Map::new();
        for index in 0..self.signing_keys.len() {
            let descriptor = self.descriptor(index);
            keys.insert(
                descriptor.key_id().unwrap().as_str().to_string(),
                serde_json::to_value(&descriptor).unwrap(),
            );
        }

        let mut role_map = Map::new();
        for (name, indexes, threshold) in roles {
            let keyids: Vec<String> = indexes
                .iter()
                .map(|i| self.descriptor(*i).key_id().unwrap().as_str().to_string())
                .collect();
            role_map.insert(
                name.to_string(),
                json!({ "keyids": keyids, "threshold": threshold }),
            );
        }

        let signed = json!({
            "_type": "root",
            "version": 1,
            "expires": "2031-05-03T00:00:00Z",
            "keys": Value::Object(keys),
            "roles": Value::Object(role_map),
        });
        write_signed(&self.repository(), "root.json", signed, self, signers);
    }

    /// Write a non-root role document signed by `signers`.
    pub fn write_role(&self, name: &str, signers: &[usize]) {
        let signed = json!({ "_type": name, "version": 1, "expires": "2021-08-03T00:00:00Z" });
        write_signed(
            &self.repository(),
            &format!("{name}.json"),
            signed,
            self,
            signers,
        );
    }
}

/// Sign `signed` with the selected ceremony keys and stage it.
pub fn write_signed(repo: &Path, name: &str, signed: Value, ceremony: &Ceremony, signers: &[usize]) {
    let message = ceremony_core::canonical_json(&signed).unwrap();
    let signatures: Vec<Value> = signers
        .iter()
        .map(|&i| {
            let signature: Signature = ceremony.signing_keys[i].sign(&message);
            json!({
                "keyid": ceremony.descriptor(i).key_id().unwrap().as_str(),
                "sig": hex::encode(signature.to_der().as_bytes()),
            })
        })
        .collect();

    let staged = repo.join("staged");
    fs::create_dir_all(&staged).unwrap();
    fs::write(
        staged.join(name),
        serde_json::to_vec_pretty(&json!({ "signed": signed, "signatures": signatures })).unwrap(),
    )
    .unwrap();
}
