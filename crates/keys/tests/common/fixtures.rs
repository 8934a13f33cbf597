use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair, date_time_ymd,
};
use std::fs;
use std::path::{Path, PathBuf};

/// A self-signed root CA standing in for the device vendor's CA.
pub struct TestRootCa {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl TestRootCa {
    pub fn new(common_name: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params
            .distinguished_name
            .push(DnType::CommonName, common_name);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let cert = params.self_signed(&key).unwrap();
        Self { cert, key }
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }

    /// Issue a device certificate and a key certificate for a fresh signing key.
    pub fn issue_device(&self, serial: u64) -> TestDevice {
        self.issue_device_with(serial, KeyPair::generate().unwrap(), DeviceOptions::default())
    }

    /// Issue device and key certificates for a given signing key.
    pub fn issue_device_with(
        &self,
        serial: u64,
        signing_key: KeyPair,
        options: DeviceOptions,
    ) -> TestDevice {
        let device_key = KeyPair::generate().unwrap();
        let mut device_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        device_params
            .distinguished_name
            .push(DnType::CommonName, format!("Device Attestation {serial}"));
        device_params.is_ca = options.device_ca;
        if options.device_expired {
            device_params.not_before = date_time_ymd(2000, 1, 1);
            device_params.not_after = date_time_ymd(2001, 1, 1);
        }
        let device_cert = device_params
            .signed_by(&device_key, &self.cert, &self.key)
            .unwrap();

        let mut key_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        key_params
            .distinguished_name
            .push(DnType::CommonName, format!("Key Attestation {serial}"));
        let key_cert = key_params
            .signed_by(&signing_key, &device_cert, &device_key)
            .unwrap();

        TestDevice {
            serial,
            public_key_pem: signing_key.public_key_pem(),
            public_key_raw: signing_key.public_key_raw().to_vec(),
            device_cert_pem: device_cert.pem(),
            key_cert_pem: key_cert.pem(),
            signing_key,
        }
    }
}

/// Knobs for producing broken device chains.
pub struct DeviceOptions {
    pub device_ca: IsCa,
    pub device_expired: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            device_ca: IsCa::NoCa,
            device_expired: false,
        }
    }
}

/// Key products of one device.
pub struct TestDevice {
    pub serial: u64,
    pub public_key_pem: String,
    pub public_key_raw: Vec<u8>,
    pub device_cert_pem: String,
    pub key_cert_pem: String,
    #[allow(dead_code)]
    pub signing_key: KeyPair,
}

impl TestDevice {
    /// Write the key products in the ceremony directory layout.
    pub fn write_to(&self, key_dir: &Path) -> PathBuf {
        let dir = key_dir.join(self.serial.to_string());
        fs::create_dir_all(&dir).unwrap();
        let serial = self.serial;
        fs::write(dir.join(format!("{serial}_pubkey.pem")), &self.public_key_pem).unwrap();
        fs::write(
            dir.join(format!("{serial}_device_cert.pem")),
            &self.device_cert_pem,
        )
        .unwrap();
        fs::write(dir.join(format!("{serial}_key_cert.pem")), &self.key_cert_pem).unwrap();
        dir
    }
}
