//! Device serial numbers and the raw key products found on disk.

use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer identifier of a physical signing device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(u64);

impl SerialNumber {
    /// Create a serial number from its integer value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the integer value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for SerialNumber {
    type Err = Error;

    /// Parse a decimal, non-negative serial number (e.g. a key directory name).
    fn from_str(s: &str) -> Result<Self> {
        // u64::from_str accepts a leading '+', device serials never carry one.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidSerialFormat {
                value: s.to_string(),
                reason: "expected a non-negative decimal integer".to_string(),
            });
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| Error::InvalidSerialFormat {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One part of a key product set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    PublicKey,
    DeviceCertificate,
    KeyCertificate,
}

impl ArtifactKind {
    /// All kinds, in the order they are reported.
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::PublicKey,
        ArtifactKind::DeviceCertificate,
        ArtifactKind::KeyCertificate,
    ];

    /// File name suffix that identifies this artifact kind.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::PublicKey => "_pubkey.pem",
            Self::DeviceCertificate => "_device_cert.pem",
            Self::KeyCertificate => "_key_cert.pem",
        }
    }

    /// Classify a file by its name, if it is a key product at all.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| name.ends_with(kind.file_suffix()))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PublicKey => "public key",
            Self::DeviceCertificate => "device certificate",
            Self::KeyCertificate => "key certificate",
        };
        f.write_str(name)
    }
}

/// The key products generated for one device during the ceremony.
///
/// Loaded as-is from disk; fields may be empty when a file was not found.
/// Completeness is checked when the registry is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningKeyArtifact {
    pub serial_number: SerialNumber,
    /// PEM-encoded SubjectPublicKeyInfo of the signing key.
    pub public_key: Bytes,
    /// PEM-encoded device (attestation) certificate.
    pub device_cert: Bytes,
    /// PEM-encoded key (attestation) certificate.
    pub key_cert: Bytes,
}

impl SigningKeyArtifact {
    /// Create an artifact with no key products attached.
    pub fn empty(serial_number: SerialNumber) -> Self {
        Self {
            serial_number,
            public_key: Bytes::new(),
            device_cert: Bytes::new(),
            key_cert: Bytes::new(),
        }
    }

    /// Get the bytes of one artifact kind.
    pub fn part(&self, kind: ArtifactKind) -> &Bytes {
        match kind {
            ArtifactKind::PublicKey => &self.public_key,
            ArtifactKind::DeviceCertificate => &self.device_cert,
            ArtifactKind::KeyCertificate => &self.key_cert,
        }
    }

    /// Replace the bytes of one artifact kind.
    pub fn set_part(&mut self, kind: ArtifactKind, data: Bytes) {
        match kind {
            ArtifactKind::PublicKey => self.public_key = data,
            ArtifactKind::DeviceCertificate => self.device_cert = data,
            ArtifactKind::KeyCertificate => self.key_cert = data,
        }
    }

    /// Kinds whose bytes are empty.
    pub fn missing_parts(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| self.part(*kind).is_empty())
            .collect()
    }

    /// True when every key product is present.
    pub fn is_complete(&self) -> bool {
        self.missing_parts().is_empty()
    }
}
