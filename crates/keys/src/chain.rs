//! Certificate chain verification.
//!
//! A ceremony key is trusted when its device certificate chains to the root
//! CA and its key certificate, issued by the device, certifies the exact
//! public key found next to it.

use crate::error::ChainError;
use ceremony_core::SigningKeyArtifact;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::{FromDer, SubjectPublicKeyInfo, X509Certificate};

const ROOT_CA: &str = "root CA certificate";
const DEVICE_CERT: &str = "device certificate";
const KEY_CERT: &str = "key certificate";
const PUBLIC_KEY: &str = "public key";

/// Certificate chain and binding checks for one device's key products.
pub trait ChainVerifier: Send + Sync {
    /// Check that a PEM device certificate chains to the trusted root.
    fn verify_device(&self, device_cert: &[u8]) -> Result<(), ChainError>;

    /// Check that a PEM key certificate was issued by the device certificate
    /// and certifies `public_key` (PEM SubjectPublicKeyInfo).
    fn verify_binding(
        &self,
        key_cert: &[u8],
        device_cert: &[u8],
        public_key: &[u8],
    ) -> Result<(), ChainError>;

    /// Run every check for an artifact.
    fn verify_artifact(&self, artifact: &SigningKeyArtifact) -> Result<(), ChainError> {
        self.verify_device(&artifact.device_cert)?;
        self.verify_binding(
            &artifact.key_cert,
            &artifact.device_cert,
            &artifact.public_key,
        )
    }
}

/// X.509 verifier anchored at a single root CA.
#[derive(Clone)]
pub struct X509ChainVerifier {
    root_der: Vec<u8>,
    root_subject: String,
}

impl X509ChainVerifier {
    /// Create a verifier from a PEM-encoded root CA certificate.
    ///
    /// Fails if the certificate cannot be parsed or is not a CA.
    pub fn from_pem(root_pem: &[u8]) -> Result<Self, ChainError> {
        let root_der = der_from_pem(root_pem, ROOT_CA)?;
        let root = parse_certificate(&root_der, ROOT_CA)?;
        ensure_may_issue(&root, ROOT_CA, DEVICE_CERT)?;
        let root_subject = root.subject().to_string();
        Ok(Self {
            root_der,
            root_subject,
        })
    }

    /// Subject of the root CA, for log lines.
    pub fn root_subject(&self) -> &str {
        &self.root_subject
    }
}

impl std::fmt::Debug for X509ChainVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X509ChainVerifier")
            .field("root_subject", &self.root_subject)
            .finish()
    }
}

impl ChainVerifier for X509ChainVerifier {
    fn verify_device(&self, device_cert: &[u8]) -> Result<(), ChainError> {
        let root = parse_certificate(&self.root_der, ROOT_CA)?;
        check_validity(&root, ROOT_CA)?;

        let device_der = der_from_pem(device_cert, DEVICE_CERT)?;
        let device = parse_certificate(&device_der, DEVICE_CERT)?;
        verify_issued_by(&device, DEVICE_CERT, &root, ROOT_CA)
    }

    fn verify_binding(
        &self,
        key_cert: &[u8],
        device_cert: &[u8],
        public_key: &[u8],
    ) -> Result<(), ChainError> {
        let device_der = der_from_pem(device_cert, DEVICE_CERT)?;
        let device = parse_certificate(&device_der, DEVICE_CERT)?;
        let key_der = der_from_pem(key_cert, KEY_CERT)?;
        let key = parse_certificate(&key_der, KEY_CERT)?;
        verify_issued_by(&key, KEY_CERT, &device, DEVICE_CERT)?;

        let spki_der = der_from_pem(public_key, PUBLIC_KEY)?;
        let (_, spki) =
            SubjectPublicKeyInfo::from_der(&spki_der).map_err(|e| ChainError::Parse {
                what: PUBLIC_KEY,
                reason: e.to_string(),
            })?;

        if spki_point(key.public_key()) != spki_point(&spki) {
            return Err(ChainError::KeyMismatch);
        }
        Ok(())
    }
}

/// Extract the DER contents of the first PEM block.
fn der_from_pem(pem: &[u8], what: &'static str) -> Result<Vec<u8>, ChainError> {
    let (_, pem) = parse_x509_pem(pem).map_err(|e| ChainError::Parse {
        what,
        reason: format!("invalid PEM: {e}"),
    })?;
    Ok(pem.contents)
}

fn parse_certificate<'a>(
    der: &'a [u8],
    what: &'static str,
) -> Result<X509Certificate<'a>, ChainError> {
    let (_, cert) = X509Certificate::from_der(der).map_err(|e| ChainError::Parse {
        what,
        reason: e.to_string(),
    })?;
    Ok(cert)
}

fn spki_point<'a>(spki: &'a SubjectPublicKeyInfo<'_>) -> &'a [u8] {
    &spki.subject_public_key.data
}

/// Signature, issuer capability and validity checks for one chain link.
fn verify_issued_by(
    cert: &X509Certificate<'_>,
    what: &'static str,
    issuer: &X509Certificate<'_>,
    issuer_what: &'static str,
) -> Result<(), ChainError> {
    ensure_may_issue(issuer, issuer_what, what)?;
    cert.verify_signature(Some(issuer.public_key()))
        .map_err(|e| ChainError::BadSignature {
            what,
            issuer: issuer_what,
            reason: e.to_string(),
        })?;
    check_validity(cert, what)
}

fn check_validity(cert: &X509Certificate<'_>, what: &'static str) -> Result<(), ChainError> {
    let validity = cert.validity();
    if !validity.is_valid() {
        return Err(ChainError::OutsideValidity {
            what,
            not_before: validity.not_before.to_string(),
            not_after: validity.not_after.to_string(),
        });
    }
    Ok(())
}

/// Reject issuers whose basic constraints explicitly mark them as non-CA.
///
/// Device attestation certificates commonly omit the extension entirely,
/// which is accepted.
fn ensure_may_issue(
    issuer: &X509Certificate<'_>,
    what: &'static str,
    issued: &'static str,
) -> Result<(), ChainError> {
    let constraints = issuer
        .basic_constraints()
        .map_err(|e| ChainError::BasicConstraints {
            what,
            reason: e.to_string(),
        })?;
    match constraints {
        Some(ext) if !ext.value.ca => Err(ChainError::NotCa { what, issued }),
        _ => Ok(()),
    }
}
