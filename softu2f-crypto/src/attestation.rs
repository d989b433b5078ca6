//! Attestation signing
//!
//! The registration payload is signed by a device-level key whose certificate
//! is embedded in the registration response. The certificate is issued
//! elsewhere; this module only holds the key and the DER bytes.

use crate::error::{CryptoError, Result};
use crate::keys::KeyPair;

use std::path::Path;

/// Signs registration payloads and exports the matching certificate
pub trait AttestationAuthority {
    /// Sign `payload`, or `None` if the authority could not produce a signature
    fn sign(&self, payload: &[u8]) -> Option<Vec<u8>>;

    /// DER-encoded attestation certificate
    fn export_certificate(&self) -> Vec<u8>;
}

/// Software attestation backed by a P-256 key and a DER certificate
#[derive(Debug, Clone)]
pub struct SoftAttestation {
    key: KeyPair,
    certificate: Vec<u8>,
}

impl SoftAttestation {
    pub fn new(key: KeyPair, certificate: Vec<u8>) -> Result<Self> {
        // X.509 certificates are a DER SEQUENCE
        if certificate.first() != Some(&0x30) {
            return Err(CryptoError::InvalidCertificate);
        }
        Ok(Self { key, certificate })
    }

    /// Load the certificate (DER) and the private key (PKCS#8 PEM/DER or raw scalar)
    pub fn from_files(certificate_path: &Path, key_path: &Path) -> Result<Self> {
        let certificate = read(certificate_path)?;
        let key = KeyPair::from_key_material(&read(key_path)?)?;
        log::debug!(
            "loaded attestation certificate from {}",
            certificate_path.display()
        );
        Self::new(key, certificate)
    }

    pub fn public_key(&self) -> Vec<u8> {
        self.key.public_key()
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| CryptoError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl AttestationAuthority for SoftAttestation {
    fn sign(&self, payload: &[u8]) -> Option<Vec<u8>> {
        Some(self.key.sign(payload))
    }

    fn export_certificate(&self) -> Vec<u8> {
        self.certificate.clone()
    }
}
