//! ECDSA P-256 key pairs

use crate::error::{CryptoError, Result};

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Length of an uncompressed SEC1 public key
pub const PUBLIC_KEY_LEN: usize = 65;

/// Length of a key fingerprint (SHA-256 of the public key)
pub const FINGERPRINT_LEN: usize = 32;

const SECRET_KEY_LEN: usize = 32;

/// A P-256 signing key and its public half
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Load a key from its raw 32-byte scalar
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Load a key from a PKCS#8 PEM document, PKCS#8 DER, or a raw scalar
    pub fn from_key_material(material: &[u8]) -> Result<Self> {
        if material.starts_with(b"-----BEGIN") {
            let pem = std::str::from_utf8(material).map_err(|_| CryptoError::InvalidPrivateKey)?;
            let signing_key =
                SigningKey::from_pkcs8_pem(pem).map_err(|_| CryptoError::InvalidPrivateKey)?;
            return Ok(Self { signing_key });
        }
        if material.len() == SECRET_KEY_LEN {
            return Self::from_secret_bytes(material);
        }
        let signing_key =
            SigningKey::from_pkcs8_der(material).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Raw 32-byte scalar
    pub fn secret_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    /// Uncompressed SEC1 public key (0x04 || X || Y)
    pub fn public_key(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    /// SHA-256 of the uncompressed public key
    pub fn fingerprint(&self) -> Vec<u8> {
        Sha256::digest(self.public_key()).to_vec()
    }

    /// DER-encoded ECDSA signature over SHA-256(`data`)
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(data);
        signature.to_der().as_bytes().to_vec()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

/// Check a DER signature against an uncompressed public key
pub fn verify(public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    let signature = Signature::from_der(signature).map_err(|_| CryptoError::InvalidSignature)?;
    verifying_key
        .verify(data, &signature)
        .map_err(|_| CryptoError::InvalidSignature)
}
