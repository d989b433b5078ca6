//! Error types for cryptographic operations

use thiserror::Error;

/// Cryptographic operation errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid public key provided
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key provided
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature format
    #[error("Invalid signature")]
    InvalidSignature,

    /// Attestation certificate is not DER encoded
    #[error("Invalid attestation certificate")]
    InvalidCertificate,

    /// Reading key or certificate material failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
