use crate::keystore::KeyStoreError;

use softu2f_apdu::KeyHandleError;
use softu2f_crypto::CryptoError;

use thiserror::Error;

/// Errors that abort processing of a helper request.
///
/// Protocol-level outcomes such as user cancellation are not errors; they are
/// returned as replies carrying a non-OK status code.
#[derive(Debug, Error)]
pub enum Error {
    /// The request `type` is not one the helper understands
    #[error("unknown request type: {0}")]
    UnknownRequestType(String),

    /// No challenge carries a supported `version`, or none resolved to a key
    #[error("no challenge with a supported version and a known key")]
    NoSupportedChallenge,

    /// No key matches the given key handle and application parameter
    #[error("key not found")]
    KeyNotFound,

    /// A required JSON field is absent
    #[error("missing field: {0}")]
    FieldMissing(String),

    /// A JSON field is present but has the wrong type
    #[error("field {field} has the wrong type: expected {expected}")]
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// A binary JSON field is not valid web-safe base64
    #[error("field {field} is not valid web-safe base64")]
    InvalidBase64 { field: String },

    /// The key handle was not produced by this helper
    #[error("invalid key handle: {0}")]
    KeyHandle(#[from] KeyHandleError),

    /// Framing or JSON transport failure
    #[error("transport error: {0}")]
    Transport(#[from] softu2f_transport::Error),

    /// Key store failure that has no protocol status code
    #[error("key store error: {0}")]
    KeyStore(#[from] KeyStoreError),

    /// The attestation authority did not sign the registration payload
    #[error("attestation failed: {0}")]
    Attestation(String),

    /// Key or certificate material could not be loaded
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Result type alias for helper operations
pub type Result<T> = std::result::Result<T, Error>;
