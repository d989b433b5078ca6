//! Error types for raw message and key handle decoding

use thiserror::Error;

/// Errors produced while parsing raw U2F response messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawMessageError {
    /// The message ended before a field was complete
    #[error("message truncated in {field}: need {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// The leading reserved byte has an unexpected value
    #[error("invalid reserved byte: 0x{0:02x}")]
    InvalidReserved(u8),

    /// The attestation certificate is not a DER SEQUENCE with a supported length form
    #[error("invalid attestation certificate encoding")]
    InvalidCertificate,
}

/// Errors produced while recovering a fingerprint from a key handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyHandleError {
    /// The handle is not longer than the filler block
    #[error("key handle too short: {len} bytes")]
    TooShort { len: usize },

    /// The trailing filler block is not all zero
    #[error("key handle is not padded")]
    NotPadded,
}
