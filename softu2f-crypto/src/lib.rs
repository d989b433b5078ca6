//! Cryptographic primitives for the SoftU2F helper
//!
//! - ECDSA P-256 key pairs with SHA-256 signatures (the only U2F algorithm)
//! - Key fingerprints used to build key handles
//! - Attestation signing with an externally issued certificate

pub mod attestation;
pub mod error;
pub mod keys;

// Re-export commonly used types
pub use attestation::{AttestationAuthority, SoftAttestation};
pub use error::{CryptoError, Result};
pub use keys::{verify, KeyPair, FINGERPRINT_LEN, PUBLIC_KEY_LEN};
