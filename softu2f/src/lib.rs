//! Software U2F authenticator for the Chrome U2F helper protocol
//!
//! The browser launches the helper, writes one length-prefixed JSON request
//! to its stdin and reads one reply from its stdout. This crate decodes the
//! request, registers or signs with a [`KeyStore`] and an attestation
//! authority, and encodes the reply.
//!
//! # Example
//!
//! ```
//! use softu2f::{Helper, MemoryKeyStore};
//! use softu2f_crypto::{KeyPair, SoftAttestation};
//!
//! let attestation = SoftAttestation::new(KeyPair::generate(), vec![0x30, 0x00]).unwrap();
//! let helper = Helper::new(MemoryKeyStore::new("example"), attestation);
//!
//! let request = serde_json::json!({"type": "sign_helper_request", "signData": []});
//! assert!(helper.handle(request.as_object().unwrap()).is_err());
//! ```

pub mod config;
pub mod enroll;
pub mod error;
pub mod json;
pub mod keystore;
pub mod metadata;
pub mod protocol;
pub mod runner;
pub mod sign;
pub mod status_map;
pub mod websafe;

pub use config::{HelperConfig, HelperConfigBuilder, PresencePolicy};
pub use enroll::EnrollOrchestrator;
pub use error::{Error, Result};
pub use keystore::{
    FileKeyStore, GeneratedKey, KeyStore, KeyStoreError, MemoryKeyStore, UpCallback, UpResult,
};
pub use metadata::RegistrationMetadata;
pub use protocol::{
    EnrollHelperReply, EnrollHelperRequest, Reply, Request, SignHelperReply, SignHelperRequest,
};
pub use runner::Helper;
pub use sign::SignOrchestrator;
pub use status_map::status_for;
