//! FIDO U2F raw message layer
//!
//! This crate provides the byte-exact pieces of the U2F protocol:
//! - Device status codes used by the Chrome U2F helper protocol
//! - Registration and authentication response messages and their signed-data preimages
//! - Key handle padding
//!
//! Spec: <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html>

pub mod error;
pub mod key_handle;
pub mod raw;
pub mod status;

/// Protocol version string advertised in enroll and sign challenges
pub const U2F_VERSION: &str = "U2F_V2";

// Re-export commonly used types
pub use error::{KeyHandleError, RawMessageError};
pub use raw::{AuthenticationResponse, RegisterResponse};
pub use status::StatusCode;
