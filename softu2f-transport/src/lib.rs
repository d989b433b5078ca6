//! Native messaging transport
//!
//! Browser extensions talk to local helper processes over stdin/stdout using a
//! 4-byte little-endian length prefix followed by a UTF-8 JSON body. This crate
//! provides that framing over any `Read`/`Write` pair.
//!
//! Spec: <https://developer.chrome.com/docs/extensions/develop/concepts/native-messaging#native-messaging-host-protocol>

pub mod error;
pub mod native_messaging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use native_messaging::{NativeMessaging, DEFAULT_MAX_INPUT};
