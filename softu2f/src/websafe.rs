//! Web-safe base64 (RFC 4648 §5) without padding
//!
//! Binary fields in the helper protocol use this encoding. Decoding accepts
//! input with or without trailing padding.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebSafeBase64Error {
    /// `len % 4 == 1` can never be produced by an encoder
    #[error("invalid web-safe base64 length: {0}")]
    InvalidLength(usize),

    #[error("invalid web-safe base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Encode with `-` and `_` and no `=` padding
pub fn encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a web-safe string, restoring padding from the length
pub fn decode(input: &str) -> Result<Vec<u8>, WebSafeBase64Error> {
    let mut b64: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    match b64.len() % 4 {
        0 => {}
        2 => b64.push_str("=="),
        3 => b64.push('='),
        _ => return Err(WebSafeBase64Error::InvalidLength(input.len())),
    }

    Ok(STANDARD.decode(b64)?)
}
