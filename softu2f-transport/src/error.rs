//! Error types for message framing

use thiserror::Error;

/// Framing errors. All of them abort the current request.
#[derive(Debug, Error)]
pub enum Error {
    /// The declared body length exceeds the configured maximum
    #[error("input too large: {declared} bytes declared, maximum is {max}")]
    InputTooLarge { declared: u32, max: u32 },

    /// The body is not valid JSON
    #[error("malformed JSON message: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The body is valid JSON but not an object
    #[error("message is not a JSON object")]
    NotAnObject,

    /// The outgoing message could not be serialized
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// The outgoing message does not fit in a 32-bit length prefix
    #[error("output too large: {0} bytes")]
    OutputTooLarge(usize),

    /// Reading or writing the underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, Error>;
