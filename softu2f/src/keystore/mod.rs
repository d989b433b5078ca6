//! Key storage
//!
//! The orchestrators only see the [`KeyStore`] trait. Every store is bound to
//! a namespace at construction so separate helpers (or tests) never see each
//! other's keys.

pub mod file;
pub mod memory;

pub use file::FileKeyStore;
pub use memory::MemoryKeyStore;

use softu2f_crypto::CryptoError;

use std::sync::Arc;
use thiserror::Error;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "SoftU2F Security Key";

/// Errors reported by a key store
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// No key with the given fingerprint exists in this namespace
    #[error("key not found")]
    NotFound,

    /// The user refused the presence check
    #[error("User canceled")]
    UserCancelled,

    /// The presence check was not answered in time
    #[error("user presence timed out")]
    Timeout,

    /// Another process holds the key
    #[error("key store busy")]
    Busy,

    /// The backing storage is no longer available
    #[error("key store unavailable: {0}")]
    Gone(String),

    /// Stored data could not be decoded
    #[error("corrupt key store entry: {0}")]
    Corrupt(String),

    /// The signature counter cannot be advanced any further
    #[error("signature counter exhausted")]
    CounterExhausted,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("key store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for key store operations
pub type Result<T> = std::result::Result<T, KeyStoreError>;

/// User presence result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpResult {
    /// The user has denied the action
    Denied,
    /// The user has accepted the action
    Accepted,
    /// The user presence check has timed out
    Timeout,
}

impl UpResult {
    /// Turn a presence answer into the key store outcome
    pub fn into_result(self) -> Result<()> {
        match self {
            UpResult::Accepted => Ok(()),
            UpResult::Denied => Err(KeyStoreError::UserCancelled),
            UpResult::Timeout => Err(KeyStoreError::Timeout),
        }
    }
}

/// User presence callback type; receives the operation being authorized
pub type UpCallback = Arc<dyn Fn(&str) -> UpResult + Send + Sync>;

/// Presence callback that approves every request
pub fn always_accept() -> UpCallback {
    Arc::new(|_| UpResult::Accepted)
}

/// A newly created key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    /// Store-assigned identifier, recoverable from the key handle
    pub fingerprint: Vec<u8>,
    /// Uncompressed SEC1 public key
    pub public_key: Vec<u8>,
}

/// Storage for credential keys and their metadata
pub trait KeyStore {
    /// Handle to a key found in the store
    type KeyRef;

    /// Create a key and store `metadata` alongside it
    fn generate_key(&self, metadata: &[u8]) -> Result<GeneratedKey>;

    /// Look up a key by fingerprint
    fn find_key(&self, fingerprint: &[u8]) -> Result<Self::KeyRef>;

    /// Sign `data` after the user presence check
    fn sign(&self, data: &[u8], key: &Self::KeyRef) -> Result<Vec<u8>>;

    fn metadata(&self, fingerprint: &[u8]) -> Result<Vec<u8>>;

    fn set_metadata(&self, fingerprint: &[u8], metadata: &[u8]) -> Result<()>;

    /// Atomically replace a key's metadata with `update(current)`.
    ///
    /// No other update of the same key, in this process or another, may run
    /// between the read and the write. Returns the stored bytes.
    fn update_metadata(
        &self,
        fingerprint: &[u8],
        update: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<Vec<u8>>;

    /// Number of keys in this namespace
    fn count(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_results() {
        assert!(UpResult::Accepted.into_result().is_ok());
        assert!(matches!(
            UpResult::Denied.into_result(),
            Err(KeyStoreError::UserCancelled)
        ));
        assert!(matches!(
            UpResult::Timeout.into_result(),
            Err(KeyStoreError::Timeout)
        ));
    }
}
