//! Key store failures that the helper protocol can report as a status code

use crate::error::Error;
use crate::keystore::KeyStoreError;

use softu2f_apdu::StatusCode;

/// Status code for a key store error, or `None` if the error is fatal
pub fn status_for(error: &KeyStoreError) -> Option<StatusCode> {
    match error {
        KeyStoreError::UserCancelled => Some(StatusCode::WaitTouch),
        KeyStoreError::Timeout => Some(StatusCode::Timeout),
        KeyStoreError::Busy => Some(StatusCode::Busy),
        KeyStoreError::Gone(_) => Some(StatusCode::Gone),
        _ => None,
    }
}

/// Split a helper error into a reportable status and detail, or hand it back
pub(crate) fn reportable(error: Error) -> Result<(StatusCode, String), Error> {
    if let Error::KeyStore(e) = &error {
        if let Some(status) = status_for(e) {
            return Ok((status, e.to_string()));
        }
    }
    Err(error)
}
