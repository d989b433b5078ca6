//! Key handle encoding
//!
//! A key handle is the key-store fingerprint followed by a block of zero
//! bytes. U2F conformance tooling rejects handles shorter than 64 bytes, and
//! fingerprints are shorter than that.

use crate::error::KeyHandleError;

/// Number of zero bytes appended to every fingerprint
pub const PADDING_LEN: usize = 50;

/// Encode a fingerprint as a key handle
pub fn pad(fingerprint: &[u8]) -> Vec<u8> {
    let mut handle = Vec::with_capacity(fingerprint.len() + PADDING_LEN);
    handle.extend_from_slice(fingerprint);
    handle.resize(fingerprint.len() + PADDING_LEN, 0x00);
    handle
}

/// Recover the fingerprint from a key handle produced by [`pad`].
///
/// Handles that cannot have come from `pad` are rejected: anything shorter
/// than the filler block, and anything whose filler block is not all zero.
pub fn unpad(key_handle: &[u8]) -> Result<&[u8], KeyHandleError> {
    if key_handle.len() < PADDING_LEN {
        return Err(KeyHandleError::TooShort {
            len: key_handle.len(),
        });
    }

    let (fingerprint, filler) = key_handle.split_at(key_handle.len() - PADDING_LEN);
    if filler.iter().any(|&b| b != 0x00) {
        return Err(KeyHandleError::NotPadded);
    }
    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pad_length() {
        let fingerprint = [0xabu8; 32];
        let handle = pad(&fingerprint);
        assert_eq!(handle.len(), 82);
        assert_eq!(&handle[..32], &fingerprint);
        assert!(handle[32..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_unpad_short_handle_rejected() {
        assert_eq!(
            unpad(&[0u8; PADDING_LEN - 1]).unwrap_err(),
            KeyHandleError::TooShort { len: PADDING_LEN - 1 }
        );
        assert_eq!(unpad(b"KH").unwrap_err(), KeyHandleError::TooShort { len: 2 });
    }

    #[test]
    fn test_unpad_bare_filler_is_empty_fingerprint() {
        assert_eq!(unpad(&pad(&[])).unwrap(), &[][..]);
        assert_eq!(unpad(&[0u8; PADDING_LEN]).unwrap(), &[][..]);
    }

    #[test]
    fn test_unpad_foreign_handle_rejected() {
        let mut handle = pad(b"fingerprint");
        let last = handle.len() - 1;
        handle[last] = 0x01;
        assert_eq!(unpad(&handle).unwrap_err(), KeyHandleError::NotPadded);
    }

    proptest! {
        #[test]
        fn prop_unpad_inverts_pad(fingerprint in proptest::collection::vec(any::<u8>(), 0..200)) {
            let handle = pad(&fingerprint);
            prop_assert_eq!(unpad(&handle).unwrap(), fingerprint.as_slice());
        }
    }
}
