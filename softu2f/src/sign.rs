//! Authentication
//!
//! Walks the sign challenges in order and answers the first one whose key
//! handle resolves to a key registered for the same application. The key's
//! stored counter is advanced under the key store's update lock before
//! signing; the signature carries the value read before the advance.

use crate::error::{Error, Result};
use crate::keystore::{KeyStore, KeyStoreError};
use crate::metadata::RegistrationMetadata;
use crate::protocol::{SignChallenge, SignHelperReply, SignHelperRequest};
use crate::status_map::reportable;

use softu2f_apdu::raw::{authentication_response, authentication_signed_data};
use softu2f_apdu::{key_handle, U2F_VERSION};

pub struct SignOrchestrator<'a, K> {
    store: &'a K,
}

impl<'a, K: KeyStore> SignOrchestrator<'a, K> {
    pub fn new(store: &'a K) -> Self {
        Self { store }
    }

    /// Sign the first challenge that names one of our keys.
    ///
    /// Unsupported versions and unknown handles are skipped. Key store
    /// failures with a status code end the walk with a failed reply.
    pub fn handle(&self, request: &SignHelperRequest) -> Result<SignHelperReply> {
        for (index, challenge) in request.sign_challenges.iter().enumerate() {
            if challenge.version != U2F_VERSION {
                log::debug!("challenge {}: unsupported version {}", index, challenge.version);
                continue;
            }

            match self.authenticate(challenge) {
                Ok(data) => {
                    return Ok(SignHelperReply::Signed {
                        challenge: challenge.clone(),
                        data,
                    })
                }
                Err(Error::KeyNotFound) => {
                    log::debug!("challenge {}: no matching key", index);
                }
                Err(e) => {
                    let (status, error) = reportable(e)?;
                    log::warn!("authentication failed: {} ({})", error, status);
                    return Ok(SignHelperReply::Failed { status, error });
                }
            }
        }

        Err(Error::NoSupportedChallenge)
    }

    fn authenticate(&self, challenge: &SignChallenge) -> Result<Vec<u8>> {
        let fingerprint = key_handle::unpad(&challenge.key_handle).map_err(|e| {
            log::debug!("ignoring foreign key handle: {}", e);
            Error::KeyNotFound
        })?;

        let key = match self.store.find_key(fingerprint) {
            Err(KeyStoreError::NotFound) => return Err(Error::KeyNotFound),
            other => other?,
        };

        let metadata = RegistrationMetadata::from_bytes(&self.store.metadata(fingerprint)?)?;
        if metadata.application_parameter != challenge.application_parameter {
            log::debug!("key handle registered for a different application");
            return Err(Error::KeyNotFound);
        }

        let mut counter = 0;
        self.store.update_metadata(fingerprint, &mut |current| {
            let mut metadata = RegistrationMetadata::from_bytes(current)?;
            counter = metadata.counter;
            metadata.advance()?;
            metadata.to_bytes()
        })?;

        let signed = authentication_signed_data(
            &challenge.application_parameter,
            true,
            counter,
            &challenge.challenge_parameter,
        );
        let signature = self.store.sign(&signed, &key)?;

        log::info!("signed challenge with counter {}", counter);
        Ok(authentication_response(true, counter, &signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::{MemoryKeyStore, UpResult};
    use softu2f_apdu::{AuthenticationResponse, StatusCode};
    use softu2f_crypto::verify;
    use std::sync::Arc;

    const APP: [u8; 32] = [0xaa; 32];
    const CHALLENGE: [u8; 32] = [0xcc; 32];

    fn register(store: &MemoryKeyStore, application_parameter: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let metadata = RegistrationMetadata::new(application_parameter).to_bytes().unwrap();
        let generated = store.generate_key(&metadata).unwrap();
        (key_handle::pad(&generated.fingerprint), generated.public_key)
    }

    fn challenge(version: &str, key_handle: &[u8]) -> SignChallenge {
        SignChallenge {
            version: version.to_string(),
            challenge_parameter: CHALLENGE.to_vec(),
            application_parameter: APP.to_vec(),
            key_handle: key_handle.to_vec(),
        }
    }

    fn request(challenges: Vec<SignChallenge>) -> SignHelperRequest {
        SignHelperRequest {
            sign_challenges: challenges,
        }
    }

    #[test]
    fn test_sign() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let (handle, public_key) = register(&store, &APP);

        let reply = SignOrchestrator::new(&store)
            .handle(&request(vec![challenge("U2F_V2", &handle)]))
            .unwrap();
        let SignHelperReply::Signed { challenge: echoed, data } = reply else {
            panic!("expected a signature");
        };
        assert_eq!(echoed.key_handle, handle);

        let response = AuthenticationResponse::parse(&data).unwrap();
        assert!(response.user_present());
        assert_eq!(response.counter, 0);

        let signed = authentication_signed_data(&APP, true, 0, &CHALLENGE);
        assert!(verify(&public_key, &signed, &response.signature).is_ok());
    }

    #[test]
    fn test_counter_advances() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let (handle, _) = register(&store, &APP);
        let orchestrator = SignOrchestrator::new(&store);

        for expected in 0..5 {
            let reply = orchestrator
                .handle(&request(vec![challenge("U2F_V2", &handle)]))
                .unwrap();
            let SignHelperReply::Signed { data, .. } = reply else {
                panic!("expected a signature");
            };
            assert_eq!(AuthenticationResponse::parse(&data).unwrap().counter, expected);
        }

        let fingerprint = key_handle::unpad(&handle).unwrap();
        let metadata = RegistrationMetadata::from_bytes(&store.metadata(fingerprint).unwrap()).unwrap();
        assert_eq!(metadata.counter, 5);
    }

    #[test]
    fn test_skips_unusable_challenges() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let (handle, _) = register(&store, &APP);
        let (other_app_handle, _) = register(&store, &[0xbb; 32]);

        let reply = SignOrchestrator::new(&store)
            .handle(&request(vec![
                challenge("U2F_V1", &handle),
                challenge("U2F_V2", b"short"),
                challenge("U2F_V2", &key_handle::pad(&[0x01; 32])),
                challenge("U2F_V2", &other_app_handle),
                challenge("U2F_V2", &handle),
            ]))
            .unwrap();
        let SignHelperReply::Signed { challenge: echoed, .. } = reply else {
            panic!("expected a signature");
        };
        assert_eq!(echoed.key_handle, handle);

        // The skipped key was not touched
        let fingerprint = key_handle::unpad(&other_app_handle).unwrap();
        let metadata = RegistrationMetadata::from_bytes(&store.metadata(fingerprint).unwrap()).unwrap();
        assert_eq!(metadata.counter, 0);
    }

    #[test]
    fn test_no_matching_key() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let (handle, _) = register(&store, &[0xbb; 32]);
        let orchestrator = SignOrchestrator::new(&store);

        assert!(matches!(
            orchestrator.handle(&request(vec![challenge("U2F_V2", &handle)])),
            Err(Error::NoSupportedChallenge)
        ));
        assert!(matches!(
            orchestrator.handle(&request(Vec::new())),
            Err(Error::NoSupportedChallenge)
        ));
    }

    #[test]
    fn test_denied_presence_replies_wait_touch() {
        let store =
            MemoryKeyStore::with_presence("SoftU2F Tests", Arc::new(|_| UpResult::Denied));
        let (handle, _) = register(&store, &APP);

        let reply = SignOrchestrator::new(&store)
            .handle(&request(vec![challenge("U2F_V2", &handle)]))
            .unwrap();
        assert_eq!(
            reply,
            SignHelperReply::Failed {
                status: StatusCode::WaitTouch,
                error: "User canceled".to_string(),
            }
        );
    }

    #[test]
    fn test_exhausted_counter_is_fatal() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let (handle, _) = register(&store, &APP);
        let fingerprint = key_handle::unpad(&handle).unwrap();

        let mut metadata = RegistrationMetadata::new(&APP);
        metadata.counter = u32::MAX;
        store.set_metadata(fingerprint, &metadata.to_bytes().unwrap()).unwrap();

        let result = SignOrchestrator::new(&store).handle(&request(vec![challenge("U2F_V2", &handle)]));
        assert!(matches!(
            result,
            Err(Error::KeyStore(KeyStoreError::CounterExhausted))
        ));
    }
}
