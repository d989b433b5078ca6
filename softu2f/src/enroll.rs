//! Registration
//!
//! Picks the first challenge this helper supports, creates a key for it and
//! returns a U2F registration response signed by the attestation authority.

use crate::error::{Error, Result};
use crate::keystore::KeyStore;
use crate::metadata::RegistrationMetadata;
use crate::protocol::{EnrollChallenge, EnrollHelperReply, EnrollHelperRequest};
use crate::status_map::reportable;

use softu2f_apdu::raw::{registration_response, registration_signed_data};
use softu2f_apdu::{key_handle, U2F_VERSION};
use softu2f_crypto::AttestationAuthority;

pub struct EnrollOrchestrator<'a, K, A> {
    store: &'a K,
    attestation: &'a A,
}

impl<'a, K, A> EnrollOrchestrator<'a, K, A>
where
    K: KeyStore,
    A: AttestationAuthority,
{
    pub fn new(store: &'a K, attestation: &'a A) -> Self {
        Self { store, attestation }
    }

    /// Register a new key for the first `U2F_V2` challenge.
    ///
    /// Key store failures with a status code become a failed reply. Everything
    /// else, including a request with no supported challenge, is an error.
    pub fn handle(&self, request: &EnrollHelperRequest) -> Result<EnrollHelperReply> {
        let challenge = request
            .enroll_challenges
            .iter()
            .find(|challenge| challenge.version == U2F_VERSION)
            .ok_or(Error::NoSupportedChallenge)?;

        // TODO: reply with a device-ineligible status when one of
        // request.sign_challenges already names a key in this store
        log::debug!(
            "enroll request: {} challenge(s), {} known handle(s)",
            request.enroll_challenges.len(),
            request.sign_challenges.len()
        );

        match self.register(challenge) {
            Ok(data) => Ok(EnrollHelperReply::Registered {
                version: U2F_VERSION.to_string(),
                data,
            }),
            Err(e) => {
                let (status, error) = reportable(e)?;
                log::warn!("registration failed: {} ({})", error, status);
                Ok(EnrollHelperReply::Failed { status, error })
            }
        }
    }

    fn register(&self, challenge: &EnrollChallenge) -> Result<Vec<u8>> {
        let metadata = RegistrationMetadata::new(&challenge.application_parameter).to_bytes()?;
        let generated = self.store.generate_key(&metadata)?;
        let key_handle = key_handle::pad(&generated.fingerprint);

        let signed = registration_signed_data(
            &challenge.application_parameter,
            &challenge.challenge_parameter,
            &key_handle,
            &generated.public_key,
        );
        let signature = self
            .attestation
            .sign(&signed)
            .ok_or_else(|| Error::Attestation("no signature over registration data".to_string()))?;

        log::info!("registered key with {} byte handle", key_handle.len());
        Ok(registration_response(
            &generated.public_key,
            &key_handle,
            &self.attestation.export_certificate(),
            &signature,
        ))
    }
}
