//! Request dispatch
//!
//! The helper is started once per request: read one message, answer it, exit.

use crate::enroll::EnrollOrchestrator;
use crate::error::Result;
use crate::json::Object;
use crate::keystore::KeyStore;
use crate::protocol::{Reply, Request};
use crate::sign::SignOrchestrator;

use softu2f_crypto::AttestationAuthority;
use softu2f_transport::NativeMessaging;

use std::io::{Read, Write};

/// A key store and an attestation authority wired to the helper protocol
pub struct Helper<K, A> {
    store: K,
    attestation: A,
}

impl<K, A> Helper<K, A>
where
    K: KeyStore,
    A: AttestationAuthority,
{
    pub fn new(store: K, attestation: A) -> Self {
        Self { store, attestation }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Answer one decoded request
    pub fn handle(&self, message: &Object) -> Result<Reply> {
        match Request::from_json(message)? {
            Request::Enroll(request) => {
                log::info!("handling enroll request");
                EnrollOrchestrator::new(&self.store, &self.attestation)
                    .handle(&request)
                    .map(Reply::Enroll)
            }
            Request::Sign(request) => {
                log::info!(
                    "handling sign request with {} challenge(s)",
                    request.sign_challenges.len()
                );
                SignOrchestrator::new(&self.store)
                    .handle(&request)
                    .map(Reply::Sign)
            }
        }
    }

    /// Receive one framed request, answer it and send the reply
    pub fn run<R: Read, W: Write>(&self, channel: &mut NativeMessaging<R, W>) -> Result<Reply> {
        let message = channel.receive_message()?;
        let reply = self.handle(&message)?;
        channel.send_message(&reply)?;
        log::info!("replied with {}", reply.status());
        Ok(reply)
    }
}
