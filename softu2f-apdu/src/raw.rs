//! Packed binary U2F messages
//!
//! All multi-byte integers are big-endian. The builders are total: callers are
//! responsible for field sizes (the key handle length must fit in one byte).
//!
//! Spec: <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html#registration-response-message-success>

use crate::error::RawMessageError;

/// Leading byte of a registration response
pub const REGISTER_RESERVED: u8 = 0x05;

/// Leading byte of the data signed at registration
pub const REGISTER_SIGNED_RESERVED: u8 = 0x00;

/// Size of an uncompressed P-256 point (0x04 || X || Y)
pub const EC_POINT_SIZE: usize = 65;

/// Largest key handle the one-byte length prefix can describe
pub const MAX_KEY_HANDLE_LEN: usize = u8::MAX as usize;

const USER_PRESENT: u8 = 0x01;
const USER_ABSENT: u8 = 0x00;

fn presence_byte(user_presence: bool) -> u8 {
    if user_presence {
        USER_PRESENT
    } else {
        USER_ABSENT
    }
}

/// 4.3 - Registration Response Message: Success
pub fn registration_response(
    public_key: &[u8],
    key_handle: &[u8],
    certificate: &[u8],
    signature: &[u8],
) -> Vec<u8> {
    debug_assert!(key_handle.len() <= MAX_KEY_HANDLE_LEN);

    let mut data = Vec::with_capacity(
        2 + public_key.len() + key_handle.len() + certificate.len() + signature.len(),
    );
    data.push(REGISTER_RESERVED);
    data.extend_from_slice(public_key);
    data.push(key_handle.len() as u8);
    data.extend_from_slice(key_handle);
    data.extend_from_slice(certificate);
    data.extend_from_slice(signature);
    data
}

/// 4.3 - data under the attestation signature of a registration response
pub fn registration_signed_data(
    application_parameter: &[u8],
    challenge_parameter: &[u8],
    key_handle: &[u8],
    public_key: &[u8],
) -> Vec<u8> {
    let mut data = Vec::with_capacity(
        1 + application_parameter.len()
            + challenge_parameter.len()
            + key_handle.len()
            + public_key.len(),
    );
    data.push(REGISTER_SIGNED_RESERVED);
    data.extend_from_slice(application_parameter);
    data.extend_from_slice(challenge_parameter);
    data.extend_from_slice(key_handle);
    data.extend_from_slice(public_key);
    data
}

/// 5.4 - Authentication Response Message: Success
pub fn authentication_response(user_presence: bool, counter: u32, signature: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(5 + signature.len());
    data.push(presence_byte(user_presence));
    data.extend_from_slice(&counter.to_be_bytes());
    data.extend_from_slice(signature);
    data
}

/// 5.4 - data under the credential signature of an authentication response
pub fn authentication_signed_data(
    application_parameter: &[u8],
    user_presence: bool,
    counter: u32,
    challenge_parameter: &[u8],
) -> Vec<u8> {
    let mut data =
        Vec::with_capacity(application_parameter.len() + 5 + challenge_parameter.len());
    data.extend_from_slice(application_parameter);
    data.push(presence_byte(user_presence));
    data.extend_from_slice(&counter.to_be_bytes());
    data.extend_from_slice(challenge_parameter);
    data
}

/// Sequential reader over a response body
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], RawMessageError> {
        let available = self.data.len() - self.pos;
        if len > available {
            return Err(RawMessageError::Truncated {
                field,
                needed: len,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn byte(&mut self, field: &'static str) -> Result<u8, RawMessageError> {
        Ok(self.take(field, 1)?[0])
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = self.remaining();
        self.pos = self.data.len();
        rest
    }
}

/// Total encoded size of the DER SEQUENCE starting at `data[0]`
fn der_sequence_len(data: &[u8]) -> Result<usize, RawMessageError> {
    match data {
        [0x30, len, ..] if *len < 0x80 => Ok(2 + *len as usize),
        [0x30, 0x81, len, ..] => Ok(3 + *len as usize),
        [0x30, 0x82, hi, lo, ..] => Ok(4 + u16::from_be_bytes([*hi, *lo]) as usize),
        _ => Err(RawMessageError::InvalidCertificate),
    }
}

/// Decoded registration response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    pub public_key: Vec<u8>,
    pub key_handle: Vec<u8>,
    pub certificate: Vec<u8>,
    pub signature: Vec<u8>,
}

impl RegisterResponse {
    /// Split a registration response into its fields.
    ///
    /// The public key is assumed to be an uncompressed P-256 point and the
    /// certificate length is taken from its DER header.
    pub fn parse(body: &[u8]) -> Result<Self, RawMessageError> {
        let mut reader = Reader::new(body);

        let reserved = reader.byte("reserved")?;
        if reserved != REGISTER_RESERVED {
            return Err(RawMessageError::InvalidReserved(reserved));
        }

        let public_key = reader.take("public key", EC_POINT_SIZE)?;
        let key_handle_len = reader.byte("key handle length")? as usize;
        let key_handle = reader.take("key handle", key_handle_len)?;
        let certificate_len = der_sequence_len(reader.remaining())?;
        let certificate = reader.take("certificate", certificate_len)?;
        let signature = reader.rest();

        Ok(Self {
            public_key: public_key.to_vec(),
            key_handle: key_handle.to_vec(),
            certificate: certificate.to_vec(),
            signature: signature.to_vec(),
        })
    }

    /// Re-encode into the wire layout
    pub fn to_bytes(&self) -> Vec<u8> {
        registration_response(
            &self.public_key,
            &self.key_handle,
            &self.certificate,
            &self.signature,
        )
    }
}

/// Decoded authentication response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    pub user_presence: u8,
    pub counter: u32,
    pub signature: Vec<u8>,
}

impl AuthenticationResponse {
    pub fn parse(body: &[u8]) -> Result<Self, RawMessageError> {
        let mut reader = Reader::new(body);
        let user_presence = reader.byte("user presence")?;
        let counter = reader.take("counter", 4)?;
        let counter = u32::from_be_bytes([counter[0], counter[1], counter[2], counter[3]]);
        let signature = reader.rest().to_vec();

        Ok(Self {
            user_presence,
            counter,
            signature,
        })
    }

    pub fn user_present(&self) -> bool {
        self.user_presence & USER_PRESENT != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_certificate() -> Vec<u8> {
        let mut cert = vec![0x30, 0x81, 0x90];
        cert.extend(std::iter::repeat(0xaa).take(0x90));
        cert
    }

    #[test]
    fn test_registration_response_layout() {
        let data = registration_response(b"PUB", b"KH", b"CERT", b"SIG");
        let mut expected = vec![0x05];
        expected.extend_from_slice(b"PUB");
        expected.push(0x02);
        expected.extend_from_slice(b"KH");
        expected.extend_from_slice(b"CERT");
        expected.extend_from_slice(b"SIG");
        assert_eq!(data, expected);
    }

    #[test]
    fn test_registration_signed_data_layout() {
        let data = registration_signed_data(b"APP", b"CHAL", b"KH", b"PUB");
        assert_eq!(data, b"\x00APPCHALKHPUB".to_vec());
    }

    #[test]
    fn test_authentication_response_layout() {
        let data = authentication_response(true, 7, b"SIG");
        assert_eq!(data, vec![0x01, 0x00, 0x00, 0x00, 0x07, b'S', b'I', b'G']);

        let data = authentication_response(false, 0x0102_0304, b"");
        assert_eq!(data, vec![0x00, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_authentication_signed_data_layout() {
        let app = [0x11u8; 32];
        let challenge = [0x22u8; 32];
        let data = authentication_signed_data(&app, true, 0x0000_0100, &challenge);

        assert_eq!(data.len(), 32 + 1 + 4 + 32);
        assert_eq!(&data[..32], &app);
        assert_eq!(data[32], 0x01);
        assert_eq!(&data[33..37], &[0x00, 0x00, 0x01, 0x00]);
        assert_eq!(&data[37..], &challenge);
    }

    #[test]
    fn test_parse_register_response() {
        let public_key = [0x04u8; EC_POINT_SIZE];
        let key_handle = vec![0x55u8; 70];
        let certificate = fake_certificate();
        let signature = b"signature-bytes".to_vec();

        let body = registration_response(&public_key, &key_handle, &certificate, &signature);
        let parsed = RegisterResponse::parse(&body).unwrap();

        assert_eq!(parsed.public_key, public_key.to_vec());
        assert_eq!(parsed.key_handle, key_handle);
        assert_eq!(parsed.certificate, certificate);
        assert_eq!(parsed.signature, signature);
        assert_eq!(parsed.to_bytes(), body);
    }

    #[test]
    fn test_parse_register_response_long_form_certificate() {
        let mut certificate = vec![0x30, 0x82, 0x01, 0x00];
        certificate.extend(std::iter::repeat(0x01).take(0x100));

        let body = registration_response(&[0x04; EC_POINT_SIZE], b"KH", &certificate, b"SIG");
        let parsed = RegisterResponse::parse(&body).unwrap();
        assert_eq!(parsed.certificate.len(), 0x104);
        assert_eq!(parsed.signature, b"SIG".to_vec());
    }

    #[test]
    fn test_parse_register_response_errors() {
        let body = registration_response(&[0x04; EC_POINT_SIZE], b"KH", &fake_certificate(), b"");

        let mut bad_reserved = body.clone();
        bad_reserved[0] = 0x06;
        assert_eq!(
            RegisterResponse::parse(&bad_reserved).unwrap_err(),
            RawMessageError::InvalidReserved(0x06)
        );

        assert!(matches!(
            RegisterResponse::parse(&body[..40]).unwrap_err(),
            RawMessageError::Truncated { field: "public key", .. }
        ));

        let not_der = registration_response(&[0x04; EC_POINT_SIZE], b"KH", b"CERT", b"SIG");
        assert_eq!(
            RegisterResponse::parse(&not_der).unwrap_err(),
            RawMessageError::InvalidCertificate
        );
    }

    #[test]
    fn test_parse_authentication_response() {
        let body = authentication_response(true, 42, b"SIG");
        let parsed = AuthenticationResponse::parse(&body).unwrap();
        assert!(parsed.user_present());
        assert_eq!(parsed.counter, 42);
        assert_eq!(parsed.signature, b"SIG".to_vec());

        assert!(AuthenticationResponse::parse(&[0x01, 0x00]).is_err());
    }
}
