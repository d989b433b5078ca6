//! Chrome U2F helper protocol messages
//!
//! Requests arrive as JSON objects discriminated by `type`. Binary values are
//! web-safe base64 strings. Replies carry the numeric device status in `code`.

use crate::error::{Error, Result};
use crate::json::{self, Object};
use crate::websafe;

use serde::{Serialize, Serializer};
use softu2f_apdu::StatusCode;

/// JSON parameter names
mod params {
    pub const TYPE: &str = "type";
    pub const VERSION: &str = "version";

    pub const ENROLL_CHALLENGES: &str = "enrollChallenges";
    pub const SIGN_DATA: &str = "signData";

    pub const APP_ID_HASH: &str = "appIdHash";
    pub const CHALLENGE_HASH: &str = "challengeHash";
    pub const KEY_HANDLE: &str = "keyHandle";
}

pub const ENROLL_HELPER_REQUEST: &str = "enroll_helper_request";
pub const ENROLL_HELPER_REPLY: &str = "enroll_helper_reply";
pub const SIGN_HELPER_REQUEST: &str = "sign_helper_request";
pub const SIGN_HELPER_REPLY: &str = "sign_helper_reply";

/// One requested registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollChallenge {
    pub version: String,
    pub challenge_parameter: Vec<u8>,
    pub application_parameter: Vec<u8>,
}

impl EnrollChallenge {
    pub fn from_json(object: &Object) -> Result<Self> {
        Ok(Self {
            version: json::string(object, params::VERSION)?.to_string(),
            challenge_parameter: json::web_safe_base64(object, params::CHALLENGE_HASH)?,
            application_parameter: json::web_safe_base64(object, params::APP_ID_HASH)?,
        })
    }
}

/// One existing credential that may be used to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignChallenge {
    pub version: String,
    pub challenge_parameter: Vec<u8>,
    pub application_parameter: Vec<u8>,
    pub key_handle: Vec<u8>,
}

impl SignChallenge {
    pub fn from_json(object: &Object) -> Result<Self> {
        Ok(Self {
            version: json::string(object, params::VERSION)?.to_string(),
            challenge_parameter: json::web_safe_base64(object, params::CHALLENGE_HASH)?,
            application_parameter: json::web_safe_base64(object, params::APP_ID_HASH)?,
            key_handle: json::web_safe_base64(object, params::KEY_HANDLE)?,
        })
    }
}

fn expect_type(object: &Object, expected: &str) -> Result<()> {
    let found = json::string(object, params::TYPE)?;
    if found != expected {
        return Err(Error::UnknownRequestType(found.to_string()));
    }
    Ok(())
}

fn sign_challenges(object: &Object) -> Result<Vec<SignChallenge>> {
    json::array(object, params::SIGN_DATA)?
        .into_iter()
        .map(SignChallenge::from_json)
        .collect()
}

/// An `enroll_helper_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollHelperRequest {
    pub enroll_challenges: Vec<EnrollChallenge>,
    /// Credentials the relying party already knows about
    pub sign_challenges: Vec<SignChallenge>,
}

impl EnrollHelperRequest {
    pub fn from_json(object: &Object) -> Result<Self> {
        expect_type(object, ENROLL_HELPER_REQUEST)?;
        let enroll_challenges = json::array(object, params::ENROLL_CHALLENGES)?
            .into_iter()
            .map(EnrollChallenge::from_json)
            .collect::<Result<_>>()?;

        Ok(Self {
            enroll_challenges,
            sign_challenges: sign_challenges(object)?,
        })
    }
}

/// A `sign_helper_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignHelperRequest {
    pub sign_challenges: Vec<SignChallenge>,
}

impl SignHelperRequest {
    pub fn from_json(object: &Object) -> Result<Self> {
        expect_type(object, SIGN_HELPER_REQUEST)?;
        Ok(Self {
            sign_challenges: sign_challenges(object)?,
        })
    }
}

/// Any request the helper accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Enroll(EnrollHelperRequest),
    Sign(SignHelperRequest),
}

impl Request {
    /// Dispatch on the `type` field
    pub fn from_json(object: &Object) -> Result<Self> {
        match json::string(object, params::TYPE)? {
            ENROLL_HELPER_REQUEST => Ok(Request::Enroll(EnrollHelperRequest::from_json(object)?)),
            SIGN_HELPER_REQUEST => Ok(Request::Sign(SignHelperRequest::from_json(object)?)),
            other => Err(Error::UnknownRequestType(other.to_string())),
        }
    }
}

/// An `enroll_helper_reply`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollHelperReply {
    /// Registration succeeded; `data` is a raw registration response
    Registered { version: String, data: Vec<u8> },
    /// The key store reported a protocol-level failure
    Failed { status: StatusCode, error: String },
}

impl EnrollHelperReply {
    pub fn status(&self) -> StatusCode {
        match self {
            EnrollHelperReply::Registered { .. } => StatusCode::Ok,
            EnrollHelperReply::Failed { status, .. } => *status,
        }
    }
}

/// A `sign_helper_reply`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignHelperReply {
    /// Signing succeeded; `data` is a raw authentication response
    Signed {
        challenge: SignChallenge,
        data: Vec<u8>,
    },
    /// The key store reported a protocol-level failure
    Failed { status: StatusCode, error: String },
}

impl SignHelperReply {
    pub fn status(&self) -> StatusCode {
        match self {
            SignHelperReply::Signed { .. } => StatusCode::Ok,
            SignHelperReply::Failed { status, .. } => *status,
        }
    }
}

/// Any reply the helper sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Enroll(EnrollHelperReply),
    Sign(SignHelperReply),
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Enroll(reply) => reply.status(),
            Reply::Sign(reply) => reply.status(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollReplyWire<'a> {
    #[serde(rename = "type")]
    typ: &'static str,
    code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    enroll_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignReplyWire<'a> {
    #[serde(rename = "type")]
    typ: &'static str,
    code: i32,
    error_detail: Option<&'a str>,
    response_data: Option<ResponseDataWire<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseDataWire<'a> {
    version: &'a str,
    app_id_hash: String,
    challenge_hash: String,
    key_handle: String,
    signature_data: String,
}

impl Serialize for EnrollHelperReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let wire = match self {
            EnrollHelperReply::Registered { version, data } => EnrollReplyWire {
                typ: ENROLL_HELPER_REPLY,
                code: StatusCode::Ok.into(),
                version: Some(version),
                enroll_data: Some(websafe::encode(data)),
                error_detail: None,
            },
            EnrollHelperReply::Failed { status, error } => EnrollReplyWire {
                typ: ENROLL_HELPER_REPLY,
                code: (*status).into(),
                version: None,
                enroll_data: None,
                error_detail: Some(error),
            },
        };
        wire.serialize(serializer)
    }
}

impl Serialize for SignHelperReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let wire = match self {
            SignHelperReply::Signed { challenge, data } => SignReplyWire {
                typ: SIGN_HELPER_REPLY,
                code: StatusCode::Ok.into(),
                error_detail: None,
                response_data: Some(ResponseDataWire {
                    version: &challenge.version,
                    app_id_hash: websafe::encode(&challenge.application_parameter),
                    challenge_hash: websafe::encode(&challenge.challenge_parameter),
                    key_handle: websafe::encode(&challenge.key_handle),
                    signature_data: websafe::encode(data),
                }),
            },
            SignHelperReply::Failed { status, error } => SignReplyWire {
                typ: SIGN_HELPER_REPLY,
                code: (*status).into(),
                error_detail: Some(error),
                response_data: None,
            },
        };
        wire.serialize(serializer)
    }
}

impl Serialize for Reply {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Reply::Enroll(reply) => reply.serialize(serializer),
            Reply::Sign(reply) => reply.serialize(serializer),
        }
    }
}
