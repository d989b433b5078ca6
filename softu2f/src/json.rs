//! Typed field access on JSON objects
//!
//! Every lookup names the field it failed on so a bad request can be reported
//! precisely.

use crate::error::{Error, Result};
use crate::websafe;

use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

fn field<'a>(object: &'a Object, key: &str) -> Result<&'a Value> {
    object
        .get(key)
        .ok_or_else(|| Error::FieldMissing(key.to_string()))
}

fn mismatch(key: &str, expected: &'static str) -> Error {
    Error::FieldTypeMismatch {
        field: key.to_string(),
        expected,
    }
}

pub fn string<'a>(object: &'a Object, key: &str) -> Result<&'a str> {
    field(object, key)?
        .as_str()
        .ok_or_else(|| mismatch(key, "string"))
}

pub fn int(object: &Object, key: &str) -> Result<i64> {
    field(object, key)?
        .as_i64()
        .ok_or_else(|| mismatch(key, "integer"))
}

/// A web-safe base64 string field, decoded
pub fn web_safe_base64(object: &Object, key: &str) -> Result<Vec<u8>> {
    websafe::decode(string(object, key)?).map_err(|_| Error::InvalidBase64 {
        field: key.to_string(),
    })
}

/// An array field whose elements are all objects
pub fn array<'a>(object: &'a Object, key: &str) -> Result<Vec<&'a Object>> {
    field(object, key)?
        .as_array()
        .ok_or_else(|| mismatch(key, "array of objects"))?
        .iter()
        .map(|item| item.as_object().ok_or_else(|| mismatch(key, "array of objects")))
        .collect()
}
