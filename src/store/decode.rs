//! Typed decoding of result tokens returned by a [`Plan`](super::Plan).
//!
//! Absence is not an error here: callers that get no token fall back to a
//! zero value. These functions only fail on tokens that are present but
//! malformed.

use crate::error::{Error, Result};
use crate::types::{EntityRef, Kind};

pub fn decode_int(token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|_| Error::MalformedValue(token.to_string()))
}

pub fn decode_string(token: &str) -> String {
    token.to_string()
}

pub fn decode_bool(token: &str) -> Result<bool> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::MalformedValue(token.to_string())),
    }
}

/// Decodes a `<kind>:<id>` token, rejecting any kind other than `expected`.
pub fn decode_ref(token: &str, expected: Kind) -> Result<EntityRef> {
    EntityRef::parse_as(token, expected)
}

pub fn decode_id(token: &str, expected: Kind) -> Result<i64> {
    decode_ref(token, expected).map(|r| r.id)
}
