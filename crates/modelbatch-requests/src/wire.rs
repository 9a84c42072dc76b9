//! Batch payloads and the single-string transport encoding.
//!
//! The transport carries the request list as one opaque parameter next
//! to the token and intention: the list is rendered as JSON text, then
//! percent-encoded with the URI-component character set, so any standard
//! percent-decoder recovers the JSON exactly.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};
use crate::request::RequestPayload;
use crate::request_set::Intention;

/// Parameter name the encoded request list travels under.
pub const REQUESTS_PARAM: &str = "requests";

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped; a space
/// becomes `%20`, never `+`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `{token, intention, requests}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPayload {
    pub token: Option<String>,
    pub intention: Intention,
    pub requests: Vec<RequestPayload>,
}

/// [`BatchPayload`] with `requests` collapsed into one encoded string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallablePayload {
    pub token: Option<String>,
    pub intention: Intention,
    pub requests: String,
}

impl BatchPayload {
    pub fn into_callable(self) -> Result<CallablePayload> {
        let requests = encode_requests(&self.requests)?;
        Ok(CallablePayload {
            token: self.token,
            intention: self.intention,
            requests,
        })
    }
}

impl CallablePayload {
    /// Decode the carried request list.
    pub fn decode(&self) -> Result<Vec<RequestPayload>> {
        decode_requests(&self.requests)
    }
}

pub fn encode_requests(requests: &[RequestPayload]) -> Result<String> {
    let text = serde_json::to_string(requests)?;
    Ok(utf8_percent_encode(&text, URI_COMPONENT).to_string())
}

pub fn decode_requests(blob: &str) -> Result<Vec<RequestPayload>> {
    let text = percent_decode_str(blob)
        .decode_utf8()
        .map_err(|e| BatchError::InvalidArgument(format!("request blob is not UTF-8: {}", e)))?;
    Ok(serde_json::from_str(&text)?)
}
