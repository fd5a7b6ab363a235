//! Domain types shared by the client surface.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OAuth application credentials, supplied once at construction and
/// immutable for the client's lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
}

/// Token pair returned by the OAuth token endpoint.
///
/// `access_token` is required — a token without one cannot be constructed,
/// so bearer-header derivation never has a malformed token to deal with.
/// Fields beyond the two the client reads (`expires_in`, `token_type`, ...)
/// are kept in `extra` so the full server response survives a round-trip
/// through external storage and `set_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Classified success value of an API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    /// Body parsed as JSON (content type was `application/json`).
    Json(Value),
    /// Body returned verbatim (any other content type).
    Text(String),
    /// The server answered 204.
    NoContent,
}

impl ResponseData {
    /// Borrow the parsed JSON value, if this is a JSON response.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Convert into a JSON value: text becomes a JSON string, no-content
    /// becomes null.
    pub fn into_value(self) -> Value {
        match self {
            ResponseData::Json(value) => value,
            ResponseData::Text(text) => Value::String(text),
            ResponseData::NoContent => Value::Null,
        }
    }
}

impl fmt::Display for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseData::Json(value) => write!(f, "{value}"),
            ResponseData::Text(text) => write!(f, "{text}"),
            ResponseData::NoContent => Ok(()),
        }
    }
}
