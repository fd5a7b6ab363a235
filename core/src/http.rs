//! HTTP transport types and the transport trait.
//!
//! # Design
//! Requests and responses are plain data with owned fields, so the client
//! core stays deterministic: it builds `HttpRequest` values, hands them to
//! an `HttpTransport` implementation, and interprets the `HttpResponse` it
//! gets back. Unit tests swap in a recording fake; production code uses the
//! reqwest-backed transport in `transport.rs`.

use thiserror::Error;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Body of an outgoing request.
///
/// The media upload endpoint takes multipart form data instead of JSON, so
/// the body carries its own shape rather than assuming a JSON string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// JSON-encoded payload, sent verbatim.
    Json(String),
    /// A single file part for a multipart/form-data request.
    Multipart {
        field: String,
        file_name: String,
        content: Vec<u8>,
    },
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Value of the `Content-Type` header, matched case-insensitively.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}

/// Failure in the transport layer itself (connection refused, timeout,
/// unreadable body). Distinct from API-level errors: the client propagates
/// these untranslated.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("http transport error: {0}")]
    Http(String),
}

/// Executes an `HttpRequest` and returns the raw `HttpResponse`.
///
/// Implementations must return non-2xx statuses as data, never as an
/// `Err` — status interpretation belongs to the client's classifier.
pub trait HttpTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
