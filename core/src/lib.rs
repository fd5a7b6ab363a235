//! Blocking client for the HighLevel (LeadConnector) CRM API.
//!
//! # Overview
//! Wraps the REST API behind typed method calls: OAuth2 authorization-code
//! and refresh-token flows, bearer-token request signing, and centralized
//! response-to-error translation. One client value, one in-memory token,
//! no background work.
//!
//! # Design
//! - `HighLevelClient` owns the OAuth config, the current token, and a
//!   transport; every operation blocks until the HTTP exchange completes.
//! - HTTP I/O sits behind the `HttpTransport` trait so the core logic is
//!   deterministic and testable; `ReqwestTransport` is the default.
//! - All status interpretation happens in one `classify` routine: 400/401/
//!   500 become typed errors, everything else passes through as data.
//! - The token is plain mutable state with no internal locking; concurrent
//!   use of one client must be serialized by the caller.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{HighLevelClient, AUTH_URL, BASE_URL, TOKEN_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError};
pub use transport::ReqwestTransport;
pub use types::{ClientConfig, ResponseData, Token};
