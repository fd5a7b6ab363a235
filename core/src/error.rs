//! Error types for the HighLevel API client.
//!
//! # Design
//! One variant per condition callers distinguish: 401 and failed token
//! exchanges land in `Unauthorized`, 400 in `WrongFormatInput`, 500 in
//! `InternalServerError`. Transport and file I/O failures wrap the lower
//! layer and propagate untranslated. Statuses outside this table never
//! produce an error — the classifier passes their bodies through as
//! success values.

use thiserror::Error;

use crate::http::TransportError;
use crate::types::ResponseData;

/// Errors returned by `HighLevelClient` operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server returned 401, or the token endpoint rejected an
    /// authorization-code or refresh-token exchange. Carries the response
    /// body as detail.
    #[error("unauthorized: {0}")]
    Unauthorized(ResponseData),

    /// The server returned 400 — the request payload was malformed.
    /// Carries the response body as detail.
    #[error("wrong format input: {0}")]
    WrongFormatInput(ResponseData),

    /// The server returned 500. No structured detail is available.
    #[error("internal server error")]
    InternalServerError,

    /// Connection-level failure from the HTTP layer, propagated as-is.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A response body declared as JSON could not be parsed.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The upload file could not be read, propagated as-is.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
