//! The HighLevel API client: OAuth token lifecycle, the shared
//! request/response pipeline, and typed resource methods.
//!
//! # Design
//! `HighLevelClient` owns the OAuth config, the current token, and a
//! transport. Every resource method funnels through `request`, and every
//! response (token exchanges excepted) goes through the single `classify`
//! routine — no method does its own status-code logic. The token endpoint
//! checks only for 200 and maps everything else to `Unauthorized`, which is
//! the observed contract of the service.

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use crate::transport::ReqwestTransport;
use crate::types::{ClientConfig, ResponseData, Token};

/// Base URL all relative API endpoints are appended to.
pub const BASE_URL: &str = "https://services.leadconnectorhq.com/";
/// OAuth consent page the user agent is redirected to.
pub const AUTH_URL: &str = "https://marketplace.leadconnectorhq.com/oauth/chooselocation";
/// OAuth token endpoint.
pub const TOKEN_URL: &str = "https://services.leadconnectorhq.com/oauth/token";

/// Blocking client for the HighLevel (LeadConnector) CRM API.
///
/// Holds exactly one piece of mutable state — the current token, written by
/// `get_access_token`, `refresh_access_token` and `set_token`, and read on
/// every request. Not synchronized; concurrent use from multiple threads
/// must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct HighLevelClient<T: HttpTransport = ReqwestTransport> {
    config: ClientConfig,
    token: Option<Token>,
    transport: T,
    base_url: String,
    auth_url: String,
    token_url: String,
}

impl HighLevelClient<ReqwestTransport> {
    /// Client against the production endpoints, using the default reqwest
    /// transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> HighLevelClient<T> {
    /// Client with a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            token: None,
            transport,
            base_url: BASE_URL.to_string(),
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Point the client at a different host (staging, local mock). The
    /// token endpoint follows the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base = base_url.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.token_url = format!("{base}oauth/token");
        self.base_url = base;
        self
    }

    /// The currently installed token, if any.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Install a caller-supplied token (e.g. restored from external
    /// storage), replacing any existing one. No validation beyond the
    /// `Token` type's own shape.
    pub fn set_token(&mut self, token: Token) {
        self.token = Some(token);
    }

    /// Build the OAuth consent URL the user agent should be redirected to.
    ///
    /// Pure function of the configuration: no side effects, no network
    /// call. `state` is the caller's CSRF token and is omitted from the
    /// query entirely when not supplied.
    pub fn authorization_url(&self, state: Option<&str>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("response_type", "code");
        if let Some(state) = state {
            query.append_pair("state", state);
        }
        format!("{}?{}", self.auth_url, query.finish())
    }

    /// Exchange an authorization code for a token pair and install it.
    pub fn get_access_token(&mut self, code: &str) -> Result<Token, ApiError> {
        let body = json!({
            "grant_type": "authorization_code",
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret,
            "redirect_uri": self.config.redirect_uri,
            "code": code,
        });
        self.token_exchange(&body)
    }

    /// Exchange a refresh token for a new token pair and install it.
    pub fn refresh_access_token(&mut self, refresh_token: &str) -> Result<Token, ApiError> {
        let body = json!({
            "grant_type": "refresh_token",
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret,
            "refresh_token": refresh_token,
        });
        self.token_exchange(&body)
    }

    /// POST to the token endpoint; on 200 the parsed token replaces the
    /// stored one wholesale. Any other status is an `Unauthorized` carrying
    /// the raw response body, and the stored token is left untouched.
    fn token_exchange(&mut self, body: &Value) -> Result<Token, ApiError> {
        let url = self.token_url.clone();
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: url.clone(),
            // Client credentials only; never signs with an existing token.
            headers: json_headers(),
            body: Some(RequestBody::Json(encode_payload(body)?)),
        };
        debug!(%url, "token exchange");
        let response = self.transport.execute(request)?;

        if response.status != 200 {
            warn!(status = response.status, "token exchange rejected");
            return Err(ApiError::Unauthorized(ResponseData::Text(response.body)));
        }
        let token: Token = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Generic request pipeline: URL = base + endpoint, derived headers,
    /// JSON-encoded payload when present, shared classification. Escape
    /// hatch for endpoints without a convenience method.
    pub fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> Result<ResponseData, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let body = match payload {
            Some(value) => Some(RequestBody::Json(encode_payload(value)?)),
            None => None,
        };
        let request = HttpRequest {
            method,
            url: url.clone(),
            headers: self.headers(),
            body,
        };
        debug!(%url, "api request");
        let response = self.transport.execute(request)?;
        classify(response)
    }

    /// GET `api/me` — the user the token belongs to.
    pub fn get_current_user(&self) -> Result<ResponseData, ApiError> {
        self.request(HttpMethod::Get, "api/me", None)
    }

    /// GET `api/connections`, with `?page=N` only when a non-zero page is
    /// supplied.
    pub fn list_connections(&self, page: Option<u32>) -> Result<ResponseData, ApiError> {
        let endpoint = match page.filter(|p| *p > 0) {
            Some(page) => format!("api/connections?page={page}"),
            None => "api/connections".to_string(),
        };
        self.request(HttpMethod::Get, &endpoint, None)
    }

    /// GET `api/contacts` with `payload` as the request body.
    ///
    /// TODO: wire `identifier` and `page` into the lookup once the upstream
    /// contact-filtering contract is settled; today the call ignores both,
    /// matching the service's observed behavior.
    pub fn get_contact(
        &self,
        payload: Option<&Value>,
        _identifier: &str,
        _page: Option<u32>,
    ) -> Result<ResponseData, ApiError> {
        self.request(HttpMethod::Get, "api/contacts", payload)
    }

    /// POST `api/contacts`.
    pub fn create_contact(&self, payload: &Value) -> Result<ResponseData, ApiError> {
        self.request(HttpMethod::Post, "api/contacts", Some(payload))
    }

    /// POST `api/opportunities`.
    pub fn create_opportunity(&self, payload: &Value) -> Result<ResponseData, ApiError> {
        self.request(HttpMethod::Post, "api/opportunities", Some(payload))
    }

    /// Fetch the contact, attach it under `payload["contact"]`, then POST
    /// `api/tasks`.
    pub fn create_task(
        &self,
        mut payload: Map<String, Value>,
        contact_identifier: &str,
    ) -> Result<ResponseData, ApiError> {
        let contact = self.get_contact(None, contact_identifier, None)?;
        payload.insert("contact".to_string(), contact.into_value());
        self.request(HttpMethod::Post, "api/tasks", Some(&Value::Object(payload)))
    }

    /// Attach `campaign_id` to the payload, then POST `api/campaigns`.
    pub fn add_contact_to_campaign(
        &self,
        mut payload: Map<String, Value>,
        campaign_id: u64,
    ) -> Result<ResponseData, ApiError> {
        payload.insert("campaign_id".to_string(), campaign_id.into());
        self.request(
            HttpMethod::Post,
            "api/campaigns",
            Some(&Value::Object(payload)),
        )
    }

    /// Multipart POST of a file to `medias/upload-file`.
    ///
    /// Bypasses the JSON pipeline: only the Authorization header is sent,
    /// and the body is a single `file` part carrying the file's bytes under
    /// its base filename. The file handle is scoped to the read and
    /// released on every exit path.
    pub fn upload_to_media_library(&self, file_path: &Path) -> Result<ResponseData, ApiError> {
        let content = std::fs::read(file_path)?;
        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "upload path has no file name",
                )
            })?
            .to_string();

        let mut headers = Vec::new();
        if let Some(token) = &self.token {
            headers.push(bearer_header(token));
        }
        let url = format!("{}medias/upload-file", self.base_url);
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: url.clone(),
            headers,
            body: Some(RequestBody::Multipart {
                field: "file".to_string(),
                file_name,
                content,
            }),
        };
        debug!(%url, "media upload");
        let response = self.transport.execute(request)?;
        classify(response)
    }

    /// Headers for the JSON pipeline: content negotiation plus, once a
    /// token is installed, the bearer Authorization header.
    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = json_headers();
        if let Some(token) = &self.token {
            headers.push(bearer_header(token));
        }
        headers
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ]
}

fn bearer_header(token: &Token) -> (String, String) {
    (
        "Authorization".to_string(),
        format!("Bearer {}", token.access_token),
    )
}

fn encode_payload(payload: &Value) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Map a raw response to a success value or a typed error.
///
/// Shared by every request-issuing operation. Statuses outside the table
/// pass their bodies through as success values — callers must not assume
/// all non-2xx responses fail.
pub fn classify(response: HttpResponse) -> Result<ResponseData, ApiError> {
    if response.status == 204 {
        return Ok(ResponseData::NoContent);
    }
    let data = parse_body(&response)?;
    match response.status {
        200 => Ok(data),
        400 => Err(ApiError::WrongFormatInput(data)),
        401 => Err(ApiError::Unauthorized(data)),
        500 => Err(ApiError::InternalServerError),
        _ => Ok(data),
    }
}

/// Parse the body per its declared content type: JSON when the server says
/// so, opaque text otherwise.
fn parse_body(response: &HttpResponse) -> Result<ResponseData, ApiError> {
    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        serde_json::from_str(&response.body)
            .map(ResponseData::Json)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    } else {
        Ok(ResponseData::Text(response.body.clone()))
    }
}
