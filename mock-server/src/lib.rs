//! In-memory mock of the HighLevel API surface the client touches: the
//! OAuth token endpoint, bearer-guarded CRM resources, and the multipart
//! media upload. Used by the core crate's integration tests and runnable
//! standalone via `main.rs`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The one authorization code the token endpoint accepts.
pub const AUTH_CODE: &str = "test-auth-code";
/// Access token issued for the authorization-code grant.
pub const ACCESS_TOKEN: &str = "test-access-token";
/// Refresh token issued alongside every access token.
pub const REFRESH_TOKEN: &str = "test-refresh-token";
/// Access token issued for the refresh-token grant.
pub const REFRESHED_ACCESS_TOKEN: &str = "test-access-token-2";

#[derive(Clone, Default)]
pub struct AppState {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    /// Access tokens currently accepted by the bearer guard.
    tokens: HashSet<String>,
    contacts: Vec<Value>,
}

type ApiError = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let state = AppState::default();
    Router::new()
        .route("/oauth/token", post(token))
        .route("/api/me", get(me))
        .route("/api/connections", get(connections))
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route("/api/contacts/{id}", delete(delete_contact))
        .route("/api/opportunities", post(create_opportunity))
        .route("/api/tasks", post(create_task))
        .route("/api/campaigns", post(add_to_campaign))
        .route("/medias/upload-file", post(upload_file))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn unauthorized() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "unauthorized"})),
    )
}

/// Reject requests without a bearer token the token endpoint has issued.
async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match bearer {
        Some(token) if state.inner.read().await.tokens.contains(token) => Ok(()),
        _ => Err(unauthorized()),
    }
}

/// Parse a JSON object out of a request body.
fn json_object(body: &str) -> Result<serde_json::Map<String, Value>, ApiError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(bad_request("payload must be a JSON object")),
    }
}

async fn token(State(state): State<AppState>, Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let issued = match body["grant_type"].as_str() {
        Some("authorization_code") if body["code"] == json!(AUTH_CODE) => ACCESS_TOKEN,
        Some("refresh_token") if body["refresh_token"] == json!(REFRESH_TOKEN) => {
            REFRESHED_ACCESS_TOKEN
        }
        _ => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid_grant"})),
            ))
        }
    };
    state.inner.write().await.tokens.insert(issued.to_string());
    Ok(Json(json!({
        "access_token": issued,
        "refresh_token": REFRESH_TOKEN,
        "expires_in": 3600,
        "token_type": "Bearer",
    })))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    Ok(Json(json!({
        "id": "user-1",
        "email": "owner@example.com",
        "name": "Agency Owner",
    })))
}

async fn connections(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    Ok(Json(json!({
        "connections": [{"id": "conn-1", "type": "facebook"}],
        "page": params.get("page"),
    })))
}

async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    // The client may send a JSON filter body or nothing at all.
    let filter: Option<Value> = serde_json::from_str(&body).ok();
    let contacts = state.inner.read().await.contacts.clone();
    Ok(Json(json!({ "contacts": contacts, "filter": filter })))
}

async fn create_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    authorize(&state, &headers).await?;
    let mut contact = json_object(&body)?;
    if !contact.get("email").is_some_and(Value::is_string) {
        return Err(bad_request("email is required"));
    }
    contact.insert("id".to_string(), json!(Uuid::new_v4()));
    let contact = Value::Object(contact);
    state.inner.write().await.contacts.push(contact.clone());
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn delete_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers).await?;
    let mut inner = state.inner.write().await;
    let before = inner.contacts.len();
    inner.contacts.retain(|c| c["id"] != json!(id));
    if inner.contacts.len() == before {
        return Err((StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn create_opportunity(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    let mut opportunity = json_object(&body)?;
    if !opportunity.contains_key("title") {
        return Err(bad_request("title is required"));
    }
    opportunity.insert("id".to_string(), json!(Uuid::new_v4()));
    Ok(Json(Value::Object(opportunity)))
}

async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    let mut task = json_object(&body)?;
    task.insert("id".to_string(), json!(Uuid::new_v4()));
    task.insert("status".to_string(), json!("open"));
    Ok(Json(Value::Object(task)))
}

async fn add_to_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    let mut membership = json_object(&body)?;
    if !membership.contains_key("campaign_id") {
        return Err(bad_request("campaign_id is required"));
    }
    membership.insert("status".to_string(), json!("added"));
    Ok(Json(Value::Object(membership)))
}

async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("malformed multipart body"))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("unnamed").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| bad_request("unreadable file part"))?;
            return Ok(Json(json!({
                "name": file_name,
                "size": data.len(),
                "url": format!("https://cdn.example.com/medias/{file_name}"),
            })));
        }
    }
    Err(bad_request("file field is required"))
}
