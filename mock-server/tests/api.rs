use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ACCESS_TOKEN, AUTH_CODE, REFRESHED_ACCESS_TOKEN, REFRESH_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(body.to_string())
        .unwrap()
}

/// Run the authorization-code grant so later requests can authenticate.
async fn issue_token(app: &axum::Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/oauth/token",
            &json!({"grant_type": "authorization_code", "code": AUTH_CODE}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["access_token"].as_str().unwrap().to_string()
}

// --- token endpoint ---

#[tokio::test]
async fn token_exchange_issues_access_and_refresh_tokens() {
    let app = app();
    let token = issue_token(&app).await;
    assert_eq!(token, ACCESS_TOKEN);
}

#[tokio::test]
async fn token_exchange_rejects_unknown_code() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/oauth/token",
            &json!({"grant_type": "authorization_code", "code": "wrong"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "invalid_grant");
}

#[tokio::test]
async fn refresh_grant_rotates_the_access_token() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/oauth/token",
            &json!({"grant_type": "refresh_token", "refresh_token": REFRESH_TOKEN}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["access_token"], REFRESHED_ACCESS_TOKEN);
}

// --- bearer guard ---

#[tokio::test]
async fn resource_routes_require_a_bearer_token() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_answers_with_an_issued_bearer() {
    let app = app();
    let token = issue_token(&app).await;
    let resp = app
        .oneshot(authed_request("GET", "/api/me", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["id"], "user-1");
}

// --- contacts ---

#[tokio::test]
async fn create_contact_requires_an_email() {
    let app = app();
    let token = issue_token(&app).await;
    let resp = app
        .oneshot(authed_request(
            "POST",
            "/api/contacts",
            &token,
            r#"{"first_name":"Jane"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "email is required");
}

#[tokio::test]
async fn created_contacts_show_up_in_the_listing() {
    let app = app();
    let token = issue_token(&app).await;

    let resp = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/contacts",
            &token,
            r#"{"email":"jane@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert!(created["id"].is_string());

    let resp = app
        .oneshot(authed_request("GET", "/api/contacts", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listing = body_json(resp).await;
    assert_eq!(listing["contacts"].as_array().unwrap().len(), 1);
    assert_eq!(listing["contacts"][0]["email"], "jane@example.com");
}

#[tokio::test]
async fn delete_contact_answers_204_then_404() {
    let app = app();
    let token = issue_token(&app).await;

    let resp = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/contacts",
            &token,
            r#"{"email":"jane@example.com"}"#,
        ))
        .await
        .unwrap();
    let id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/contacts/{id}"),
            &token,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/contacts/{id}"),
            &token,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- connections ---

#[tokio::test]
async fn connections_echo_the_page_parameter() {
    let app = app();
    let token = issue_token(&app).await;
    let resp = app
        .oneshot(authed_request("GET", "/api/connections?page=3", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["page"], "3");
}

// --- campaigns ---

#[tokio::test]
async fn campaign_membership_requires_a_campaign_id() {
    let app = app();
    let token = issue_token(&app).await;
    let resp = app
        .oneshot(authed_request(
            "POST",
            "/api/campaigns",
            &token,
            r#"{"contact_id":"c1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- media upload ---

#[tokio::test]
async fn upload_accepts_a_multipart_file() {
    let app = app();
    let token = issue_token(&app).await;

    let boundary = "X-TEST-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         fake-png-bytes\r\n\
         --{boundary}--\r\n"
    );
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/medias/upload-file")
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let uploaded = body_json(resp).await;
    assert_eq!(uploaded["name"], "logo.png");
    assert_eq!(uploaded["size"], 14);
}
