//! End-to-end tests of the HTTP surface
//!
//! Each test builds the full router over a fresh SQLite file and drives it
//! with `oneshot` requests.

use api::{create_router, reporter::PerformanceReporter, AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use database::Database;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("routes.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        db.migrate().await.unwrap();

        let state = AppState::new(Arc::new(db), PerformanceReporter::disabled());
        Self {
            _dir: dir,
            router: create_router(state),
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Register `handle` and return its token
    async fn register(&self, handle: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({
                    "username": format!("{} user", handle),
                    "profile_id": handle,
                    "email": format!("{}@example.com", handle),
                    "password": "correct horse",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Create a server as `token` and return its JSON
    async fn create_server(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/servers/create",
                Some(token),
                Some(json!({"name": name})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "server create failed: {body}");
        body
    }
}

fn error_name(body: &Value) -> &str {
    body["error"]["name"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn register_then_read_own_profile() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let (status, body) = app.call(Method::GET, "/api/v1/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile_id"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["online"], true);
}

#[tokio::test]
async fn validation_failure_reports_one_normalized_error() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/register",
            None,
            Some(json!({
                "profile_id": "alice",
                "email": "alice@example.com",
                "password": "correct horse",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["name"], "REQUIRED");
    assert_eq!(body["error"]["code"], 3);
    assert_eq!(body["error"]["message"], "username is required.");
    assert_eq!(body["error"]["extras"]["for"], "username");
}

#[tokio::test]
async fn missing_body_is_validated_as_empty() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::POST, "/api/v1/login", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "REQUIRED");
    assert_eq!(body["error"]["extras"]["for"], "email");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/register",
            None,
            Some(json!({
                "username": "another",
                "profile_id": "another",
                "email": "ALICE@example.com",
                "password": "correct horse",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_name(&body), "EMAIL_TAKEN");
}

#[tokio::test]
async fn login_checks_password() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "wrong password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_name(&body), "INVALID_CREDENTIALS");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "correct horse"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], token.as_str());
}

#[tokio::test]
async fn session_routes_require_a_token() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/v1/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_name(&body), "LOGGED_OUT");

    let (status, body) = app
        .call(Method::GET, "/api/v1/me", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_name(&body), "LOGGED_OUT");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let (status, _) = app
        .call(Method::POST, "/api/v1/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::GET, "/api/v1/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn friend_request_flow() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bobby").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/friends/add",
            Some(&alice),
            Some(json!({"profile_id": "bobby"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/friends/add",
            Some(&alice),
            Some(json!({"profile_id": "bobby"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_name(&body), "FRIEND_ALREADY_PENDING");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/friends/accept",
            Some(&bob),
            Some(json!({"profile_id": "alice"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.call(Method::GET, "/api/v1/friends", Some(&alice), None).await;
    assert_eq!(body["friends"][0]["profile_id"], "bobby");
    assert!(body["friends"][0].get("email").is_none());
}

#[tokio::test]
async fn servers_enforce_membership_and_ownership() {
    let app = TestApp::new().await;
    let owner = app.register("owner").await;
    let guest = app.register("guest").await;
    let server = app.create_server(&owner, "Guild").await;
    let server_id = server["id"].as_str().unwrap();

    // Not a member yet
    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/v1/servers/{}/channels", server_id),
            Some(&guest),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "NOT_IN_SERVER");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/servers/join",
            Some(&guest),
            Some(json!({"invite": server["invite"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/servers/join",
            Some(&guest),
            Some(json!({"invite": server["invite"]})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_name(&body), "ALREADY_IN_SERVER");

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/servers/{}/edit", server_id),
            Some(&guest),
            Some(json!({"name": "Taken"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_name(&body), "NOT_OWNER");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/servers/unknown-server/edit",
            Some(&owner),
            Some(json!({"name": "Taken"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_name(&body), "SERVER_404");

    let (_, body) = app
        .call(
            Method::GET,
            &format!("/api/v1/servers/{}/members", server_id),
            Some(&guest),
            None,
        )
        .await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn disabled_invites_cannot_be_used() {
    let app = TestApp::new().await;
    let owner = app.register("owner").await;
    let guest = app.register("guest").await;
    let server = app.create_server(&owner, "Guild").await;
    let server_id = server["id"].as_str().unwrap();

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/v1/servers/{}/invite/toggle", server_id),
            Some(&owner),
            Some(json!({"enabled": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/servers/join",
            Some(&guest),
            Some(json!({"invite": server["invite"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "INVALID_INVITE");
}

#[tokio::test]
async fn message_history_windows() {
    let app = TestApp::new().await;
    let owner = app.register("owner").await;
    let server = app.create_server(&owner, "Guild").await;
    let server_id = server["id"].as_str().unwrap();

    let (status, channel) = app
        .call(
            Method::POST,
            &format!("/api/v1/servers/{}/channels/create", server_id),
            Some(&owner),
            Some(json!({"name": "general"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let messages_uri = format!(
        "/api/v1/servers/{}/channels/{}/messages",
        server_id,
        channel["id"].as_str().unwrap()
    );

    for content in ["first", "second", "third"] {
        let (status, _) = app
            .call(
                Method::POST,
                &messages_uri,
                Some(&owner),
                Some(json!({"content": content})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .call(
            Method::POST,
            &messages_uri,
            Some(&owner),
            Some(json!({"content": "   "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "REQUIRED");

    let (status, body) = app
        .call(
            Method::GET,
            &format!("{}?from=0&to=2", messages_uri),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][0]["content"], "second");
    assert_eq!(body["messages"][1]["content"], "third");
    assert_eq!(body["authors"][0]["profile_id"], "owner");

    let (status, body) = app
        .call(
            Method::GET,
            &format!("{}?from=5&to=2", messages_uri),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "INVALID_RANGE");

    let (status, body) = app
        .call(
            Method::GET,
            &format!("{}?from=zero&to=2", messages_uri),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "INVALID");

    let (status, body) = app
        .call(
            Method::GET,
            &format!("{}?from=0&to=101", messages_uri),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "TOO_MUCH");
    assert_eq!(body["error"]["message"], "Can't fetch more than 100 items at once.");
}

#[tokio::test]
async fn empty_reply_id_sends_a_plain_message() {
    let app = TestApp::new().await;
    let owner = app.register("owner").await;
    let server = app.create_server(&owner, "Guild").await;
    let server_id = server["id"].as_str().unwrap();

    let (_, channel) = app
        .call(
            Method::POST,
            &format!("/api/v1/servers/{}/channels/create", server_id),
            Some(&owner),
            Some(json!({"name": "general"})),
        )
        .await;
    let messages_uri = format!(
        "/api/v1/servers/{}/channels/{}/messages",
        server_id,
        channel["id"].as_str().unwrap()
    );

    let (status, message) = app
        .call(
            Method::POST,
            &messages_uri,
            Some(&owner),
            Some(json!({"content": "hi", "reply_id": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "send failed: {message}");
    assert_eq!(message["content"], "hi");
    assert!(message["reply_id"].is_null());

    let (status, body) = app
        .call(
            Method::POST,
            &messages_uri,
            Some(&owner),
            Some(json!({"content": "hi", "reply_id": "missing"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_name(&body), "MESSAGE_404");
}

#[tokio::test]
async fn history_query_errors_follow_field_order() {
    let app = TestApp::new().await;
    let owner = app.register("owner").await;
    let server = app.create_server(&owner, "Guild").await;
    let server_id = server["id"].as_str().unwrap();

    let (_, channel) = app
        .call(
            Method::POST,
            &format!("/api/v1/servers/{}/channels/create", server_id),
            Some(&owner),
            Some(json!({"name": "general"})),
        )
        .await;
    let messages_uri = format!(
        "/api/v1/servers/{}/channels/{}/messages",
        server_id,
        channel["id"].as_str().unwrap()
    );

    for _ in 0..10 {
        let (status, body) = app
            .call(
                Method::GET,
                &format!("{}?to=y&from=x", messages_uri),
                Some(&owner),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_name(&body), "INVALID");
        assert_eq!(body["error"]["extras"]["for"], "from");
    }

    let (status, body) = app
        .call(
            Method::GET,
            &format!("{}?from=0&to=2&foo=bar", messages_uri),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "unexpected error: {body}");
    assert_eq!(body["messages"], json!([]));
}

#[tokio::test]
async fn mistyped_input_is_a_bad_request() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/me/status",
            Some(&token),
            Some(json!({"status": u64::MAX})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "UNKNOWN");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/me/status",
            Some(&token),
            Some(json!({"status": "busy"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "UNKNOWN");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/me/status",
            Some(&token),
            Some(json!({"status": 9})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "INVALID");
    assert_eq!(body["error"]["extras"]["for"], "status");
}

#[tokio::test]
async fn roles_default_to_black() {
    let app = TestApp::new().await;
    let owner = app.register("owner").await;
    let server = app.create_server(&owner, "Guild").await;
    let server_id = server["id"].as_str().unwrap();

    let (status, role) = app
        .call(
            Method::POST,
            &format!("/api/v1/servers/{}/roles/create", server_id),
            Some(&owner),
            Some(json!({"name": "mods"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(role["color"], "#000000");

    let (status, body) = app
        .call(
            Method::POST,
            &format!(
                "/api/v1/servers/{}/roles/{}/assign",
                server_id,
                role["id"].as_str().unwrap()
            ),
            Some(&owner),
            Some(json!({"members": ["not-a-member"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_name(&body), "NOT_IN_SERVER");
}

#[tokio::test]
async fn health_reports_version_header() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-parley-version").unwrap(),
        env!("CARGO_PKG_VERSION")
    );
}
