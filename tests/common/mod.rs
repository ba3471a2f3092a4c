//! Shared fixtures: an in-process mock of the pantry backend and unsigned token minting.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};

use pantry_client::identity::claims::{CLAIM_EMAIL, CLAIM_ID, CLAIM_NAME, CLAIM_ROLE};
use pantry_client::TokenPair;

pub const GOOD_PASSWORD: &str = "correct horse";
pub const REFRESHED_REFRESH_TOKEN: &str = "refresh-2";

#[derive(Default)]
pub struct MockState {
    pub refresh_calls: AtomicUsize,
    pub refresh_fails: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub requests: AtomicUsize,
    pub last_auth: Mutex<Option<String>>,
    pub last_query: Mutex<Option<String>>,
    pub last_refresh_body: Mutex<Option<TokenPair>>,
}

impl MockState {
    pub fn refresh_calls(&self) -> usize { self.refresh_calls.load(Ordering::SeqCst) }
    pub fn requests(&self) -> usize { self.requests.load(Ordering::SeqCst) }
    pub fn last_auth(&self) -> Option<String> { self.last_auth.lock().clone() }
    pub fn fail_refresh(&self) { self.refresh_fails.store(true, Ordering::SeqCst); }
    pub fn slow_refresh(&self, ms: u64) { self.refresh_delay_ms.store(ms, Ordering::SeqCst); }
}

pub struct MockBackend {
    pub base: String,
    pub state: Arc<MockState>,
}

fn record(state: &MockState, headers: &HeaderMap) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(|s| s.to_string());
    *state.last_auth.lock() = auth;
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn refresh(State(s): State<Arc<MockState>>, headers: HeaderMap, Json(pair): Json<TokenPair>) -> Response {
    record(&s, &headers);
    s.refresh_calls.fetch_add(1, Ordering::SeqCst);
    *s.last_refresh_body.lock() = Some(pair);
    let delay = s.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if s.refresh_fails.load(Ordering::SeqCst) {
        return error_body(StatusCode::UNAUTHORIZED, "Refresh token is expired");
    }
    Json(TokenPair::new(valid_token("olena@example.com", &["User", "Owner"]), REFRESHED_REFRESH_TOKEN.to_string()))
        .into_response()
}

async fn login(State(s): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&s, &headers);
    if body.get("password").and_then(|p| p.as_str()) != Some(GOOD_PASSWORD) {
        return error_body(StatusCode::BAD_REQUEST, "Invalid credentials");
    }
    let email = body.get("email").and_then(|e| e.as_str()).unwrap_or("olena@example.com");
    Json(TokenPair::new(valid_token(email, &["User", "Owner"]), "refresh-1".to_string())).into_response()
}

async fn user(State(s): State<Arc<MockState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    record(&s, &headers);
    if id == "nobody@example.com" {
        return error_body(StatusCode::NOT_FOUND, "User not found");
    }
    Json(json!({
        "id": "u-1",
        "name": "Olena",
        "email": id,
        "groupId": "grp-1",
        "roles": [{ "id": "r-1", "name": "Owner" }]
    }))
    .into_response()
}

async fn products(State(s): State<Arc<MockState>>, headers: HeaderMap, RawQuery(q): RawQuery) -> Response {
    record(&s, &headers);
    *s.last_query.lock() = q;
    Json(json!({
        "totalPages": 1,
        "items": [{ "id": "p-1", "name": "Oat milk", "count": 3 }]
    }))
    .into_response()
}

async fn echo_auth(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    record(&s, &headers);
    Json(json!({ "authorization": s.last_auth() })).into_response()
}

async fn malformed(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    record(&s, &headers);
    Json(json!({ "unexpected": true })).into_response()
}

async fn cook(State(s): State<Arc<MockState>>, headers: HeaderMap, Path(_id): Path<String>) -> Response {
    record(&s, &headers);
    StatusCode::OK.into_response()
}

async fn plain_error(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    record(&s, &headers);
    (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
}

/// Serve the mock on an ephemeral localhost port for the rest of the test.
pub async fn start_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/tokens/refresh", post(refresh))
        .route("/login", post(login))
        .route("/users/{id}", get(user))
        .route("/products", get(products))
        .route("/echo-auth", get(echo_auth))
        .route("/malformed", get(malformed))
        .route("/recipes/{id}/cook", patch(cook))
        .route("/plain-error", get(plain_error))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    MockBackend { base: format!("http://{}", addr), state }
}

pub fn mint_token(payload: Value) -> String {
    let enc = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.{}",
        enc.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        enc.encode(payload.to_string()),
        enc.encode(b"unchecked")
    )
}

fn token_expiring_in(email: &str, roles: &[&str], secs: i64) -> String {
    mint_token(json!({
        CLAIM_ID: "u-1",
        CLAIM_NAME: "Olena",
        CLAIM_EMAIL: email,
        CLAIM_ROLE: roles,
        "exp": chrono::Utc::now().timestamp() + secs,
    }))
}

pub fn valid_token(email: &str, roles: &[&str]) -> String {
    token_expiring_in(email, roles, 3600)
}

pub fn expired_token(email: &str, roles: &[&str]) -> String {
    token_expiring_in(email, roles, -3600)
}
