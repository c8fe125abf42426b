//! In-process stub of the auth API for async tests.
//!
//! Binds an Axum server to `127.0.0.1:0` and records every request it sees so
//! tests can assert on the headers and bodies the client actually sent.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::state::session::AuthStore;
use crate::state::storage::{MemoryStorage, TOKEN_KEY, TokenStorage};

/// Credentials the stub accepts.
pub(crate) const EMAIL: &str = "a@b.com";
pub(crate) const PASSWORD: &str = "x";
/// Accepted with [`PASSWORD`]; the response carries an empty token.
pub(crate) const EMPTY_TOKEN_EMAIL: &str = "empty-token@b.com";
/// Accepted with [`PASSWORD`]; the profile has a string id and null flags.
pub(crate) const LOOSE_PROFILE_EMAIL: &str = "loose@b.com";

#[derive(Clone, Debug)]
pub(crate) struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Recorded {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub(crate) struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("stub mutex should lock").clone()
    }

    pub(crate) fn last_request(&self) -> Recorded {
        self.requests().pop().expect("stub saw no requests")
    }

    pub(crate) fn client(&self) -> ApiClient {
        ApiClient::new(&ClientConfig::new(self.base_url.clone())).expect("client should build")
    }

    /// Store pointed at this stub, starting from `stored_token` if given.
    pub(crate) fn store(&self, stored_token: Option<&str>) -> AuthStore {
        store_with_token(self.client(), stored_token)
    }
}

pub(crate) fn store_with_token(api: ApiClient, stored_token: Option<&str>) -> AuthStore {
    let mut storage = MemoryStorage::new();
    if let Some(token) = stored_token {
        storage.set_item(TOKEN_KEY, token).expect("memory storage write");
    }
    AuthStore::new(api, Box::new(storage))
}

pub(crate) async fn spawn_stub() -> StubServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("stub bind");
    let addr = listener.local_addr().expect("stub addr");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(handle).with_state(requests.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    StubServer { base_url: format!("http://{addr}"), requests }
}

/// Base URL of a port nothing is listening on.
pub(crate) fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("closed port bind");
    let addr = listener.local_addr().expect("closed port addr");
    drop(listener);
    format!("http://{addr}")
}

async fn handle(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let recorded = Recorded { method, path: uri.path().to_owned(), headers, body };
    requests.lock().expect("stub mutex should lock").push(recorded.clone());

    match recorded.path.as_str() {
        "/api/auth/login" => login(&recorded),
        "/api/auth/me" => me(&recorded),
        "/api/dashboard" => Json(json!({
            "authorization": recorded.header("authorization"),
            "content_type": recorded.header("content-type"),
        }))
        .into_response(),
        "/api/broken" => (StatusCode::INTERNAL_SERVER_ERROR, "<html>Internal Server Error</html>").into_response(),
        "/api/locked" => error(StatusCode::LOCKED, "ACCOUNT_LOCKED", "Account temporarily locked"),
        "/api/empty-message" => (StatusCode::BAD_REQUEST, Json(json!({ "error": { "message": "" } }))).into_response(),
        "/api/plain-text" => (StatusCode::OK, "ok").into_response(),
        "/api/numeric-code" => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": 401, "message": "Invalid email or password" } })),
        )
            .into_response(),
        _ => error(StatusCode::NOT_FOUND, "NOT_FOUND", "Not found"),
    }
}

fn login(req: &Recorded) -> Response {
    let email = req.body.get("email").and_then(Value::as_str);
    let password = req.body.get("password").and_then(Value::as_str);
    if password != Some(PASSWORD) {
        return error(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "Invalid email or password");
    }
    if email == Some(EMPTY_TOKEN_EMAIL) {
        return Json(json!({ "token": "", "user": { "permissions": ["read"] } })).into_response();
    }
    if email == Some(LOOSE_PROFILE_EMAIL) {
        return Json(json!({
            "token": "loose",
            "user": { "id": "u-1", "email": LOOSE_PROFILE_EMAIL, "is_active": null, "permissions": ["read"] },
        }))
        .into_response();
    }
    if email == Some(EMAIL) {
        return Json(json!({
            "token": "abc",
            "user": { "id": 1, "email": EMAIL, "is_active": true, "permissions": ["read"] },
        }))
        .into_response();
    }
    error(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "Invalid email or password")
}

fn me(req: &Recorded) -> Response {
    match req.header("authorization") {
        Some("Bearer abc") => Json(json!({
            "user": { "id": 1, "email": EMAIL, "is_active": true, "permissions": ["read", "reports.view"] },
        }))
        .into_response(),
        Some("Bearer admin") => Json(json!({
            "user": { "id": 2, "email": "admin@b.com", "permissions": ["admin.users.manage", "read"] },
        }))
        .into_response(),
        Some("Bearer loose") => Json(json!({
            "user": { "id": "u-1", "is_active": null, "must_reset_password": "no", "permissions": ["read", "reports.view"] },
        }))
        .into_response(),
        Some("Bearer garbled") => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid token"),
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": { "code": code, "message": message, "details": {} } }))).into_response()
}
