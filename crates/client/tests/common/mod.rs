#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use client::{ApiClient, FileTokenStore, Session};
use serde_json::{Value, json};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";

/// In-process stand-in for the REST backend.
///
/// Only `valid_access` is accepted as a bearer token. A refresh with
/// `valid_refresh` rotates the access token to `a2` when `refresh_ok` is set.
pub struct Backend {
    pub valid_access: Mutex<String>,
    pub valid_refresh: String,
    pub refresh_ok: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub refresh_delay: Duration,
    pub requests: AtomicUsize,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            valid_access: Mutex::new("a1".to_string()),
            valid_refresh: "r1".to_string(),
            refresh_ok: AtomicBool::new(true),
            refresh_calls: AtomicUsize::new(0),
            refresh_delay: Duration::from_millis(100),
            requests: AtomicUsize::new(0),
        })
    }

    /// Invalidates the current access token, as if it expired server-side.
    pub fn expire_access(&self) {
        *self.valid_access.lock().unwrap() = "a-rotated-away".to_string();
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == expected)
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Given token not valid for any token type" })),
    )
        .into_response()
}

fn expense(id: i64, amount: &str) -> Value {
    json!({
        "id": id,
        "category": { "id": 1, "name": "Food", "category_type": "EXPENSE" },
        "amount": amount,
        "date": "2024-03-01",
        "note": "lunch",
    })
}

async fn token(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        let access = backend.valid_access.lock().unwrap().clone();
        Json(json!({ "access": access, "refresh": backend.valid_refresh })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "No active account found with the given credentials" })),
        )
            .into_response()
    }
}

async fn refresh(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(backend.refresh_delay).await;

    if backend.refresh_ok.load(Ordering::SeqCst) && body["refresh"] == backend.valid_refresh {
        *backend.valid_access.lock().unwrap() = "a2".to_string();
        Json(json!({ "access": "a2" })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Token is invalid or expired" })),
        )
            .into_response()
    }
}

async fn list_expenses(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    Json(json!([expense(1, "10.00"), expense(2, "20.00")])).into_response()
}

async fn create_expense(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    let amount = body["amount"].as_str().unwrap_or("0").to_string();
    (StatusCode::CREATED, Json(expense(3, &amount))).into_response()
}

async fn get_expense(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response();
    }
    Json(expense(id, "12.50")).into_response()
}

async fn delete_expense(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn dashboard(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "recent_expenses": [expense(1, "10.00")],
        "recent_income": [],
        "recent_budgets": [],
        "recent_goals": [],
        "income_total": 100,
        "expense_total": "10.00",
        "net_total": 90.0,
        "number_of_budgets": 0,
        "number_of_goals": 2,
    }))
    .into_response()
}

async fn empty(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    StatusCode::OK.into_response()
}

async fn boom() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "kaboom" })),
    )
        .into_response()
}

/// Echoes the headers the client sent.
async fn echo(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "authorization": read("authorization"),
        "content_type": read("content-type"),
        "x_trace": read("x-trace"),
    }))
    .into_response()
}

/// Rejects every request, even with a freshly refreshed token.
async fn always_unauthorized(State(backend): State<Arc<Backend>>) -> Response {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    unauthorized()
}

pub fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/token/", post(token))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/dashboard/", get(dashboard))
        .route("/expenses/", get(list_expenses).post(create_expense))
        .route("/expenses/{id}/", get(get_expense).delete(delete_expense))
        .route("/empty/", get(empty))
        .route("/boom/", get(boom))
        .route("/echo/", get(echo).post(echo))
        .route("/locked/", get(always_unauthorized))
        .with_state(backend)
}

pub async fn spawn(backend: Arc<Backend>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(backend)).await.unwrap();
    });
    addr
}

pub async fn client_for(addr: SocketAddr, session: Session) -> ApiClient {
    ApiClient::builder()
        .base_url(&format!("http://{addr}"))
        .session(session)
        .build()
        .unwrap()
}

/// A session that holds `access`/`refresh` as if restored from disk.
pub fn session_with(access: &str, refresh: &str) -> Session {
    let session = Session::in_memory();
    session.set_tokens(access, refresh).unwrap();
    session
}

pub fn temp_session_file() -> FileTokenStore {
    let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_sessions");
    FileTokenStore::new(dir.join(format!("{}.json", uuid::Uuid::new_v4())))
}
