//! In-process mock of the budget backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use budgetly_client::{ApiClient, SessionContext};
use budgetly_shared::config::ApiConfig;

pub const EMAIL: &str = "asha@example.com";
pub const PASSWORD: &str = "secret1";
pub const TOKEN: &str = "tok-123";

/// Backend state, inspectable from tests.
#[derive(Default)]
pub struct MockState {
    /// Stored records keyed by (month, year).
    pub records: Mutex<HashMap<(i64, i64), Value>>,
    /// Every `PUT /api/budget` body, in arrival order.
    pub puts: Mutex<Vec<Value>>,
    /// Every `POST /api/ai/chat` body.
    pub chats: Mutex<Vec<Value>>,
    /// Number of `DELETE /api/ai/chat/clear` calls.
    pub clears: Mutex<usize>,
}

impl MockState {
    pub fn seed(&self, month: i64, year: i64, record: Value) {
        self.records.lock().unwrap().insert((month, year), record);
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/me", get(me))
            .route("/api/budget", get(get_budget).put(put_budget))
            .route("/api/ai/chat", post(chat))
            .route("/api/ai/chat/clear", delete(clear_chat))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        }
    }

    pub fn client(&self, session: SessionContext) -> ApiClient {
        ApiClient::new(&self.config(), session).unwrap()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Token is not valid"})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        Json(json!({
            "token": TOKEN,
            "user": {"_id": "u1", "name": "Asha", "email": EMAIL}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "User already exists"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "token": "fresh-token-that-must-be-ignored",
            "user": {"name": body["name"], "email": body["email"]}
        })),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"user": {"name": "Asha", "email": EMAIL}})).into_response()
}

#[derive(Deserialize)]
struct PeriodQuery {
    month: i64,
    year: i64,
}

async fn get_budget(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match state.records.lock().unwrap().get(&(query.month, query.year)) {
        Some(record) => Json(record.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Budget not found"})),
        )
            .into_response(),
    }
}

async fn put_budget(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.puts.lock().unwrap().push(body.clone());

    let key = (
        body["month"].as_i64().unwrap_or_default(),
        body["year"].as_i64().unwrap_or_default(),
    );
    let mut records = state.records.lock().unwrap();
    let record = records
        .entry(key)
        .or_insert_with(|| json!({"_id": "b1", "user": "u1"}));
    if let (Some(record), Some(patch)) = (record.as_object_mut(), body.as_object()) {
        for (field, value) in patch {
            record.insert(field.clone(), value.clone());
        }
    }
    Json(record.clone()).into_response()
}

async fn chat(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.chats.lock().unwrap().push(body.clone());

    if body["message"] == "fail" {
        return Json(json!({"success": false, "error": "AI service unavailable"})).into_response();
    }
    Json(json!({
        "success": true,
        "response": format!("Your total budget is {}.", body["budgetData"]["totalAmount"])
    }))
    .into_response()
}

async fn clear_chat(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    *state.clears.lock().unwrap() += 1;
    Json(json!({"success": true})).into_response()
}
