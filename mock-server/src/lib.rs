use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_TOKEN: &str = "test-token";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub gender: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct UserFilter {
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    users: Arc<RwLock<HashMap<u64, User>>>,
    next_id: Arc<AtomicU64>,
    token: Arc<str>,
}

type ApiFailure = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

/// Router whose write routes require `Authorization: Bearer {token}`.
pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        users: Arc::new(RwLock::new(HashMap::new())),
        next_id: Arc::new(AtomicU64::new(1)),
        token: Arc::from(token),
    };
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_token(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

fn failure(status: StatusCode, message: &str) -> ApiFailure {
    (status, Json(json!({ "message": message })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiFailure> {
    let expected = format!("Bearer {}", state.token);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => {
            tracing::debug!("rejected unauthenticated write");
            Err(failure(StatusCode::UNAUTHORIZED, "Authentication failed"))
        }
    }
}

async fn list_users(State(state): State<AppState>, Query(filter): Query<UserFilter>) -> Json<Vec<User>> {
    let users = state.users.read().await;
    let mut matching: Vec<User> = users
        .values()
        .filter(|u| filter.status.as_deref().is_none_or(|s| u.status == s))
        .cloned()
        .collect();
    matching.sort_by_key(|u| u.id);
    Json(matching)
}

async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), ApiFailure> {
    authorize(&state, &headers)?;
    if !input.email.contains('@') {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!([{ "field": "email", "message": "is invalid" }])),
        ));
    }

    let mut users = state.users.write().await;
    if users.values().any(|u| u.email == input.email) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!([{ "field": "email", "message": "has already been taken" }])),
        ));
    }
    let user = User {
        id: state.next_id.fetch_add(1, Ordering::SeqCst),
        name: input.name,
        email: input.email,
        gender: input.gender,
        status: input.status,
    };
    users.insert(user.id, user.clone());
    tracing::debug!(id = user.id, "created user");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<User>, ApiFailure> {
    let users = state.users.read().await;
    users
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Resource not found"))
}

async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    authorize(&state, &headers)?;
    let mut users = state.users.write().await;
    users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Resource not found"))
}

/// Replies with the requested status code and a plain-text body.
async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

/// Reflects method, raw query, headers and body back as JSON.
async fn echo(method: Method, headers: HeaderMap, RawQuery(query): RawQuery, body: Bytes) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}
