use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::api::error::ApiError;
use crate::rotation::{CycleStats, Item, RotationStore};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RotationStore>,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Arc<RotationStore>, admin_token: Option<String>) -> Self {
        Self {
            store,
            admin_token: admin_token.map(Arc::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomResponse {
    pub success: bool,
    pub data: Item,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<CycleStats>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: CycleStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub cycle: i64,
    pub timestamp: DateTime<Utc>,
}

/// Run a store call off the async executor.
async fn run_blocking<T, F>(store: &Arc<RotationStore>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&RotationStore) -> crate::rotation::Result<T> + Send + 'static,
{
    let store = store.clone();
    match tokio::task::spawn_blocking(move || op(store.as_ref())).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ApiError::from(err)),
        Err(err) => Err(ApiError::internal(err.to_string())),
    }
}

/// Cycle metadata for decorating other responses; failures are logged and
/// dropped so they never fail the primary request.
async fn optional_stats(store: &Arc<RotationStore>) -> Option<CycleStats> {
    match run_blocking(store, |store| store.stats()).await {
        Ok(stats) => Some(stats),
        Err(err) => {
            warn!(code = %err.code, "stats unavailable: {}", err.message);
            None
        }
    }
}

pub async fn handle_random(State(state): State<AppState>) -> Result<Json<RandomResponse>, ApiError> {
    let item = run_blocking(&state.store, |store| store.draw()).await?;
    let meta = optional_stats(&state.store).await;

    Ok(Json(RandomResponse {
        success: true,
        data: item,
        timestamp: Utc::now(),
        meta,
    }))
}

pub async fn handle_random_text(State(state): State<AppState>) -> Response {
    match run_blocking(&state.store, |store| store.draw()).await {
        Ok(item) => ([(CONTENT_TYPE, TEXT_PLAIN)], item.content).into_response(),
        Err(err) => (
            err.status,
            [(CONTENT_TYPE, TEXT_PLAIN)],
            format!("Error: {}", err.message),
        )
            .into_response(),
    }
}

pub async fn handle_messages(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let contents = run_blocking(&state.store, |store| store.contents()).await?;
    Ok(Json(contents))
}

pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = run_blocking(&state.store, |store| store.stats()).await?;
    Ok(Json(StatsResponse {
        success: true,
        data: stats,
        timestamp: Utc::now(),
    }))
}

pub async fn handle_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>, ApiError> {
    if let Some(token) = &state.admin_token {
        if !bearer_matches(&headers, token) {
            warn!("rejected cycle reset with missing or invalid token");
            return Err(ApiError::unauthorized("admin token required"));
        }
    }

    let cycle = run_blocking(&state.store, |store| store.force_new_cycle()).await?;
    Ok(Json(ResetResponse {
        success: true,
        message: "Cycle reset successfully".to_string(),
        cycle,
        timestamp: Utc::now(),
    }))
}

pub async fn handle_health(State(state): State<AppState>) -> Response {
    let stats = optional_stats(&state.store).await;
    let (status, health, database) = match stats {
        Some(_) => (StatusCode::OK, "healthy", "connected"),
        None => (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable"),
    };

    let body = json!({
        "status": health,
        "timestamp": Utc::now(),
        "checks": {
            "database": {"status": database, "type": "sqlite"},
            "messages": stats,
        },
    });
    (status, Json(body)).into_response()
}

pub async fn handle_health_text(State(state): State<AppState>) -> Response {
    let (status, body) = match optional_stats(&state.store).await {
        Some(_) => (StatusCode::OK, "Status: healthy\nDatabase: connected\n"),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Status: degraded\nDatabase: unavailable\n",
        ),
    };
    (status, [(CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

pub async fn handle_not_found() -> ApiError {
    ApiError::not_found("no such endpoint")
}

fn bearer_matches(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|provided| provided.trim() == token)
        .unwrap_or(false)
}
