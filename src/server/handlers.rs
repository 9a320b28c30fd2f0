use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::consts::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::enhancer::EnhanceParams;

use super::ApiState;

/// Pull a string field out of the wire body. Fields are checked by hand
/// so a missing or non-string prompt gets the contract's 400 instead of a
/// deserialization error.
fn string_field(body: &Value, name: &str) -> Option<String> {
    body.get(name).and_then(Value::as_str).map(str::to_string)
}

pub async fn enhance(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let prompt = match string_field(&body, "prompt") {
        Some(prompt) if !prompt.trim().is_empty() => prompt,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "prompt is required" })),
            );
        }
    };

    let params = EnhanceParams {
        prompt,
        model: string_field(&body, "model"),
        user_id: string_field(&body, "userId"),
    };

    match state.service.enhance(&params).await {
        Ok(enhanced) => (StatusCode::OK, Json(json!({ "enhanced": enhanced }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

/// Clamp a requested limit to `[1, MAX_HISTORY_LIMIT]` before it reaches
/// the store.
pub fn clamp_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

pub async fn history(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<HistoryQuery>,
) -> (StatusCode, Json<Value>) {
    let limit = clamp_limit(query.limit);

    match state.audit.history(query.user_id.as_deref(), limit).await {
        Ok(records) => (StatusCode::OK, Json(json!(records))),
        Err(e) => {
            error!("history query failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to fetch enhancement history" })),
            )
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}
