//! Direct advisory endpoints for web clients, bypassing Telegram.
//!
//! Failures are reported as fixed strings — transport and provider error
//! details stay in the logs, never in a response body.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use mitra_gemini::{GeminiError, Turn};

use crate::app::AppState;

const UNCONFIGURED_REPLY: &str = "AI advisory is not configured on this server.";
const UNAVAILABLE_REPLY: &str = "AI advisory is temporarily unavailable. Please try again later.";

fn default_language() -> String {
    "English".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct CropsRequest {
    pub soil_type: String,
    pub location: String,
    pub season: String,
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let turns = vec![Turn::user(&req.message)];
    let reply = state
        .advisor
        .chat(&turns, &req.language)
        .await
        .map_err(advisory_failure)?;
    Ok(Json(json!({"reply": reply})))
}

pub async fn crops_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CropsRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let reply = state
        .advisor
        .recommend_crops(&req.soil_type, &req.location, &req.season)
        .await
        .map_err(advisory_failure)?;
    Ok(Json(json!({"reply": reply})))
}

fn advisory_failure(e: GeminiError) -> (StatusCode, Json<Value>) {
    match e {
        GeminiError::Unconfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": UNCONFIGURED_REPLY})),
        ),
        other => {
            error!(error = %other, "advisory call failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": UNAVAILABLE_REPLY})),
            )
        }
    }
}
