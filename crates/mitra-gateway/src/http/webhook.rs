//! Telegram webhook ingress — POST /api/telegram/webhook.
//!
//! The platform is always acknowledged with `{"ok": true}` once the payload
//! decodes, whatever happened downstream — handled failures become a reply
//! to the user, and a non-2xx here would only make Telegram retry-storm.
//! Only a payload that fails to decode yields a 500.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use mitra_core::types::TelegramUpdate;

use crate::app::AppState;

/// Header Telegram echoes back when the webhook was registered with a secret.
const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    verify_secret(&state, &headers)?;

    let update: TelegramUpdate = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "invalid JSON in webhook body");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "invalid request body"})),
        )
    })?;

    // Non-message update types (edits, joins, ...) are acked without dispatch.
    let message = match update.message {
        Some(m) => m,
        None => return Ok(Json(json!({"ok": true}))),
    };

    info!(chat_id = message.chat.id, "Telegram message received");
    state.dispatcher.handle(&message).await;

    Ok(Json(json!({"ok": true})))
}

fn verify_secret(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = match state.config.telegram.webhook_secret.as_deref() {
        Some(s) => s,
        None => return Ok(()),
    };

    let presented = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if presented == expected {
        Ok(())
    } else {
        warn!("webhook secret token mismatch");
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "authentication failed"})),
        ))
    }
}
