//! GET /api/telegram/link — claim a linking code issued via /link in chat.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use mitra_linking::LinkingError;

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkQuery {
    pub code: String,
    /// Application account to bind. Absent means the claimer has no account
    /// yet; the Telegram user id doubles as the app user id.
    pub user_id: Option<String>,
}

pub async fn verify_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LinkQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let code = query.code.trim().to_uppercase();

    let result = match query.user_id.as_deref() {
        Some(user_id) => state.registry.verify(&code, user_id),
        None => state.registry.claim(&code),
    };

    match result {
        Ok(identity) => Ok(Json(json!({
            "userId": identity.app_user_id,
            "telegramUserId": identity.telegram_user_id,
        }))),
        Err(e) => {
            let status = match e {
                LinkingError::NotFound => StatusCode::NOT_FOUND,
                LinkingError::Expired => StatusCode::GONE,
                LinkingError::AlreadyClaimed => StatusCode::CONFLICT,
            };
            Err((status, Json(json!({"error": e.to_string()}))))
        }
    }
}
