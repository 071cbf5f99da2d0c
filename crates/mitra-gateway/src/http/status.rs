//! GET /api/telegram/webhook — liveness probe for webhook registration.

use axum::Json;
use serde_json::{json, Value};

pub async fn liveness_handler() -> Json<Value> {
    Json(json!({
        "status": "Telegram webhook active",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
