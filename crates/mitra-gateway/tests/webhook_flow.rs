//! End-to-end router tests: webhook ingress through dispatch to the
//! recorded outbound sends, plus the link and advisory endpoints.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use mitra_core::config::MitraConfig;
use mitra_gateway::app::{build_router, AppState};
use mitra_gemini::{CropAdvisor, GeminiError, Turn};
use mitra_linking::LinkingRegistry;
use mitra_telegram::attach::MediaFetcher;
use mitra_telegram::{MessageSender, SendError};

struct MockAdvisor {
    reply: Option<&'static str>,
}

#[async_trait]
impl CropAdvisor for MockAdvisor {
    async fn chat(&self, _turns: &[Turn], _language: &str) -> Result<String, GeminiError> {
        match self.reply {
            Some(r) => Ok(r.to_string()),
            None => Err(GeminiError::Unconfigured),
        }
    }

    async fn analyze_image(
        &self,
        _image_bytes: &[u8],
        _mime_type: Option<&str>,
        _question: &str,
    ) -> Result<String, GeminiError> {
        match self.reply {
            Some(r) => Ok(r.to_string()),
            None => Err(GeminiError::Unconfigured),
        }
    }

    async fn recommend_crops(
        &self,
        soil_type: &str,
        location: &str,
        _season: &str,
    ) -> Result<String, GeminiError> {
        match self.reply {
            Some(r) => Ok(format!("{r} for {soil_type} in {location}")),
            None => Err(GeminiError::Unconfigured),
        }
    }
}

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

struct NoMedia;

#[async_trait]
impl MediaFetcher for NoMedia {
    async fn fetch_file(&self, _file_id: &str) -> Result<Vec<u8>, SendError> {
        Ok(vec![0xFF, 0xD8])
    }
}

struct Harness {
    router: Router,
    sender: Arc<RecordingSender>,
    registry: Arc<LinkingRegistry>,
}

fn harness(reply: Option<&'static str>, config: MitraConfig) -> Harness {
    let sender = Arc::new(RecordingSender::default());
    let registry = Arc::new(LinkingRegistry::new());
    let state = Arc::new(AppState::new(
        config,
        Arc::new(MockAdvisor { reply }),
        Arc::clone(&sender) as _,
        Arc::new(NoMedia),
        Arc::clone(&registry),
    ));
    Harness {
        router: build_router(state),
        sender,
        registry,
    }
}

fn webhook_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/telegram/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn update_with_text(chat_id: i64, text: &str) -> String {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": {"id": chat_id},
            "text": text,
        }
    })
    .to_string()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn start_command_sends_welcome_and_acks() {
    let h = harness(Some("unused"), MitraConfig::default());

    let response = h
        .router
        .oneshot(webhook_post(&update_with_text(42, "/start")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"ok": true}));

    let sent = h.sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 42);
    assert!(sent[0].1.contains("Kisan Mitra"));
}

#[tokio::test]
async fn ask_command_replies_with_ai_answer() {
    let h = harness(Some("Try millet"), MitraConfig::default());

    let response = h
        .router
        .oneshot(webhook_post(&update_with_text(7, "/ask what grows in sand")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = h.sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 7);
    assert!(sent[0].1.contains("what grows in sand"));
    assert!(sent[0].1.contains("Try millet"));
}

#[tokio::test]
async fn update_without_message_is_acked_without_dispatch() {
    let h = harness(Some("unused"), MitraConfig::default());

    let response = h.router.oneshot(webhook_post("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"ok": true}));
    assert!(h.sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_yields_500_error_body() {
    let h = harness(Some("unused"), MitraConfig::default());

    let response = h.router.oneshot(webhook_post("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body.get("error").is_some());
    assert!(h.sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_secret_mismatch_is_unauthorized() {
    let mut config = MitraConfig::default();
    config.telegram.webhook_secret = Some("s3cret".to_string());
    let h = harness(Some("unused"), config);

    let mut request = webhook_post(&update_with_text(1, "/start"));
    request
        .headers_mut()
        .insert("x-telegram-bot-api-secret-token", "wrong".parse().unwrap());

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(h.sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_secret_match_is_accepted() {
    let mut config = MitraConfig::default();
    config.telegram.webhook_secret = Some("s3cret".to_string());
    let h = harness(Some("unused"), config);

    let mut request = webhook_post(&update_with_text(1, "/start"));
    request
        .headers_mut()
        .insert("x-telegram-bot-api-secret-token", "s3cret".parse().unwrap());

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.sender.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn liveness_probe_reports_active() {
    let h = harness(Some("unused"), MitraConfig::default());

    let request = Request::builder()
        .method("GET")
        .uri("/api/telegram/webhook")
        .body(Body::empty())
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "Telegram webhook active");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn link_claim_returns_identity() {
    let h = harness(Some("unused"), MitraConfig::default());
    let code = h.registry.issue(314).code;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/telegram/link?code={code}&user_id=app-9"))
        .body(Body::empty())
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["userId"], "app-9");
    assert_eq!(body["telegramUserId"], 314);
}

#[tokio::test]
async fn link_without_user_id_defaults_to_telegram_id() {
    let h = harness(Some("unused"), MitraConfig::default());
    let code = h.registry.issue(271).code;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/telegram/link?code={code}"))
        .body(Body::empty())
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["userId"], "271");
}

#[tokio::test]
async fn link_unknown_code_is_not_found() {
    let h = harness(Some("unused"), MitraConfig::default());

    let request = Request::builder()
        .method("GET")
        .uri("/api/telegram/link?code=ZZZZZZ")
        .body(Body::empty())
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await.get("error").is_some());
}

#[tokio::test]
async fn link_second_claim_conflicts() {
    let h = harness(Some("unused"), MitraConfig::default());
    let code = h.registry.issue(11).code;
    h.registry.verify(&code, "first").unwrap();

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/telegram/link?code={code}&user_id=second"))
        .body(Body::empty())
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn advisor_chat_returns_reply() {
    let h = harness(Some("Rotate with legumes"), MitraConfig::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/advisor/chat")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"message": "my soil is tired", "language": "Hindi"}).to_string(),
        ))
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["reply"], "Rotate with legumes");
}

#[tokio::test]
async fn advisor_chat_unconfigured_is_503() {
    let h = harness(None, MitraConfig::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/advisor/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({"message": "hello"}).to_string()))
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_json(response).await.get("error").is_some());
}

#[tokio::test]
async fn advisor_crops_returns_prose() {
    let h = harness(Some("Grow bajra"), MitraConfig::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/advisor/crops")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"soil_type": "sandy", "location": "Jodhpur", "season": "kharif"})
                .to_string(),
        ))
        .unwrap();
    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["reply"].as_str().unwrap().contains("Grow bajra"));
}
