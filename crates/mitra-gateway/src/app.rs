use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use mitra_core::config::MitraConfig;
use mitra_gemini::{CropAdvisor, GeminiClient};
use mitra_linking::LinkingRegistry;
use mitra_telegram::attach::MediaFetcher;
use mitra_telegram::{Dispatcher, MessageSender, TelegramSender};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: MitraConfig,
    pub registry: Arc<LinkingRegistry>,
    pub advisor: Arc<dyn CropAdvisor>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Wire the real collaborators from config.
    pub fn from_config(config: MitraConfig) -> Self {
        let advisor: Arc<dyn CropAdvisor> = Arc::new(GeminiClient::new(&config.gemini));
        let telegram = Arc::new(TelegramSender::new(&config.telegram));
        let sender: Arc<dyn MessageSender> = Arc::clone(&telegram) as _;
        let media: Arc<dyn MediaFetcher> = telegram as _;
        let registry = Arc::new(LinkingRegistry::with_ttl_secs(config.linking.ttl_secs));
        Self::new(config, advisor, sender, media, registry)
    }

    /// Assemble from explicit parts — tests inject mocks here.
    pub fn new(
        config: MitraConfig,
        advisor: Arc<dyn CropAdvisor>,
        sender: Arc<dyn MessageSender>,
        media: Arc<dyn MediaFetcher>,
        registry: Arc<LinkingRegistry>,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            Arc::clone(&advisor),
            sender,
            media,
            Arc::clone(&registry),
        );
        Self {
            config,
            registry,
            advisor,
            dispatcher,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/telegram/webhook",
            post(crate::http::webhook::webhook_handler).get(crate::http::status::liveness_handler),
        )
        .route("/api/telegram/link", get(crate::http::link::verify_handler))
        .route("/api/advisor/chat", post(crate::http::advisor::chat_handler))
        .route(
            "/api/advisor/crops",
            post(crate::http::advisor::crops_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
