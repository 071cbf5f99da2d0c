use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use mitra_gateway::app::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mitra_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: MITRA_CONFIG env > ./mitra.toml > defaults
    let config_path = std::env::var("MITRA_CONFIG").ok();
    let config =
        mitra_core::config::MitraConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            mitra_core::config::MitraConfig::default()
        });

    if config.telegram.bot_token.is_none() {
        tracing::warn!("no Telegram bot token configured — outbound sends will fail");
    }
    if config.gemini.api_key.is_none() {
        tracing::warn!("no Gemini API key configured — AI replies degrade to fallbacks");
    }

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let state = Arc::new(AppState::from_config(config));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Kisan Mitra gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
