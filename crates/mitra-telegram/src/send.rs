//! Outbound message sending via the Telegram Bot API.
//!
//! Telegram's message limit is 4096 characters; we use 4090 for safety and
//! split longer replies on line boundaries. Replies use HTML parse mode
//! (bold/emoji markup from the canned copy). The core never retries — a
//! failed send is reported to the caller as a typed error.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use mitra_core::config::{TelegramConfig, TELEGRAM_TIMEOUT_SECS};

use crate::error::{Result, SendError};

/// Maximum characters per Telegram message (limit is 4096; we use 4090 for safety).
const CHUNK_MAX: usize = 4090;

/// Outbound sender seam — the dispatcher and webhook tests mock this.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Thin wrapper around the Bot API bound to one bot credential. Stateless.
pub struct TelegramSender {
    pub(crate) http: reqwest::Client,
    pub(crate) token: Option<String>,
    pub(crate) api_base: String,
}

impl TelegramSender {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(TELEGRAM_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            token: config.bot_token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(SendError::Unconfigured)
    }

    async fn send_chunk(&self, token: &str, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let resp = self
            .http
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await
            .map_err(SendError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let description = resp
                .json::<ApiError>()
                .await
                .map(|e| e.description)
                .unwrap_or_default();
            return Err(SendError::Rejected {
                status: status.as_u16(),
                description,
            });
        }

        debug!(chat_id, bytes = text.len(), "message sent");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        let token = self.token()?;
        for chunk in split_chunks(text) {
            self.send_chunk(token, chat_id, &chunk).await?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    description: String,
}

/// Split `text` into chunks within the Telegram size limit, preferring line
/// boundaries. A single line longer than the limit is force-split.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let cost = if current.is_empty() {
            line.len()
        } else {
            1 + line.len()
        };

        if !current.is_empty() && current.len() + cost > CHUNK_MAX {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    // Force-split any chunk still over the limit (single oversized line).
    let mut result = Vec::new();
    for chunk in chunks {
        if chunk.len() <= CHUNK_MAX {
            result.push(chunk);
            continue;
        }
        let mut remaining = chunk.as_str();
        while remaining.len() > CHUNK_MAX {
            // The limit is a byte count; back up to a char boundary so
            // multi-byte text (Devanagari, Tamil, ...) never splits
            // mid-character.
            let limit = floor_char_boundary(remaining, CHUNK_MAX);
            let split_at = match remaining[..limit].rfind(' ') {
                Some(i) if i > 0 => i,
                _ => limit,
            };
            result.push(remaining[..split_at].to_string());
            remaining = remaining[split_at..].trim_start();
        }
        if !remaining.is_empty() {
            result.push(remaining.to_string());
        }
    }

    result
}

/// Largest index at or below `idx` that is a char boundary of `s`.
fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
