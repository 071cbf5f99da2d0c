use serde::{Deserialize, Serialize};

/// Typed form of the Telegram update envelope.
///
/// Only the fields the dispatcher acts on are decoded; everything else the
/// platform sends (edits, channel posts, callback queries, ...) deserializes
/// into `message: None` and is acknowledged without dispatch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramUpdate {
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    /// Sending user. Absent for channel posts and some service messages.
    pub from: Option<TelegramUser>,
    /// Absent for media-only messages; defaults to empty downstream.
    pub text: Option<String>,
    /// Caption attached to a photo message; used as the analysis question.
    pub caption: Option<String>,
    /// Photo size variants, smallest first. The highest resolution is last.
    #[serde(default)]
    pub photo: Vec<TelegramPhotoSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramPhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Validated inbound message handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    /// Telegram id of the sending user. In a group chat this differs from
    /// `chat_id`; account linking keys on it. Falls back to `chat_id` when
    /// the payload carried no sender (private chats: the two are equal).
    pub from_id: i64,
    /// Trimmed message text; empty when the payload carried none.
    pub text: String,
}

impl InboundMessage {
    /// Build from a decoded Telegram message, defaulting absent text to "".
    pub fn from_update(msg: &TelegramMessage) -> Self {
        Self {
            chat_id: msg.chat.id,
            from_id: msg.from.as_ref().map(|u| u.id).unwrap_or(msg.chat.id),
            text: msg.text.as_deref().unwrap_or("").trim().to_string(),
        }
    }
}

/// What the dispatcher decided to do with an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Matched a known command; reply is static copy.
    Canned,
    /// Free text or /ask — reply produced by the AI gateway.
    AiDelegated,
    /// Non-command text answered with the fallback acknowledgment.
    Unrecognized,
    /// Empty payload — acknowledged without a reply.
    NoOp,
}

/// Dispatch outcome: the reply to send (HTML-lite markup) and how it was chosen.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub kind: ReplyKind,
    pub reply_text: String,
}

impl CommandResult {
    pub fn canned(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Canned,
            reply_text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::AiDelegated,
            reply_text: text.into(),
        }
    }

    pub fn unrecognized(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Unrecognized,
            reply_text: text.into(),
        }
    }

    pub fn noop() -> Self {
        Self {
            kind: ReplyKind::NoOp,
            reply_text: String::new(),
        }
    }
}
