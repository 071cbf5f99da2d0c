//! Command dispatch: inbound text → canned reply or AI delegation.
//!
//! Matching is a case-sensitive prefix check on the trimmed text, first
//! match wins. Every branch that produces a reply drives the sender exactly
//! once per inbound message, and sender failures are absorbed here — the
//! webhook handler above never sees them.

use std::sync::Arc;

use tracing::{info, warn};

use mitra_core::types::{CommandResult, InboundMessage, TelegramMessage};
use mitra_gemini::{CropAdvisor, GeminiError, Turn};
use mitra_linking::LinkingRegistry;

use crate::attach::MediaFetcher;
use crate::copy;
use crate::send::MessageSender;

const DEFAULT_LANGUAGE: &str = "English";
const DEFAULT_PHOTO_QUESTION: &str = "What can you tell me about this crop?";

pub struct Dispatcher {
    advisor: Arc<dyn CropAdvisor>,
    sender: Arc<dyn MessageSender>,
    media: Arc<dyn MediaFetcher>,
    registry: Arc<LinkingRegistry>,
}

impl Dispatcher {
    pub fn new(
        advisor: Arc<dyn CropAdvisor>,
        sender: Arc<dyn MessageSender>,
        media: Arc<dyn MediaFetcher>,
        registry: Arc<LinkingRegistry>,
    ) -> Self {
        Self {
            advisor,
            sender,
            media,
            registry,
        }
    }

    /// Handle one inbound message end to end: choose a reply, send it.
    ///
    /// Never returns an error — business failures become user-facing reply
    /// text and send failures are logged and dropped.
    pub async fn handle(&self, msg: &TelegramMessage) -> CommandResult {
        let result = if msg.photo.is_empty() {
            let inbound = InboundMessage::from_update(msg);
            self.dispatch_text(&inbound).await
        } else {
            self.dispatch_photo(msg).await
        };

        if !matches!(result.kind, mitra_core::types::ReplyKind::NoOp) {
            if let Err(e) = self.sender.send(msg.chat.id, &result.reply_text).await {
                warn!(chat_id = msg.chat.id, error = %e, "reply delivery failed");
            }
        }

        info!(chat_id = msg.chat.id, kind = ?result.kind, "message dispatched");
        result
    }

    /// Map trimmed text to a reply. Priority order, case-sensitive.
    pub async fn dispatch_text(&self, inbound: &InboundMessage) -> CommandResult {
        let text = inbound.text.as_str();

        if text.is_empty() {
            return CommandResult::noop();
        }
        if text.starts_with("/start") {
            return CommandResult::canned(copy::WELCOME);
        }
        if text.starts_with("/help") {
            return CommandResult::canned(copy::HELP);
        }
        if text.starts_with("/weather") {
            return CommandResult::canned(copy::WEATHER);
        }
        if text.starts_with("/market") {
            return CommandResult::canned(copy::MARKET);
        }
        if text.starts_with("/link") {
            // Keyed on the sender, not the chat — in a group the code must
            // bind the user who asked for it.
            let issued = self.registry.issue(inbound.from_id);
            return CommandResult::canned(copy::link_issued(&issued.code));
        }
        if text.starts_with("/unlink") {
            self.registry.revoke(inbound.from_id);
            return CommandResult::canned(copy::UNLINKED);
        }
        if text == "/ask" || text.starts_with("/ask ") {
            // Bare "/ask" proceeds with an empty question.
            let question = text.strip_prefix("/ask").unwrap_or("").trim();
            return self.ask(question).await;
        }

        self.free_text(text).await
    }

    async fn ask(&self, question: &str) -> CommandResult {
        match self
            .advisor
            .chat(&[Turn::user(question)], DEFAULT_LANGUAGE)
            .await
        {
            Ok(answer) => CommandResult::ai(copy::ask_envelope(question, &answer)),
            Err(e) => self.ai_failure(e, question),
        }
    }

    async fn free_text(&self, text: &str) -> CommandResult {
        match self
            .advisor
            .chat(&[Turn::user(text)], DEFAULT_LANGUAGE)
            .await
        {
            Ok(answer) => CommandResult::ai(answer),
            Err(e) => self.ai_failure(e, text),
        }
    }

    async fn dispatch_photo(&self, msg: &TelegramMessage) -> CommandResult {
        // Highest resolution variant is last in the array.
        let file_id = match msg.photo.last() {
            Some(p) => p.file_id.as_str(),
            None => return CommandResult::noop(),
        };
        let question = msg.caption.as_deref().unwrap_or(DEFAULT_PHOTO_QUESTION);

        let bytes = match self.media.fetch_file(file_id).await {
            Ok(b) => b,
            Err(e) => {
                warn!(chat_id = msg.chat.id, error = %e, "photo download failed");
                return CommandResult::ai(copy::photo_analysis_failed());
            }
        };

        match self.advisor.analyze_image(&bytes, None, question).await {
            Ok(answer) => CommandResult::ai(answer),
            Err(GeminiError::Unconfigured) => CommandResult::ai(copy::configuration_needed()),
            Err(e) => {
                warn!(chat_id = msg.chat.id, error = %e, "image analysis failed");
                CommandResult::ai(copy::photo_analysis_failed())
            }
        }
    }

    /// Choose the user-facing string for an AI failure by error kind.
    fn ai_failure(&self, e: GeminiError, text: &str) -> CommandResult {
        match e {
            // No AI configured: acknowledge the text and hint at commands.
            GeminiError::Unconfigured => {
                CommandResult::unrecognized(copy::understood_fallback(text))
            }
            other => {
                warn!(error = %other, "AI chat failed");
                CommandResult::ai(copy::ai_unavailable())
            }
        }
    }
}
