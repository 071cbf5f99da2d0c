use thiserror::Error;

/// Errors from the generative-language gateway.
///
/// The client returns these typed values; choosing the user-facing string
/// is the dispatcher's job (it pattern-matches on the kind).
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key configured — not retryable, no network call was made.
    #[error("no Gemini API key configured")]
    Unconfigured,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("API error ({status})")]
    Api { status: u16 },

    #[error("parse error: {0}")]
    Parse(String),
}

impl GeminiError {
    /// Classify a reqwest failure: timeouts are their own kind so callers
    /// can treat them like any other transport failure without inspecting
    /// the inner error.
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeminiError::Timeout
        } else {
            GeminiError::Http(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, GeminiError>;
