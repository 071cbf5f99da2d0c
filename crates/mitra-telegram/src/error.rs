use thiserror::Error;

/// Errors from the Telegram Bot API wrapper.
#[derive(Debug, Error)]
pub enum SendError {
    /// No bot token configured — not retryable.
    #[error("no bot token configured")]
    Unconfigured,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("request timed out")]
    Timeout,

    /// Non-2xx from the platform, e.g. an invalid chat id.
    #[error("Telegram rejected the request ({status}): {description}")]
    Rejected { status: u16, description: String },
}

impl SendError {
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SendError::Timeout
        } else {
            SendError::Http(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, SendError>;
