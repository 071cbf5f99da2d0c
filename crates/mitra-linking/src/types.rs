use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a linking code.
///
/// Pending → Claimed happens exactly once; a Pending code past its expiry
/// is treated as Expired on the next read and never matched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeState {
    Pending,
    Claimed,
    Expired,
}

/// A short-lived code binding a Telegram user to an application account.
#[derive(Debug, Clone, Serialize)]
pub struct LinkingCode {
    /// 6-character opaque token. Charset excludes confusable characters.
    pub code: String,
    /// Telegram user id the code was issued to.
    pub issued_to: i64,
    /// Application account the code bound to; set when claimed.
    pub app_user_id: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: CodeState,
}

/// Identity pair returned by a successful claim. The LinkedAccount record
/// itself is constructed by the caller (client UI collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedIdentity {
    pub app_user_id: String,
    pub telegram_user_id: i64,
}
