use thiserror::Error;

/// Business-rule failures from the linking registry. Each one names the
/// specific reason so the user can self-correct.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkingError {
    #[error("linking code not found")]
    NotFound,

    #[error("linking code has expired")]
    Expired,

    #[error("linking code was already claimed")]
    AlreadyClaimed,
}

pub type Result<T> = std::result::Result<T, LinkingError>;
