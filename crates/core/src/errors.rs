use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Capability error: {0}")]
    Capability(String),

    #[error("Check already in progress for watch request {0}")]
    AlreadyChecking(String),

    #[error("Store error: {0}")]
    Store(#[from] eyre::Report),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type WatchResult<T> = Result<T, WatchError>;
