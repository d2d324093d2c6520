use thiserror::Error;

/// Errors that can occur in the low-level channel/stream plumbing.
#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    #[error("channel receiver dropped")]
    RxDropped,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("serialization error: {0}")]
    Serde(String),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for IntegrationError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::RxDropped
    }
}
