use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to serialize event envelope: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("state mutation failed: {0}")]
    StateMutation(String),
}

/// Error surfaced by a [`crate::relay::LogPublisher`] implementation. Transport-agnostic: the
/// relay only needs to know whether to retry, not the underlying client's error type.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct PublishError(pub String);

impl PublishError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
