use thiserror::Error;

/// The two failure kinds a [`crate::handler::ConsumerHandler`] can report (spec.md §4.3).
/// Everything else (database errors reaching the runtime itself) is [`ConsumerError`].
#[derive(Debug, Error)]
pub enum HandlerFailure {
    /// I/O, timeouts, or a uniqueness violation unrelated to the dedup key. Retried with
    /// backoff before falling through to the DLQ.
    #[error("transient handler failure: {0}")]
    Transient(String),

    /// Schema mismatch or a non-recoverable validation/logic error. Routed to the DLQ
    /// immediately, with no retry, so it never blocks the partition.
    #[error("poison event: {0}")]
    Poison(String),
}

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to deserialize event payload: {0}")]
    Deserialization(#[from] serde_json::Error),
}
