use orion_macros::IntoCommandError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoCommandError)]
pub enum OrderError {
    #[code(NotFound)]
    #[error("order not found")]
    NotFound,

    #[code(StateInvalid)]
    #[error("order status does not allow this operation")]
    StateInvalid,

    #[code(StateInvalid)]
    #[error("amendment quantity must not exceed remaining quantity")]
    InvalidAmendment,

    #[code(ValidationFailed)]
    #[error("order validation failed: {0}")]
    ValidationFailed(String),

    #[code(Forbidden)]
    #[error("only the owner may perform this operation")]
    Forbidden,

    #[code(Conflict)]
    #[error("order version conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SagaError {
    #[error("a trade already exists for this (rfqId, acceptedQuoteId) pair")]
    DuplicateTrade,

    #[error("settlement record not found")]
    SettlementNotFound,

    #[error("settlement status does not allow this operation")]
    SettlementStateInvalid,
}

/// Error surfaced by an [`crate::client::ExecutionClient`] adapter call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("venue rejected the request: {0}")]
    Rejected(String),

    #[error("venue connectivity error: {0}")]
    Connectivity(String),

    #[error("venue request timed out")]
    Timeout,
}
