use orion_macros::IntoCommandError;

use crate::reference::SizeViolation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoCommandError)]
pub enum RfqError {
    #[code(NotFound)]
    #[error("rfq not found")]
    NotFound,

    #[code(ValidationFailed)]
    #[error("instrument not found or inactive")]
    InstrumentInactive,

    #[code(ValidationFailed)]
    #[error("invalid size: {0}")]
    InvalidSize(SizeViolation),

    #[code(ValidationFailed)]
    #[error("expiry instant must be in the future and within the configured maximum")]
    InvalidExpiry,

    #[code(StateInvalid)]
    #[error("rfq status does not allow this operation")]
    StateInvalid,

    #[code(Expired)]
    #[error("rfq has expired")]
    Expired,

    #[code(Conflict)]
    #[error("rfq version conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[code(NotFound)]
    #[error("quote not found")]
    QuoteNotFound,

    #[code(Expired)]
    #[error("quote has expired")]
    QuoteExpired,

    #[code(ValidationFailed)]
    #[error("two-way rfq requires both a bid and an ask")]
    MissingBidOrAsk,

    #[code(Forbidden)]
    #[error("only the requester may perform this operation")]
    Forbidden,
}
