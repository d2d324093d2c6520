//! # Command surface & dispatch (spec.md §6, Design Notes §9)
//!
//! "Aggregate dispatch (source uses object orientation over a common base): implement as a
//! tagged variant `Command { CreateRFQ | AcceptQuote | ... }` dispatched by a central command
//! router; each variant carries its validated input."
//!
//! `Command` is transport-agnostic: a gRPC/HTTP/WS boundary deserializes a request into one of
//! these variants (with a [`Correlation`](crate::context::Correlation) derived from headers)
//! before handing it to the appropriate aggregate crate (`orion-rfq`, `orion-execution`,
//! `orion-control`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRfq {
    pub instrument_id: String,
    pub side: Side,
    pub size: Decimal,
    pub expiry_instant: DateTime<Utc>,
    pub requester_id: String,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptQuote {
    pub rfq_id: String,
    pub quote_id: String,
    pub idempotency_key: String,
    pub expected_version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRfq {
    pub rfq_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub instrument_id: String,
    pub side: Side,
    pub qty: Decimal,
    pub limit_price: Option<Decimal>,
    pub time_in_force: String,
    pub owner_id: String,
    pub client_idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmendOrder {
    pub order_id: String,
    pub new_qty: Option<Decimal>,
    pub new_limit_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetKillSwitch {
    pub tenant_id: Option<String>,
    pub active: bool,
    pub actor: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLimits {
    pub tenant_id: String,
    pub user_id: Option<String>,
    pub max_notional: Option<Decimal>,
    pub rfqs_per_sec: Option<u32>,
    pub orders_per_sec: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInstrument {
    pub instrument_id: String,
    pub asset_class: String,
    pub lot_size: Decimal,
    pub min_size: Decimal,
    pub max_size: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInstrument {
    pub instrument_id: String,
    pub active: Option<bool>,
    pub lot_size: Option<Decimal>,
    pub min_size: Option<Decimal>,
    pub max_size: Option<Decimal>,
}

/// The full command surface accepted by the Trading Event Core (spec.md §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    CreateRfq(CreateRfq),
    AcceptQuote(AcceptQuote),
    CancelRfq(CancelRfq),
    PlaceOrder(PlaceOrder),
    CancelOrder(CancelOrder),
    AmendOrder(AmendOrder),
    SetKillSwitch(SetKillSwitch),
    UpdateLimits(UpdateLimits),
    CreateInstrument(CreateInstrument),
    UpdateInstrument(UpdateInstrument),
}

/// The closed set of command error codes (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    NotFound,
    Conflict,
    StateInvalid,
    Expired,
    Forbidden,
    RateLimited,
    KillSwitchActive,
    Timeout,
    Internal,
}

/// The structured error every command returns on failure: `{code, message, correlationId, details?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
    pub correlation_id: Uuid,
    pub field: Option<String>,
    pub details: Option<String>,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>, correlation_id: Uuid) -> Self {
        Self {
            code,
            message: message.into(),
            correlation_id,
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
