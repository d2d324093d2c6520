//! Event payloads produced by the order aggregate (C5) and the execution/post-trade saga (C6).

use chrono::{DateTime, Utc};
use orion_core::command::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: String,
    pub instrument_id: String,
    pub side: Side,
    pub qty: Decimal,
    pub limit_price: Option<Decimal>,
    pub time_in_force: String,
    pub owner_id: String,
    pub client_idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAcknowledged {
    pub order_id: String,
    pub venue_order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRejected {
    pub order_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub order_id: String,
    pub fill_qty: Decimal,
    pub fill_price: Decimal,
    pub cumulative_qty: Decimal,
    pub remaining_qty: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAmended {
    pub order_id: String,
    pub new_qty: Option<Decimal>,
    pub new_limit_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExecuted {
    pub trade_id: String,
    pub rfq_id: String,
    pub accepted_quote_id: String,
    pub instrument_id: String,
    pub side: Side,
    pub size: Decimal,
    pub price: Decimal,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeConfirmed {
    pub trade_id: String,
    pub confirmation: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRequested {
    pub trade_id: String,
    pub settlement_id: String,
    pub venue: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementCompleted {
    pub settlement_id: String,
    pub trade_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementFailed {
    pub settlement_id: String,
    pub trade_id: String,
    pub attempt: u32,
    pub reason: String,
    pub final_failure: bool,
}
