//! Event payloads produced by the RFQ aggregate. Each variant of [`crate::rfq::RfqEvent`]
//! wraps an [`orion_core::event::EventEnvelope`] typed to one of these.

use chrono::{DateTime, Utc};
use orion_core::command::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqCreated {
    pub rfq_id: String,
    pub requester_id: String,
    pub instrument_id: String,
    pub side: Side,
    pub size: Decimal,
    pub expiry_instant: DateTime<Utc>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqSent {
    pub rfq_id: String,
    pub routed_lp_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteReceived {
    pub rfq_id: String,
    pub quote_id: String,
    pub lp_id: String,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub size: Decimal,
    /// Set when the quote's price fell outside the reference-mid tolerance; the quote is still
    /// accepted, just flagged (spec.md §4.4: "accept but flag").
    pub price_tolerance_breached: bool,
}

/// A quote's position in the current ranking, as carried in [`QuoteRanking`]. Mirrors
/// [`crate::quote::QuoteRank`] in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRankEntry {
    pub quote_id: String,
    pub is_best_bid: bool,
    pub is_best_ask: bool,
    pub is_best_for_side: bool,
}

/// Derived projection update published alongside every `QuoteReceived` (spec.md §4.4: "each RFQ
/// state revision publishes current rankings").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRanking {
    pub rfq_id: String,
    pub rankings: Vec<QuoteRankEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteAccepted {
    pub rfq_id: String,
    pub quote_id: String,
    pub requester_id: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteAcceptanceRejected {
    pub rfq_id: String,
    pub quote_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqExpired {
    pub rfq_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqCancelled {
    pub rfq_id: String,
}
