use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTickReceived {
    pub instrument_id: String,
    pub source: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub source_time: DateTime<Utc>,
    pub late: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshotUpdated {
    pub instrument_id: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub source_time: DateTime<Utc>,
}

/// Covers both the stale-detected and resumed-transition events: the latter is the same payload
/// shape with `stale = false` (spec.md §4.7: "on resumption, emit a non-stale transition event"
/// — the catalog has no separate event type for it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataStaleDetected {
    pub instrument_id: String,
    pub source: String,
    pub stale: bool,
    pub last_tick_at: Option<DateTime<Utc>>,
}
