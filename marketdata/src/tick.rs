//! The canonical tick schema (C7, spec.md §4.7) and the normalization pass every ingestion mode
//! converges on.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    Simulated,
    Replay,
    Adapter,
}

/// A single market data observation, already in canonical form. `source_time` is the
/// venue/adapter-reported timestamp; `ingested_at` is stamped on arrival and drives staleness
/// and late-tick detection.
#[derive(Debug, Clone, PartialEq, derive_more::Constructor)]
pub struct RawTick {
    pub instrument_id: SmolStr,
    pub source: SmolStr,
    pub bid: Decimal,
    pub ask: Decimal,
    pub source_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub instrument_id: SmolStr,
    pub source: SmolStr,
    pub bid: Decimal,
    pub ask: Decimal,
    pub source_time: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    /// Set when `source_time` trails the latest known `source_time` for this instrument by more
    /// than the configured out-of-order threshold (spec.md §4.7, default 1 s).
    pub late: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TickValidationError {
    #[error("instrument id must not be blank")]
    BlankInstrument,
    #[error("bid must not exceed ask")]
    BidAboveAsk,
}

/// Validates a raw tick against spec.md §4.7's normalization rules. Malformed ticks are dropped
/// by the caller (with a counter increment), never propagated — this function only classifies.
pub fn validate(raw: &RawTick) -> Result<(), TickValidationError> {
    if raw.instrument_id.trim().is_empty() {
        return Err(TickValidationError::BlankInstrument);
    }
    if raw.bid > raw.ask {
        return Err(TickValidationError::BidAboveAsk);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(bid: Decimal, ask: Decimal) -> RawTick {
        RawTick {
            instrument_id: "EURUSD".into(),
            source: "sim".into(),
            bid,
            ask,
            source_time: Utc::now(),
        }
    }

    #[test]
    fn rejects_bid_above_ask() {
        assert_eq!(
            validate(&raw(dec!(1.1010), dec!(1.1000))),
            Err(TickValidationError::BidAboveAsk)
        );
    }

    #[test]
    fn accepts_bid_at_or_below_ask() {
        assert!(validate(&raw(dec!(1.1000), dec!(1.1000))).is_ok());
    }
}
