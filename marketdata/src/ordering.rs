//! Per-instrument partitioning and ordering (C7, spec.md §4.7): ticks are processed on a
//! per-instrument partition so ordering only needs to hold within an instrument, not globally.
//! A tick whose `source_time` trails the latest seen `source_time` for that instrument by more
//! than the out-of-order threshold (default 1 s) is flagged late but still delivered.

use std::collections::HashMap;

use chrono::Duration;
use smol_str::SmolStr;

use crate::tick::{RawTick, Tick};

pub const DEFAULT_LATE_THRESHOLD: Duration = Duration::seconds(1);

/// Tracks, per `instrumentId`, the latest `source_time` observed so far and flags ticks that
/// arrive materially out of order.
#[derive(Debug, Default)]
pub struct OrderingTracker {
    latest_source_time: HashMap<SmolStr, chrono::DateTime<chrono::Utc>>,
    threshold: Option<Duration>,
}

impl OrderingTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            latest_source_time: HashMap::new(),
            threshold: Some(threshold),
        }
    }

    fn threshold(&self) -> Duration {
        self.threshold.unwrap_or(DEFAULT_LATE_THRESHOLD)
    }

    /// Admits a raw tick onto its instrument's partition, stamping `ingested_at` and `late`.
    /// The instrument's high-water mark only advances forward; a late tick never rewinds it.
    pub fn admit(&mut self, raw: RawTick, now: chrono::DateTime<chrono::Utc>) -> Tick {
        let watermark = self.latest_source_time.get(&raw.instrument_id).copied();
        let late = watermark.is_some_and(|w| w - raw.source_time > self.threshold());

        let advanced = watermark.map_or(true, |w| raw.source_time > w);
        if advanced {
            self.latest_source_time
                .insert(raw.instrument_id.clone(), raw.source_time);
        }

        Tick {
            instrument_id: raw.instrument_id,
            source: raw.source,
            bid: raw.bid,
            ask: raw.ask,
            source_time: raw.source_time,
            ingested_at: now,
            late,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(instrument: &str, source_time: chrono::DateTime<chrono::Utc>) -> RawTick {
        RawTick {
            instrument_id: instrument.into(),
            source: "sim".into(),
            bid: dec!(1.1000),
            ask: dec!(1.1002),
            source_time,
        }
    }

    #[test]
    fn in_order_ticks_are_not_late() {
        let mut tracker = OrderingTracker::new(Duration::seconds(1));
        let t0 = chrono::Utc::now();
        let first = tracker.admit(raw("EURUSD", t0), t0);
        let second = tracker.admit(raw("EURUSD", t0 + Duration::milliseconds(500)), t0);
        assert!(!first.late);
        assert!(!second.late);
    }

    #[test]
    fn tick_trailing_watermark_beyond_threshold_is_late() {
        let mut tracker = OrderingTracker::new(Duration::seconds(1));
        let t0 = chrono::Utc::now();
        tracker.admit(raw("EURUSD", t0 + Duration::seconds(5)), t0);
        let late_tick = tracker.admit(raw("EURUSD", t0), t0);
        assert!(late_tick.late);
    }

    #[test]
    fn different_instruments_are_independent_partitions() {
        let mut tracker = OrderingTracker::new(Duration::seconds(1));
        let t0 = chrono::Utc::now();
        tracker.admit(raw("EURUSD", t0 + Duration::seconds(5)), t0);
        let other = tracker.admit(raw("GBPUSD", t0), t0);
        assert!(!other.late);
    }
}
