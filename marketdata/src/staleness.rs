//! Staleness heartbeat tracking (C7, spec.md §4.7): per `(instrumentId, source)`, if no tick
//! arrives within the configured threshold, emit `MarketDataStaleDetected`; on resumption, emit
//! the non-stale transition.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use orion_core::{
    context::Correlation,
    event::{Entity, EventEnvelope, EventType},
};
use uuid::Uuid;

use crate::payloads::MarketDataStaleDetected;

pub const PRODUCER: &str = "orion-marketdata";

pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::seconds(5);

#[derive(Debug, Clone, Copy)]
struct Heartbeat {
    last_tick_at: DateTime<Utc>,
    stale: bool,
}

#[derive(Debug, Default)]
pub struct StalenessTracker {
    heartbeats: HashMap<(String, String), Heartbeat>,
    threshold: Option<Duration>,
}

impl StalenessTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            heartbeats: HashMap::new(),
            threshold: Some(threshold),
        }
    }

    fn threshold(&self) -> Duration {
        self.threshold.unwrap_or(DEFAULT_STALE_THRESHOLD)
    }

    /// Records a tick's arrival, clearing stale status and returning a resumption event if the
    /// `(instrumentId, source)` pair had previously been flagged stale.
    pub fn record_tick(
        &mut self,
        correlation: &Correlation,
        instrument_id: &str,
        source: &str,
        now: DateTime<Utc>,
    ) -> Option<EventEnvelope<MarketDataStaleDetected>> {
        let key = (instrument_id.to_string(), source.to_string());
        let was_stale = self.heartbeats.get(&key).is_some_and(|h| h.stale);
        self.heartbeats.insert(
            key,
            Heartbeat {
                last_tick_at: now,
                stale: false,
            },
        );

        was_stale.then(|| {
            envelope(
                correlation,
                instrument_id,
                source,
                MarketDataStaleDetected {
                    instrument_id: instrument_id.to_string(),
                    source: source.to_string(),
                    stale: false,
                    last_tick_at: Some(now),
                },
            )
        })
    }

    /// Scans all tracked pairs for staleness as of `now`, flagging any that just crossed the
    /// threshold and returning their events. Already-stale pairs are not re-emitted.
    pub fn scan(&mut self, correlation: &Correlation, now: DateTime<Utc>) -> Vec<EventEnvelope<MarketDataStaleDetected>> {
        let threshold = self.threshold();
        let mut events = Vec::new();
        for ((instrument_id, source), heartbeat) in self.heartbeats.iter_mut() {
            if !heartbeat.stale && now - heartbeat.last_tick_at > threshold {
                heartbeat.stale = true;
                events.push(envelope(
                    correlation,
                    instrument_id,
                    source,
                    MarketDataStaleDetected {
                        instrument_id: instrument_id.clone(),
                        source: source.clone(),
                        stale: true,
                        last_tick_at: Some(heartbeat.last_tick_at),
                    },
                ));
            }
        }
        events
    }
}

fn envelope(
    correlation: &Correlation,
    instrument_id: &str,
    source: &str,
    payload: MarketDataStaleDetected,
) -> EventEnvelope<MarketDataStaleDetected> {
    EventEnvelope {
        event_id: Uuid::new_v4(),
        event_type: EventType::MarketDataStaleDetected,
        event_version: 1,
        occurred_at: Utc::now(),
        producer: PRODUCER.to_string(),
        tenant_id: correlation.tenant_id.clone(),
        correlation_id: correlation.correlation_id,
        causation_id: correlation.causation_id.clone(),
        entity: Entity::new("MarketDataSource", format!("{instrument_id}:{source}"), 1),
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlation() -> Correlation {
        Correlation::root("tenant-1")
    }

    #[test]
    fn scan_flags_stale_after_threshold() {
        let mut tracker = StalenessTracker::new(Duration::seconds(5));
        let t0 = Utc::now();
        tracker.record_tick(&correlation(), "EURUSD", "sim", t0);

        let events = tracker.scan(&correlation(), t0 + Duration::seconds(10));
        assert_eq!(events.len(), 1);
        assert!(events[0].payload.stale);
    }

    #[test]
    fn resumption_after_stale_emits_non_stale_transition() {
        let mut tracker = StalenessTracker::new(Duration::seconds(5));
        let t0 = Utc::now();
        tracker.record_tick(&correlation(), "EURUSD", "sim", t0);
        tracker.scan(&correlation(), t0 + Duration::seconds(10));

        let resumed = tracker.record_tick(&correlation(), "EURUSD", "sim", t0 + Duration::seconds(11));
        assert!(resumed.is_some());
        assert!(!resumed.unwrap().payload.stale);
    }
}
