//! Fixture builders shared by this crate's and the workspace's other crates' test suites.
//!
//! Kept deliberately small: each aggregate crate (`orion-rfq`, `orion-execution`, ...) grows its
//! own fixtures for its own domain types; this module only covers what's generic across all of
//! them (envelopes, correlation, time arithmetic).

use crate::{
    command::Side,
    context::Correlation,
    event::{Entity, EventEnvelope, EventType},
};
use chrono::{DateTime, Days, TimeDelta, Utc};
use serde_json::{json, Value};

pub fn time_plus_days(base: DateTime<Utc>, plus: u64) -> DateTime<Utc> {
    base.checked_add_days(Days::new(plus)).unwrap()
}

pub fn time_plus_secs(base: DateTime<Utc>, plus: i64) -> DateTime<Utc> {
    base.checked_add_signed(TimeDelta::seconds(plus)).unwrap()
}

pub fn time_plus_millis(base: DateTime<Utc>, plus: i64) -> DateTime<Utc> {
    base.checked_add_signed(TimeDelta::milliseconds(plus))
        .unwrap()
}

/// Builds a root envelope with a throwaway JSON payload, for tests that only care about
/// envelope-level behaviour (sequencing, correlation, serde) rather than a specific payload.
pub fn envelope(event_type: EventType, entity_type: &str, entity_id: &str, sequence: u64) -> EventEnvelope<Value> {
    EventEnvelope::create(
        event_type,
        "test-producer",
        "tenant-test",
        Entity::new(entity_type, entity_id, sequence),
        json!({}),
    )
}

pub fn correlation() -> Correlation {
    Correlation::root("tenant-test")
}

pub fn side_buy() -> Side {
    Side::Buy
}

pub fn side_sell() -> Side {
    Side::Sell
}
