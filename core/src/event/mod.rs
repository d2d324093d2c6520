//! # Event envelope & catalog (C1)
//!
//! A single canonical, versioned, serializable envelope for every domain event produced by the
//! Trading Event Core. See spec.md §3 ("Event envelope") and §4.1.

pub mod catalog;

pub use catalog::EventType;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// `entity.causationId` sentinel for an event that is the root of its own causal chain.
pub const DIRECT: &str = "direct";

/// The `(entityType, entityId, sequence)` triple an event is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(rename = "entityId")]
    pub entity_id: String,
    pub sequence: u64,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>, sequence: u64) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            sequence,
        }
    }
}

/// `causationId`: either the eventId of a parent event/command, or the [`DIRECT`] sentinel for
/// a root event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CausationId {
    Direct,
    Event(Uuid),
}

impl fmt::Display for CausationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str(DIRECT),
            Self::Event(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for CausationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CausationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == DIRECT {
            Ok(Self::Direct)
        } else {
            Uuid::parse_str(&raw)
                .map(Self::Event)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// Serializes/deserializes `DateTime<Utc>` as ISO-8601 with millisecond precision, matching the
/// wire format in spec.md §6 (`"occurredAt":"2026-02-09T12:34:56.789Z"`).
mod millis_time {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// The canonical, immutable-once-written event envelope.
///
/// `P` is the event-type-specific payload. Consumers that only need to route on `eventType`
/// (eg/ the outbox relay) should use `EventEnvelope<serde_json::Value>`; typed consumers
/// deserialize `payload` into their own type after matching on `event_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<P> {
    #[serde(rename = "eventId")]
    pub event_id: Uuid,
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    #[serde(rename = "eventVersion")]
    pub event_version: u32,
    #[serde(rename = "occurredAt", with = "millis_time")]
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub producer: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    #[serde(rename = "correlationId")]
    pub correlation_id: Uuid,
    #[serde(rename = "causationId")]
    pub causation_id: CausationId,
    pub entity: Entity,
    pub payload: P,
}

/// A single violation surfaced by [`EventEnvelope::validate`]. `validate` returns *all*
/// violations at once (spec.md §4.1), never just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct EnvelopeViolation {
    pub field: &'static str,
    pub reason: &'static str,
}

impl<P> EventEnvelope<P> {
    /// Creates a new root envelope: fresh `eventId`, `occurredAt = now`, `eventVersion = 1`,
    /// a fresh `correlationId`, and `causationId = "direct"`.
    pub fn create(
        event_type: EventType,
        producer: impl Into<String>,
        tenant_id: impl Into<String>,
        entity: Entity,
        payload: P,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            event_version: 1,
            occurred_at: chrono::Utc::now(),
            producer: producer.into(),
            tenant_id: tenant_id.into(),
            correlation_id: Uuid::new_v4(),
            causation_id: CausationId::Direct,
            entity,
            payload,
        }
    }

    /// Creates a new envelope that inherits `correlationId` and `tenantId` from `parent`, with
    /// `causationId` set to the parent's `eventId`.
    pub fn create_child<Q>(
        parent: &EventEnvelope<Q>,
        event_type: EventType,
        producer: impl Into<String>,
        entity: Entity,
        payload: P,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            event_version: 1,
            occurred_at: chrono::Utc::now(),
            producer: producer.into(),
            tenant_id: parent.tenant_id.clone(),
            correlation_id: parent.correlation_id,
            causation_id: CausationId::Event(parent.event_id),
            entity,
            payload,
        }
    }

    /// Returns every invariant violation found, rather than failing fast on the first one
    /// (spec.md §4.1: "returns all violations at once").
    pub fn validate(&self) -> Vec<EnvelopeViolation> {
        let mut violations = Vec::new();

        if self.producer.trim().is_empty() {
            violations.push(EnvelopeViolation {
                field: "producer",
                reason: "must not be blank",
            });
        }
        if self.tenant_id.trim().is_empty() {
            violations.push(EnvelopeViolation {
                field: "tenantId",
                reason: "must not be blank",
            });
        }
        if self.event_version < 1 {
            violations.push(EnvelopeViolation {
                field: "eventVersion",
                reason: "must be >= 1",
            });
        }
        if self.entity.entity_id.trim().is_empty() {
            violations.push(EnvelopeViolation {
                field: "entity.entityId",
                reason: "must not be blank",
            });
        }
        if self.entity.entity_type.trim().is_empty() {
            violations.push(EnvelopeViolation {
                field: "entity.entityType",
                reason: "must not be blank",
            });
        }

        violations
    }
}

impl<P> EventEnvelope<P>
where
    P: Serialize,
{
    /// Serializes the envelope to its canonical wire JSON (spec.md §6).
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<P> EventEnvelope<P>
where
    P: for<'de> Deserialize<'de>,
{
    /// Deserializes an envelope from its canonical wire JSON. Unknown `payload` fields are
    /// ignored by `serde_json` by default, honouring the forward-compatibility rule.
    pub fn deserialize(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity() -> Entity {
        Entity::new("Trade", "t-123", 7)
    }

    #[test]
    fn create_populates_defaults() {
        let env = EventEnvelope::create(
            EventType::TradeExecuted,
            "execution-service",
            "tenant-001",
            entity(),
            json!({"qty": "1000000"}),
        );
        assert_eq!(env.event_version, 1);
        assert_eq!(env.causation_id, CausationId::Direct);
        assert!(env.validate().is_empty());
    }

    #[test]
    fn create_child_inherits_correlation_and_tenant() {
        let parent = EventEnvelope::create(
            EventType::QuoteAccepted,
            "rfq-service",
            "tenant-001",
            entity(),
            json!({}),
        );
        let child = EventEnvelope::create_child(
            &parent,
            EventType::TradeExecuted,
            "execution-service",
            entity(),
            json!({}),
        );
        assert_eq!(child.tenant_id, parent.tenant_id);
        assert_eq!(child.correlation_id, parent.correlation_id);
        assert_eq!(child.causation_id, CausationId::Event(parent.event_id));
    }

    #[test]
    fn validate_reports_all_violations_not_just_first() {
        let mut env = EventEnvelope::create(
            EventType::TradeExecuted,
            "",
            "",
            Entity::new("", "", 1),
            json!({}),
        );
        env.event_version = 0;
        let violations = env.validate();
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn serde_round_trip_preserves_millisecond_timestamp() {
        let env = EventEnvelope::create(
            EventType::TradeExecuted,
            "execution-service",
            "tenant-001",
            entity(),
            json!({"k": "v"}),
        );
        let json = env.serialize().unwrap();
        assert!(json.contains("\"eventType\":\"TradeExecuted\""));
        let back = EventEnvelope::<serde_json::Value>::deserialize(&json).unwrap();
        assert_eq!(back.event_id, env.event_id);
        assert_eq!(back.occurred_at, env.occurred_at);
    }

    #[test]
    fn unknown_payload_fields_are_ignored_on_read() {
        let json = r#"{
            "eventId":"6c9f2a0a-6f2b-4a8a-9d2c-2f6a5c6c0a01",
            "eventType":"TradeExecuted",
            "eventVersion":1,
            "occurredAt":"2026-02-09T12:34:56.789Z",
            "producer":"execution-service",
            "tenantId":"tenant-001",
            "correlationId":"6c9f2a0a-6f2b-4a8a-9d2c-2f6a5c6c0a02",
            "causationId":"direct",
            "entity":{"entityType":"Trade","entityId":"t-123","sequence":7},
            "payload":{"qty":"1000000","futureField":"ignored"}
        }"#;
        let env = EventEnvelope::<serde_json::Value>::deserialize(json).unwrap();
        assert_eq!(env.event_type, EventType::TradeExecuted);
    }
}
