//! Row types for `outbox_events` and `dlq_outbox` (spec.md §4.8 persisted state layout).

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A single outbox row. `id` is the monotonic primary key used for ordering within a shard;
/// `event_id` is the envelope's globally-unique id and what downstream idempotent consumers key
/// their dedup on.
#[derive(Debug, Clone, FromRow)]
pub struct OutboxRow {
    pub id: i64,
    pub event_id: Uuid,
    pub tenant_id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub retry_count: i32,
    pub last_error: Option<String>,
}

/// A row that exhausted `RelayConfig::max_retries` and was moved off the hot path.
#[derive(Debug, Clone, FromRow)]
pub struct DeadLetterRow {
    pub id: i64,
    pub tenant_id: String,
    pub consumer_group: String,
    pub original_event_id: Uuid,
    pub payload: Value,
    pub failed_at: DateTime<Utc>,
    pub reason: String,
    pub attempts: i32,
}
