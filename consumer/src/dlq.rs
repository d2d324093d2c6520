//! Dead-letter routing. A DLQ row carries the original envelope, an error summary, the consumer
//! version, and a timestamp (spec.md §4.3), so operator tooling can inspect and selectively
//! replay into the original topic or a fix-and-forward topic.

use chrono::{DateTime, Utc};
use orion_core::event::EventEnvelope;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DlqRow {
    pub id: i64,
    pub tenant_id: String,
    pub consumer_group: String,
    pub event_id: Uuid,
    pub envelope: Value,
    pub error_summary: String,
    pub consumer_version: String,
    pub failed_at: DateTime<Utc>,
    pub replayed_at: Option<DateTime<Utc>>,
}

pub async fn route_to_dlq<P: Serialize>(
    pool: &PgPool,
    consumer_group: &str,
    consumer_version: &str,
    envelope: &EventEnvelope<P>,
    error_summary: &str,
) -> Result<(), sqlx::Error> {
    let envelope_json = serde_json::to_value(envelope)
        .unwrap_or_else(|err| serde_json::json!({ "serialization_error": err.to_string() }));

    sqlx::query(
        r#"
        INSERT INTO dlq_consumer
            (tenant_id, consumer_group, event_id, envelope, error_summary, consumer_version, failed_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        "#,
    )
    .bind(&envelope.tenant_id)
    .bind(consumer_group)
    .bind(envelope.event_id)
    .bind(envelope_json)
    .bind(error_summary)
    .bind(consumer_version)
    .execute(pool)
    .await?;

    tracing::error!(
        event_id = %envelope.event_id,
        consumer_group,
        error = error_summary,
        "event routed to consumer dead-letter queue"
    );

    Ok(())
}

/// Lists DLQ rows awaiting operator triage for a consumer group, oldest first.
pub async fn list_pending(pool: &PgPool, consumer_group: &str) -> Result<Vec<DlqRow>, sqlx::Error> {
    sqlx::query_as::<_, DlqRow>(
        r#"
        SELECT id, tenant_id, consumer_group, event_id, envelope, error_summary,
               consumer_version, failed_at, replayed_at
        FROM dlq_consumer
        WHERE consumer_group = $1 AND replayed_at IS NULL
        ORDER BY failed_at ASC
        "#,
    )
    .bind(consumer_group)
    .fetch_all(pool)
    .await
}

/// Marks a DLQ row as replayed, after an operator has re-submitted its envelope to the original
/// (or a fix-and-forward) topic.
pub async fn mark_replayed(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE dlq_consumer SET replayed_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
