//! The processed-event log: `(tenantId, consumerGroup, eventId)` as the unique key (spec.md
//! §4.3 step 2). The uniqueness constraint itself is the dedup check — no read-then-write race.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Attempts to claim `event_id` for `(tenant_id, consumer_group)`. Returns `true` if this call
/// inserted the row (the event has not been processed by this consumer group before), `false`
/// if a row already existed (duplicate delivery — safe to skip).
pub async fn try_claim(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: &str,
    consumer_group: &str,
    event_id: Uuid,
    event_type: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO processed_events (tenant_id, consumer_group, event_id, event_type, processed_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (tenant_id, consumer_group, event_id) DO NOTHING
        "#,
    )
    .bind(tenant_id)
    .bind(consumer_group)
    .bind(event_id)
    .bind(event_type)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}
