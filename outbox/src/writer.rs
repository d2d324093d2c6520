//! `writeTransactional`: within a single DB transaction, applies a state mutation and inserts
//! each event envelope as an outbox row keyed by `eventId`. Fails atomically (spec.md §4.2).

use std::{future::Future, pin::Pin};

use orion_core::event::EventEnvelope;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::OutboxError;

pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, OutboxError>> + Send + 'a>>;

/// Applies `state_mutation` and persists `events` as outbox rows in one transaction.
///
/// `state_mutation` receives the open transaction so the aggregate's row writes and the outbox
/// inserts share the same commit — the core guarantee behind "exactly one outbox row per
/// intended event" (spec.md §4.2 invariant i).
pub async fn write_transactional<P, T>(
    pool: &PgPool,
    events: &[EventEnvelope<P>],
    state_mutation: impl for<'a> FnOnce(&'a mut Transaction<'_, Postgres>) -> TxFuture<'a, T>,
) -> Result<T, OutboxError>
where
    P: Serialize,
{
    let mut tx = pool.begin().await?;

    let result = state_mutation(&mut tx).await?;

    for event in events {
        insert_event(&mut tx, event).await?;
    }

    tx.commit().await?;
    Ok(result)
}

async fn insert_event<P: Serialize>(
    tx: &mut Transaction<'_, Postgres>,
    event: &EventEnvelope<P>,
) -> Result<(), OutboxError> {
    let payload = serde_json::to_value(&event.payload)?;

    sqlx::query(
        r#"
        INSERT INTO outbox_events
            (event_id, tenant_id, entity_type, entity_id, payload, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (event_id) DO NOTHING
        "#,
    )
    .bind(event.event_id)
    .bind(&event.tenant_id)
    .bind(&event.entity.entity_type)
    .bind(&event.entity.entity_id)
    .bind(payload)
    .bind(event.occurred_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
