//! `relayLoop`: continuously claims the oldest unpublished rows (`FOR UPDATE SKIP LOCKED`),
//! publishes each to the log keyed by `entity.entityId`, and on ack marks it published. On
//! failure it backs off exponentially and, after `max_retries`, routes the row to the
//! dead-letter table (spec.md §4.2). Grounded on the identity-service outbox consumer's poll /
//! backoff / DLQ shape.

use std::time::Duration;

use chrono::Utc;
use orion_core::logging::POLL_LOOP_SPAN_NAME;
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    config::{calculate_backoff, RelayConfig},
    error::{OutboxError, PublishError},
    row::OutboxRow,
};

/// Publishes a single outbox row to the event log. Implementations are transport-specific
/// (Kafka, a managed stream, an in-process broadcast for tests); the relay only needs to know
/// whether the publish succeeded.
#[async_trait::async_trait]
pub trait LogPublisher: Send + Sync {
    async fn publish(&self, partition_key: &str, envelope_json: &str) -> Result<(), PublishError>;
}

#[async_trait::async_trait]
impl LogPublisher for Box<dyn LogPublisher> {
    async fn publish(&self, partition_key: &str, envelope_json: &str) -> Result<(), PublishError> {
        (**self).publish(partition_key, envelope_json).await
    }
}

/// Runs the relay loop until `shutdown` is signalled. Each iteration claims a batch, publishes
/// it, and sleeps `poll_interval` if the batch was empty.
pub async fn relay_loop(
    pool: PgPool,
    publisher: impl LogPublisher,
    config: RelayConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        batch_size = config.batch_size,
        poll_interval_ms = %config.poll_interval.as_millis(),
        max_retries = config.max_retries,
        "starting outbox relay"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        let span = tracing::info_span!(parent: None, "outbox_relay", name = POLL_LOOP_SPAN_NAME);
        let claimed = {
            let _guard = span.enter();
            claim_batch(&pool, config.batch_size).await
        };

        let rows = match claimed {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "failed to claim outbox batch");
                tokio::select! {
                    _ = tokio::time::sleep(config.poll_interval) => {}
                    _ = shutdown.changed() => {}
                }
                continue;
            }
        };

        if rows.is_empty() {
            tokio::select! {
                _ = tokio::time::sleep(config.poll_interval) => {}
                _ = shutdown.changed() => {}
            }
            continue;
        }

        for row in rows {
            process_row(&pool, &publisher, &config, row).await;
        }
    }

    info!("outbox relay stopped");
}

async fn claim_batch(pool: &PgPool, batch_size: i64) -> Result<Vec<OutboxRow>, OutboxError> {
    let rows = sqlx::query_as::<_, OutboxRow>(
        r#"
        SELECT id, event_id, tenant_id, entity_type, entity_id, payload,
               created_at, published_at, retry_count, last_error
        FROM outbox_events
        WHERE published_at IS NULL
        ORDER BY id ASC
        LIMIT $1
        FOR UPDATE SKIP LOCKED
        "#,
    )
    .bind(batch_size)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn process_row(
    pool: &PgPool,
    publisher: &impl LogPublisher,
    config: &RelayConfig,
    row: OutboxRow,
) {
    let span = tracing::info_span!(
        "outbox_event",
        event_id = %row.event_id,
        entity_type = %row.entity_type,
        entity_id = %row.entity_id,
        retry_count = row.retry_count,
    );
    let _guard = span.enter();

    let partition_key = &row.entity_id;
    let envelope_json = row.payload.to_string();

    match publisher.publish(partition_key, &envelope_json).await {
        Ok(()) => {
            if let Err(err) = mark_published(pool, row.id).await {
                error!(error = %err, "failed to mark outbox row published");
            }
        }
        Err(failure) => {
            warn!(error = %failure, attempt = row.retry_count + 1, "outbox publish failed");

            if row.retry_count + 1 >= config.max_retries {
                if let Err(err) = route_to_dead_letter(pool, config, &row, &failure).await {
                    error!(error = %err, "failed to move outbox row to dead-letter table");
                }
                return;
            }

            let backoff = calculate_backoff(
                config.backoff_base,
                config.backoff_factor,
                config.backoff_cap,
                row.retry_count,
            );
            if backoff > Duration::ZERO {
                debug!(backoff_ms = %backoff.as_millis(), "backing off before outbox retry");
                tokio::time::sleep(backoff).await;
            }

            if let Err(err) = increment_retry(pool, row.id, &failure.0).await {
                error!(error = %err, "failed to record outbox retry");
            }
        }
    }
}

async fn mark_published(pool: &PgPool, id: i64) -> Result<(), OutboxError> {
    sqlx::query("UPDATE outbox_events SET published_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn increment_retry(pool: &PgPool, id: i64, last_error: &str) -> Result<(), OutboxError> {
    sqlx::query(
        "UPDATE outbox_events SET retry_count = retry_count + 1, last_error = $2 WHERE id = $1",
    )
    .bind(id)
    .bind(last_error)
    .execute(pool)
    .await?;
    Ok(())
}

/// Moves a row that exhausted its retries to `dlq_outbox` and marks it published so it no
/// longer blocks the unpublished-rows partial index, then emits an operator alert (spec.md
/// §4.2: "route the row to a dead-letter table ... and emit an operator alert").
async fn route_to_dead_letter(
    pool: &PgPool,
    config: &RelayConfig,
    row: &OutboxRow,
    failure: &PublishError,
) -> Result<(), OutboxError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO dlq_outbox
            (tenant_id, consumer_group, original_event_id, payload, failed_at, reason, attempts)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&row.tenant_id)
    .bind(config.dlq_consumer_group)
    .bind(row.event_id)
    .bind(&row.payload)
    .bind(Utc::now())
    .bind(&failure.0)
    .bind(row.retry_count + 1)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE outbox_events SET published_at = NOW(), retry_count = retry_count + 1, last_error = $2 WHERE id = $1")
        .bind(row.id)
        .bind(&failure.0)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    error!(
        event_id = %row.event_id,
        tenant_id = %row.tenant_id,
        attempts = row.retry_count + 1,
        "outbox row routed to dead-letter table after exhausting retries"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFails;

    #[async_trait::async_trait]
    impl LogPublisher for AlwaysFails {
        async fn publish(&self, _key: &str, _json: &str) -> Result<(), PublishError> {
            Err(PublishError::new("simulated transport failure"))
        }
    }

    #[test]
    fn dlq_threshold_is_reached_at_configured_max_retries() {
        let config = RelayConfig::default();
        assert_eq!(config.max_retries, 10);
        // retry_count starts at 0; the row is dead-lettered once `retry_count + 1 >= max_retries`.
        assert!(9 + 1 >= config.max_retries);
        assert!(8 + 1 < config.max_retries);
    }
}
