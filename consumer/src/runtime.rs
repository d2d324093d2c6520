//! The per-event handling protocol from spec.md §4.3: claim via the processed-event log,
//! apply the handler's business action in the same transaction, retry transient failures with
//! backoff, and route poison events (or exhausted retries) to the DLQ.

use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;

use orion_core::event::EventEnvelope;

use crate::{
    config::ConsumerConfig,
    dedup, dlq,
    error::{ConsumerError, HandlerFailure},
    handler::ConsumerHandler,
    sequence::{SequencePosition, SequenceTracker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler's business action was applied (first delivery).
    Applied,
    /// The dedup claim found an existing row; the event was skipped (redelivery).
    Duplicate,
    /// The event was routed to the DLQ, either as poison or after exhausting retries.
    DeadLettered,
}

/// Processes a single envelope for one consumer group end-to-end.
pub async fn process_event(
    pool: &PgPool,
    config: &ConsumerConfig,
    handler: &(dyn ConsumerHandler),
    envelope: &EventEnvelope<Value>,
    sequences: &SequenceTracker,
) -> Result<Outcome, ConsumerError> {
    if let SequencePosition::Gap { expected, got } = sequences.check(
        &envelope.entity.entity_type,
        &envelope.entity.entity_id,
        envelope.entity.sequence,
    ) {
        tokio::time::sleep(config.gap_wait).await;

        if let SequencePosition::Gap { .. } = sequences.check(
            &envelope.entity.entity_type,
            &envelope.entity.entity_id,
            envelope.entity.sequence,
        ) {
            warn!(
                entity_type = %envelope.entity.entity_type,
                entity_id = %envelope.entity.entity_id,
                expected,
                got,
                "sequence gap did not resolve within bounded wait; treating as lost"
            );
            dlq::route_to_dlq(
                pool,
                &config.consumer_group,
                &config.consumer_version,
                envelope,
                &format!("sequence gap: expected {expected}, got {got}"),
            )
            .await?;
            return Ok(Outcome::DeadLettered);
        }
    }

    let mut attempt = 0usize;

    loop {
        let mut tx = pool.begin().await?;

        let claimed = dedup::try_claim(
            &mut tx,
            &envelope.tenant_id,
            &config.consumer_group,
            envelope.event_id,
            envelope.event_type.as_str(),
        )
        .await?;

        if !claimed {
            tx.commit().await?;
            return Ok(Outcome::Duplicate);
        }

        match handler.handle(&mut tx, envelope).await {
            Ok(()) => {
                tx.commit().await?;
                sequences.advance(
                    &envelope.entity.entity_type,
                    &envelope.entity.entity_id,
                    envelope.entity.sequence,
                );
                return Ok(Outcome::Applied);
            }
            Err(HandlerFailure::Poison(reason)) => {
                tx.rollback().await?;
                dlq::route_to_dlq(
                    pool,
                    &config.consumer_group,
                    &config.consumer_version,
                    envelope,
                    &reason,
                )
                .await?;
                return Ok(Outcome::DeadLettered);
            }
            Err(HandlerFailure::Transient(reason)) => {
                tx.rollback().await?;

                let Some(backoff) = config.retry_backoff.get(attempt).copied() else {
                    dlq::route_to_dlq(
                        pool,
                        &config.consumer_group,
                        &config.consumer_version,
                        envelope,
                        &reason,
                    )
                    .await?;
                    return Ok(Outcome::DeadLettered);
                };

                warn!(
                    event_id = %envelope.event_id,
                    attempt,
                    backoff_ms = %backoff.as_millis(),
                    error = reason,
                    "transient consumer failure, retrying after backoff"
                );
                attempt += 1;
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
