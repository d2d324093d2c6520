//! Execution & post-trade saga (C6, spec.md §4.6): trade creation on `QuoteAccepted`, trade
//! confirmation, and the settlement retry state machine.

use chrono::{DateTime, Duration, Utc};
use orion_core::{
    command::Side,
    context::Correlation,
    event::{Entity, EventEnvelope, EventType},
};
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::SagaError,
    payloads::{SettlementCompleted, SettlementFailed, SettlementRequested, TradeConfirmed, TradeExecuted},
};

pub const PRODUCER: &str = "orion-execution";

fn envelope<P>(correlation: &Correlation, event_type: EventType, entity: Entity, payload: P) -> EventEnvelope<P> {
    EventEnvelope {
        event_id: Uuid::new_v4(),
        event_type,
        event_version: 1,
        occurred_at: Utc::now(),
        producer: PRODUCER.to_string(),
        tenant_id: correlation.tenant_id.clone(),
        correlation_id: correlation.correlation_id,
        causation_id: correlation.causation_id.clone(),
        entity,
        payload,
    }
}

#[derive(Debug, Clone)]
pub struct Trade {
    pub trade_id: String,
    pub rfq_id: String,
    pub accepted_quote_id: String,
    pub instrument_id: String,
    pub side: Side,
    pub size: Decimal,
    pub price: Decimal,
    pub executed_at: DateTime<Utc>,
}

/// Creates a `Trade` for an accepted quote. The `(rfqId, acceptedQuoteId)` uniqueness is
/// enforced by the repository's alternate unique key at insert time (spec.md §4.6): a duplicate
/// insert attempt is rejected there as [`SagaError::DuplicateTrade`], not here — this
/// constructor is pure and cannot itself observe prior trades.
#[allow(clippy::too_many_arguments)]
pub fn create_trade(
    trade_id: String,
    correlation: &Correlation,
    rfq_id: String,
    accepted_quote_id: String,
    instrument_id: String,
    side: Side,
    size: Decimal,
    price: Decimal,
    now: DateTime<Utc>,
) -> (Trade, EventEnvelope<TradeExecuted>) {
    let trade = Trade {
        trade_id: trade_id.clone(),
        rfq_id: rfq_id.clone(),
        accepted_quote_id: accepted_quote_id.clone(),
        instrument_id: instrument_id.clone(),
        side,
        size,
        price,
        executed_at: now,
    };
    let event = envelope(
        correlation,
        EventType::TradeExecuted,
        Entity::new("Trade", &trade_id, 1),
        TradeExecuted {
            trade_id,
            rfq_id,
            accepted_quote_id,
            instrument_id,
            side,
            size,
            price,
            executed_at: now,
        },
    );
    (trade, event)
}

pub fn confirm_trade(
    trade: &Trade,
    correlation: &Correlation,
    confirmation: Value,
) -> EventEnvelope<TradeConfirmed> {
    envelope(
        correlation,
        EventType::TradeConfirmed,
        Entity::new("Trade", &trade.trade_id, 2),
        TradeConfirmed {
            trade_id: trade.trade_id.clone(),
            confirmation,
        },
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStatus {
    Pending,
    Settling,
    Settled,
    Failed,
    Retrying,
    FailedFinal,
}

/// Per-venue settlement retry configuration (spec.md §4.6: "configurable per venue").
#[derive(Debug, Clone, Copy)]
pub struct SettlementConfig {
    pub backoff_base: Duration,
    pub backoff_factor: u32,
    pub backoff_max: Duration,
    pub max_attempts: u32,
    /// Probability in `[0, 1]` that a simulated settlement attempt fails, for resilience
    /// testing (spec.md §4.6).
    pub failure_probability: f64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            backoff_base: Duration::seconds(5),
            backoff_factor: 2,
            backoff_max: Duration::seconds(300),
            max_attempts: 3,
            failure_probability: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub settlement_id: String,
    pub trade_id: String,
    pub venue: String,
    pub status: SettlementStatus,
    pub attempt: u32,
    pub updated_at: DateTime<Utc>,
}

pub fn request_settlement(
    settlement_id: String,
    correlation: &Correlation,
    trade: &Trade,
    venue: String,
    now: DateTime<Utc>,
) -> (Settlement, EventEnvelope<SettlementRequested>) {
    let settlement = Settlement {
        settlement_id: settlement_id.clone(),
        trade_id: trade.trade_id.clone(),
        venue: venue.clone(),
        status: SettlementStatus::Pending,
        attempt: 0,
        updated_at: now,
    };
    let event = envelope(
        correlation,
        EventType::SettlementRequested,
        Entity::new("Settlement", &settlement_id, 1),
        SettlementRequested {
            trade_id: trade.trade_id.clone(),
            settlement_id,
            venue,
        },
    );
    (settlement, event)
}

/// Computes the next backoff delay for `attempt` (1-indexed), with ±20% jitter applied to the
/// deterministic exponential value (spec.md §4.6: "exponential backoff with jitter").
pub fn next_backoff(config: &SettlementConfig, attempt: u32) -> Duration {
    let base_ms = config.backoff_base.num_milliseconds() as f64;
    let factor = config.backoff_factor as f64;
    let capped = (base_ms * factor.powi(attempt.saturating_sub(1) as i32))
        .min(config.backoff_max.num_milliseconds() as f64);
    let jitter = rand::rng().random_range(0.8..=1.2);
    Duration::milliseconds((capped * jitter) as i64)
}

/// Marks a settlement attempt in flight: PENDING/RETRYING → SETTLING.
pub fn begin_attempt(settlement: &mut Settlement, now: DateTime<Utc>) -> Result<(), SagaError> {
    if !matches!(settlement.status, SettlementStatus::Pending | SettlementStatus::Retrying) {
        return Err(SagaError::SettlementStateInvalid);
    }
    settlement.status = SettlementStatus::Settling;
    settlement.attempt += 1;
    settlement.updated_at = now;
    Ok(())
}

pub fn mark_settled(
    settlement: &mut Settlement,
    correlation: &Correlation,
    now: DateTime<Utc>,
) -> Result<EventEnvelope<SettlementCompleted>, SagaError> {
    if settlement.status != SettlementStatus::Settling {
        return Err(SagaError::SettlementStateInvalid);
    }
    settlement.status = SettlementStatus::Settled;
    settlement.updated_at = now;

    Ok(envelope(
        correlation,
        EventType::SettlementCompleted,
        Entity::new("Settlement", &settlement.settlement_id, settlement.attempt as u64 + 1),
        SettlementCompleted {
            settlement_id: settlement.settlement_id.clone(),
            trade_id: settlement.trade_id.clone(),
        },
    ))
}

/// Marks a failed attempt: SETTLING → FAILED. This only records that the in-flight attempt
/// did not succeed; [`advance_after_failure`] decides whether the settlement is retried or
/// abandoned. An operator alert event is the same `SettlementFailed` event with `final_failure`
/// set, per spec.md §4.6 ("an operator alert event is emitted").
pub fn mark_failed(
    settlement: &mut Settlement,
    correlation: &Correlation,
    config: &SettlementConfig,
    reason: String,
    now: DateTime<Utc>,
) -> Result<EventEnvelope<SettlementFailed>, SagaError> {
    if settlement.status != SettlementStatus::Settling {
        return Err(SagaError::SettlementStateInvalid);
    }
    let final_failure = settlement.attempt >= config.max_attempts;
    settlement.status = SettlementStatus::Failed;
    settlement.updated_at = now;

    Ok(envelope(
        correlation,
        EventType::SettlementFailed,
        Entity::new("Settlement", &settlement.settlement_id, settlement.attempt as u64 + 1),
        SettlementFailed {
            settlement_id: settlement.settlement_id.clone(),
            trade_id: settlement.trade_id.clone(),
            attempt: settlement.attempt,
            reason,
            final_failure,
        },
    ))
}

/// Resolves a `FAILED` settlement: FAILED → RETRYING if `max_attempts` has not been reached,
/// or FAILED → FAILED_FINAL once it has. Callers schedule the next [`begin_attempt`] after a
/// [`next_backoff`] delay only when this returns `Retrying`.
pub fn advance_after_failure(
    settlement: &mut Settlement,
    config: &SettlementConfig,
    now: DateTime<Utc>,
) -> Result<SettlementStatus, SagaError> {
    if settlement.status != SettlementStatus::Failed {
        return Err(SagaError::SettlementStateInvalid);
    }
    settlement.status = if settlement.attempt >= config.max_attempts {
        SettlementStatus::FailedFinal
    } else {
        SettlementStatus::Retrying
    };
    settlement.updated_at = now;
    Ok(settlement.status)
}

/// Simulates a settlement attempt outcome against `config.failure_probability`, for
/// resilience testing without a real venue connection.
pub fn simulate_outcome(config: &SettlementConfig) -> bool {
    rand::rng().random_bool(config.failure_probability.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlation() -> Correlation {
        Correlation::root("tenant-1")
    }

    #[test]
    fn backoff_caps_at_configured_max() {
        let config = SettlementConfig {
            backoff_base: Duration::seconds(5),
            backoff_factor: 2,
            backoff_max: Duration::seconds(30),
            max_attempts: 10,
            failure_probability: 0.0,
        };
        let delay = next_backoff(&config, 10);
        assert!(delay <= Duration::seconds(36));
    }

    #[test]
    fn failure_becomes_final_after_max_attempts() {
        let config = SettlementConfig::default();
        let now = Utc::now();
        let mut settlement = Settlement {
            settlement_id: "s1".to_string(),
            trade_id: "t1".to_string(),
            venue: "venue-1".to_string(),
            status: SettlementStatus::Pending,
            attempt: 0,
            updated_at: now,
        };

        for _ in 0..config.max_attempts {
            begin_attempt(&mut settlement, now).unwrap();
            mark_failed(&mut settlement, &correlation(), &config, "simulated failure".to_string(), now).unwrap();
            assert_eq!(settlement.status, SettlementStatus::Failed);
            advance_after_failure(&mut settlement, &config, now).unwrap();
        }
        assert_eq!(settlement.status, SettlementStatus::FailedFinal);
    }

    #[test]
    fn failure_below_max_attempts_is_retryable_not_final() {
        let config = SettlementConfig::default();
        let now = Utc::now();
        let mut settlement = Settlement {
            settlement_id: "s3".to_string(),
            trade_id: "t3".to_string(),
            venue: "venue-1".to_string(),
            status: SettlementStatus::Pending,
            attempt: 0,
            updated_at: now,
        };

        begin_attempt(&mut settlement, now).unwrap();
        let event =
            mark_failed(&mut settlement, &correlation(), &config, "timeout".to_string(), now).unwrap();
        assert!(!event.payload.final_failure);
        assert_eq!(settlement.status, SettlementStatus::Failed);

        let status = advance_after_failure(&mut settlement, &config, now).unwrap();
        assert_eq!(status, SettlementStatus::Retrying);

        begin_attempt(&mut settlement, now).unwrap();
        assert_eq!(settlement.status, SettlementStatus::Settling);
    }

    #[test]
    fn settled_after_successful_attempt() {
        let now = Utc::now();
        let mut settlement = Settlement {
            settlement_id: "s2".to_string(),
            trade_id: "t2".to_string(),
            venue: "venue-1".to_string(),
            status: SettlementStatus::Pending,
            attempt: 0,
            updated_at: now,
        };
        begin_attempt(&mut settlement, now).unwrap();
        let event = mark_settled(&mut settlement, &correlation(), now).unwrap();
        assert_eq!(settlement.status, SettlementStatus::Settled);
        assert_eq!(event.payload.settlement_id, "s2");
    }
}
