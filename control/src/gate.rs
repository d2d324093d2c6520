//! The control-plane gate (C8, spec.md §4.8): every command passes through this gate before
//! reaching an aggregate. Checks run in order — kill switch, entitlement, rate limits, max
//! notional — and the first failure blocks the command atomically with `RiskLimitBreached`.

use chrono::Utc;
use orion_core::{
    context::Correlation,
    event::{Entity, EventEnvelope, EventType},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    check::calculate_notional,
    entitlement::Entitlement,
    error::ControlError,
    kill_switch::{KillSwitchState, PRODUCER},
    payloads::RiskLimitBreached,
    rate_limit::RateLimiters,
};

#[derive(Debug, Clone, Copy)]
pub enum CommandKind {
    Rfq,
    Order,
}

impl CommandKind {
    fn as_str(self) -> &'static str {
        match self {
            CommandKind::Rfq => "Rfq",
            CommandKind::Order => "Order",
        }
    }
}

fn breach(
    correlation: &Correlation,
    tenant_id: &str,
    user_id: &str,
    kind: CommandKind,
    reason: String,
) -> EventEnvelope<RiskLimitBreached> {
    EventEnvelope {
        event_id: Uuid::new_v4(),
        event_type: EventType::RiskLimitBreached,
        event_version: 1,
        occurred_at: Utc::now(),
        producer: PRODUCER.to_string(),
        tenant_id: correlation.tenant_id.clone(),
        correlation_id: correlation.correlation_id,
        causation_id: correlation.causation_id.clone(),
        entity: Entity::new("Gate", tenant_id, 1),
        payload: RiskLimitBreached {
            tenant_id: tenant_id.to_string(),
            user_id: Some(user_id.to_string()),
            reason,
            command_kind: kind.as_str().to_string(),
        },
    }
}

/// The per-caller limits a single gate evaluation checks against. Looked up by the caller
/// (tenant/user) before invoking [`evaluate`]; a real deployment sources this from a
/// configuration store keyed by `(tenantId, userId)`.
#[derive(Debug, Clone)]
pub struct CallerLimits {
    pub entitlement: Entitlement,
    pub max_notional: Option<Decimal>,
}

/// Runs every gate check in order and, on the first failure, blocks the command atomically
/// with a `RiskLimitBreached` event: the caller gets both the error (to reject the command)
/// and the event (to publish to the outbox in the same transaction).
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    correlation: &Correlation,
    kill_switch: &KillSwitchState,
    rate_limiters: &RateLimiters,
    tenant_id: &str,
    user_id: &str,
    kind: CommandKind,
    limits: &CallerLimits,
    asset_class: &str,
    instrument_id: &str,
    venue: Option<&str>,
    qty: Decimal,
    price: Decimal,
) -> Result<(), (ControlError, EventEnvelope<RiskLimitBreached>)> {
    if kill_switch.is_active(tenant_id) {
        let err = ControlError::KillSwitchActive;
        let event = breach(correlation, tenant_id, user_id, kind, err.to_string());
        return Err((err, event));
    }

    if !limits.entitlement.covers(asset_class, instrument_id, venue) {
        let err = ControlError::NotEntitled(instrument_id.to_string());
        let event = breach(correlation, tenant_id, user_id, kind, err.to_string());
        return Err((err, event));
    }

    let rate_result = match kind {
        CommandKind::Rfq => rate_limiters.check_rfq(tenant_id, user_id),
        CommandKind::Order => rate_limiters.check_order(tenant_id, user_id),
    };
    if let Err(err) = rate_result {
        let event = breach(correlation, tenant_id, user_id, kind, err.to_string());
        return Err((err, event));
    }

    if let Some(ceiling) = limits.max_notional {
        let notional = calculate_notional(qty, price);
        if notional > ceiling {
            let err = ControlError::NotionalExceeded { notional, ceiling };
            let event = breach(correlation, tenant_id, user_id, kind, err.to_string());
            return Err((err, event));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn correlation() -> Correlation {
        Correlation::root("tenant-1")
    }

    fn limits() -> CallerLimits {
        CallerLimits {
            entitlement: Entitlement::unrestricted(),
            max_notional: Some(dec!(1_000_000)),
        }
    }

    #[test]
    fn kill_switch_blocks_before_other_checks() {
        let mut kill_switch = KillSwitchState::default();
        kill_switch.enable(None);
        let rate_limiters = RateLimiters::new(Default::default());

        let (err, event) = evaluate(
            &correlation(),
            &kill_switch,
            &rate_limiters,
            "tenant-1",
            "user-1",
            CommandKind::Rfq,
            &limits(),
            "fx_spot",
            "EURUSD",
            None,
            dec!(1),
            dec!(1),
        )
        .unwrap_err();
        assert_eq!(err, ControlError::KillSwitchActive);
        assert_eq!(event.event_type, EventType::RiskLimitBreached);
        assert_eq!(event.payload.tenant_id, "tenant-1");
    }

    #[test]
    fn notional_ceiling_is_enforced() {
        let kill_switch = KillSwitchState::default();
        let rate_limiters = RateLimiters::new(Default::default());

        let (err, event) = evaluate(
            &correlation(),
            &kill_switch,
            &rate_limiters,
            "tenant-1",
            "user-1",
            CommandKind::Order,
            &limits(),
            "fx_spot",
            "EURUSD",
            None,
            dec!(2_000_000),
            dec!(1.0),
        )
        .unwrap_err();
        assert!(matches!(err, ControlError::NotionalExceeded { .. }));
        assert_eq!(event.payload.command_kind, "Order");
    }
}
