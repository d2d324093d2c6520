//! The order aggregate and OMS commands (C5, spec.md §4.5).
//!
//! States and transitions: NEW → ACK → PARTIAL_FILL → FILLED; any of {NEW, ACK, PARTIAL_FILL} →
//! CANCEL_REQUESTED → CANCELLED; NEW → REJECTED (terminal). Any transition not listed fails with
//! `StateInvalid` and does not mutate state.
//!
//! `clientIdempotencyKey` dedup on `placeOrder` is enforced the same way as the outbox's
//! `eventId` dedup: a unique index on `(tenantId, clientIdempotencyKey)` at the repository layer
//! returns the original order on a conflicting insert, so this module never sees the duplicate.
//!
//! Concurrency: every mutation past `placeOrder` is optimistic-locked on `version`, the same way
//! `orion_rfq::Rfq` is — a caller passes the `version` it last observed, and a concurrent writer
//! that already advanced it fails the attempt with [`OrderError::Conflict`] rather than silently
//! clobbering it.

use chrono::{DateTime, Utc};
use orion_core::{
    command::Side,
    context::Correlation,
    event::{Entity, EventEnvelope, EventType},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::OrderError,
    payloads::{OrderAcknowledged, OrderAmended, OrderCancelled, OrderFilled, OrderPlaced, OrderRejected},
};

pub const PRODUCER: &str = "orion-execution";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Ack,
    PartialFill,
    Filled,
    CancelRequested,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: String,
    pub tenant_id: String,
    pub instrument_id: String,
    pub side: Side,
    pub qty: Decimal,
    pub cumulative_qty: Decimal,
    pub limit_price: Option<Decimal>,
    pub time_in_force: String,
    pub owner_id: String,
    pub client_idempotency_key: String,
    pub status: OrderStatus,
    pub version: u64,
    pub venue_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn check_version(order: &Order, expected_version: u64) -> Result<(), OrderError> {
    if order.version != expected_version {
        return Err(OrderError::Conflict {
            expected: expected_version,
            actual: order.version,
        });
    }
    Ok(())
}

impl Order {
    pub fn remaining_qty(&self) -> Decimal {
        self.qty - self.cumulative_qty
    }
}

#[derive(Debug, Clone)]
pub enum OrderEvent {
    Placed(EventEnvelope<OrderPlaced>),
    Acknowledged(EventEnvelope<OrderAcknowledged>),
    Rejected(EventEnvelope<OrderRejected>),
    Filled(EventEnvelope<OrderFilled>),
    Cancelled(EventEnvelope<OrderCancelled>),
    Amended(EventEnvelope<OrderAmended>),
}

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

#[allow(clippy::too_many_arguments)]
pub fn place_order(
    order_id: String,
    correlation: &Correlation,
    instrument_id: String,
    side: Side,
    qty: Decimal,
    limit_price: Option<Decimal>,
    time_in_force: String,
    owner_id: String,
    client_idempotency_key: String,
    now: DateTime<Utc>,
) -> Result<(Order, OrderEvent), OrderError> {
    if qty <= Decimal::ZERO {
        return Err(OrderError::ValidationFailed("qty must be positive".into()));
    }

    let order = Order {
        order_id: order_id.clone(),
        tenant_id: correlation.tenant_id.clone(),
        instrument_id: instrument_id.clone(),
        side,
        qty,
        cumulative_qty: Decimal::ZERO,
        limit_price,
        time_in_force: time_in_force.clone(),
        owner_id: owner_id.clone(),
        client_idempotency_key: client_idempotency_key.clone(),
        status: OrderStatus::New,
        version: 1,
        venue_order_id: None,
        created_at: now,
        updated_at: now,
    };

    let event = envelope(
        correlation,
        EventType::OrderPlaced,
        Entity::new("Order", &order_id, order.version),
        OrderPlaced {
            order_id,
            instrument_id,
            side,
            qty,
            limit_price,
            time_in_force,
            owner_id,
            client_idempotency_key,
        },
    );
    Ok((order, OrderEvent::Placed(event)))
}

pub fn acknowledge(
    order: &mut Order,
    correlation: &Correlation,
    venue_order_id: String,
    expected_version: u64,
    now: DateTime<Utc>,
) -> Result<OrderEvent, OrderError> {
    check_version(order, expected_version)?;
    if order.status != OrderStatus::New {
        return Err(OrderError::StateInvalid);
    }
    order.status = OrderStatus::Ack;
    order.version += 1;
    order.venue_order_id = Some(venue_order_id.clone());
    order.updated_at = now;

    let event = envelope(
        correlation,
        EventType::OrderAcknowledged,
        Entity::new("Order", &order.order_id, order.version),
        OrderAcknowledged {
            order_id: order.order_id.clone(),
            venue_order_id,
        },
    );
    Ok(OrderEvent::Acknowledged(event))
}

pub fn reject(
    order: &mut Order,
    correlation: &Correlation,
    reason: String,
    expected_version: u64,
    now: DateTime<Utc>,
) -> Result<OrderEvent, OrderError> {
    check_version(order, expected_version)?;
    if order.status != OrderStatus::New {
        return Err(OrderError::StateInvalid);
    }
    order.status = OrderStatus::Rejected;
    order.version += 1;
    order.updated_at = now;

    let event = envelope(
        correlation,
        EventType::OrderRejected,
        Entity::new("Order", &order.order_id, order.version),
        OrderRejected {
            order_id: order.order_id.clone(),
            reason,
        },
    );
    Ok(OrderEvent::Rejected(event))
}

pub fn apply_fill(
    order: &mut Order,
    correlation: &Correlation,
    fill_qty: Decimal,
    fill_price: Decimal,
    expected_version: u64,
    now: DateTime<Utc>,
) -> Result<OrderEvent, OrderError> {
    check_version(order, expected_version)?;
    if !matches!(order.status, OrderStatus::Ack | OrderStatus::PartialFill) {
        return Err(OrderError::StateInvalid);
    }
    if fill_qty <= Decimal::ZERO || fill_qty > order.remaining_qty() {
        return Err(OrderError::ValidationFailed(
            "fill qty must be positive and not exceed remaining qty".into(),
        ));
    }

    order.cumulative_qty += fill_qty;
    let remaining = order.remaining_qty();
    order.status = if remaining.is_zero() {
        OrderStatus::Filled
    } else {
        OrderStatus::PartialFill
    };
    order.version += 1;
    order.updated_at = now;

    let event = envelope(
        correlation,
        EventType::OrderFilled,
        Entity::new("Order", &order.order_id, order.version),
        OrderFilled {
            order_id: order.order_id.clone(),
            fill_qty,
            fill_price,
            cumulative_qty: order.cumulative_qty,
            remaining_qty: remaining,
        },
    );
    Ok(OrderEvent::Filled(event))
}

/// `cancel(orderId)`: idempotent — an order already CANCELLED or CANCEL_REQUESTED returns no new
/// event.
pub fn request_cancel(
    order: &mut Order,
    correlation: &Correlation,
    expected_version: u64,
    now: DateTime<Utc>,
) -> Result<Option<OrderEvent>, OrderError> {
    if matches!(order.status, OrderStatus::Cancelled | OrderStatus::CancelRequested) {
        return Ok(None);
    }
    check_version(order, expected_version)?;
    if !matches!(order.status, OrderStatus::New | OrderStatus::Ack | OrderStatus::PartialFill) {
        return Err(OrderError::StateInvalid);
    }
    order.status = OrderStatus::CancelRequested;
    order.version += 1;
    order.updated_at = now;
    Ok(None)
}

/// Applied on venue confirmation of a cancel request: CANCEL_REQUESTED → CANCELLED.
pub fn confirm_cancel(
    order: &mut Order,
    correlation: &Correlation,
    expected_version: u64,
    now: DateTime<Utc>,
) -> Result<OrderEvent, OrderError> {
    check_version(order, expected_version)?;
    if order.status != OrderStatus::CancelRequested {
        return Err(OrderError::StateInvalid);
    }
    order.status = OrderStatus::Cancelled;
    order.version += 1;
    order.updated_at = now;

    let event = envelope(
        correlation,
        EventType::OrderCancelled,
        Entity::new("Order", &order.order_id, order.version),
        OrderCancelled {
            order_id: order.order_id.clone(),
        },
    );
    Ok(OrderEvent::Cancelled(event))
}

/// `amend`: permitted on NEW, ACK, PARTIAL_FILL against remaining quantity only. Rejecting the
/// amendment itself is not an error state in the caller's sense — this function only governs
/// whether the order's *status* allows an amendment attempt at all.
pub fn amend(
    order: &mut Order,
    correlation: &Correlation,
    new_qty: Option<Decimal>,
    new_limit_price: Option<Decimal>,
    expected_version: u64,
    now: DateTime<Utc>,
) -> Result<OrderEvent, OrderError> {
    check_version(order, expected_version)?;
    if !matches!(order.status, OrderStatus::New | OrderStatus::Ack | OrderStatus::PartialFill) {
        return Err(OrderError::StateInvalid);
    }
    if let Some(qty) = new_qty {
        if qty < order.cumulative_qty {
            return Err(OrderError::InvalidAmendment);
        }
        order.qty = qty;
    }
    if let Some(price) = new_limit_price {
        order.limit_price = Some(price);
    }
    order.version += 1;
    order.updated_at = now;

    let event = envelope(
        correlation,
        EventType::OrderAmended,
        Entity::new("Order", &order.order_id, order.version),
        OrderAmended {
            order_id: order.order_id.clone(),
            new_qty,
            new_limit_price,
        },
    );
    Ok(OrderEvent::Amended(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn correlation() -> Correlation {
        Correlation::root("tenant-1")
    }

    fn new_order(now: DateTime<Utc>) -> Order {
        place_order(
            "order-1".to_string(),
            &correlation(),
            "EURUSD".to_string(),
            Side::Buy,
            dec!(1_000_000),
            Some(dec!(1.10)),
            "GTC".to_string(),
            "owner-1".to_string(),
            "idem-1".to_string(),
            now,
        )
        .unwrap()
        .0
    }

    #[test]
    fn full_fill_transitions_to_filled() {
        let now = Utc::now();
        let mut order = new_order(now);
        let v = order.version;
        acknowledge(&mut order, &correlation(), "venue-1".to_string(), v, now).unwrap();
        let v = order.version;
        apply_fill(&mut order, &correlation(), dec!(1_000_000), dec!(1.1005), v, now).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn partial_fill_then_full_fill() {
        let now = Utc::now();
        let mut order = new_order(now);
        let v = order.version;
        acknowledge(&mut order, &correlation(), "venue-1".to_string(), v, now).unwrap();
        let v = order.version;
        apply_fill(&mut order, &correlation(), dec!(400_000), dec!(1.1005), v, now).unwrap();
        assert_eq!(order.status, OrderStatus::PartialFill);
        let v = order.version;
        apply_fill(&mut order, &correlation(), dec!(600_000), dec!(1.1006), v, now).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn amend_below_cumulative_qty_is_rejected() {
        let now = Utc::now();
        let mut order = new_order(now);
        let v = order.version;
        acknowledge(&mut order, &correlation(), "venue-1".to_string(), v, now).unwrap();
        let v = order.version;
        apply_fill(&mut order, &correlation(), dec!(400_000), dec!(1.1005), v, now).unwrap();

        let v = order.version;
        let err = amend(&mut order, &correlation(), Some(dec!(100_000)), None, v, now).unwrap_err();
        assert_eq!(err, OrderError::InvalidAmendment);
    }

    #[test]
    fn second_cancel_is_idempotent_no_op() {
        let now = Utc::now();
        let mut order = new_order(now);
        let v = order.version;
        request_cancel(&mut order, &correlation(), v, now).unwrap();
        let v = order.version;
        confirm_cancel(&mut order, &correlation(), v, now).unwrap();
        let v = order.version;
        let second = request_cancel(&mut order, &correlation(), v, now).unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn amend_on_filled_order_fails_state_invalid() {
        let now = Utc::now();
        let mut order = new_order(now);
        let v = order.version;
        acknowledge(&mut order, &correlation(), "venue-1".to_string(), v, now).unwrap();
        let v = order.version;
        apply_fill(&mut order, &correlation(), dec!(1_000_000), dec!(1.1005), v, now).unwrap();

        let v = order.version;
        let err = amend(&mut order, &correlation(), Some(dec!(2_000_000)), None, v, now).unwrap_err();
        assert_eq!(err, OrderError::StateInvalid);
    }

    #[test]
    fn mutation_with_stale_version_is_rejected_as_conflict() {
        let now = Utc::now();
        let mut order = new_order(now);
        let stale_version = order.version;
        acknowledge(&mut order, &correlation(), "venue-1".to_string(), stale_version, now).unwrap();

        let err = apply_fill(&mut order, &correlation(), dec!(1_000_000), dec!(1.1005), stale_version, now)
            .unwrap_err();
        assert_eq!(
            err,
            OrderError::Conflict {
                expected: stale_version,
                actual: order.version,
            }
        );
    }
}
