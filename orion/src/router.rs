//! Central command router (spec.md Design Notes §9): "implement as a tagged variant `Command`
//! ... dispatched by a central command router; each variant carries its validated input."
//!
//! [`dispatch`] matches on [`Command`], runs the control gate first (spec.md §4.8: every
//! command passes through the gate before reaching an aggregate), then calls the owning
//! aggregate's pure `apply`-style function. Like every aggregate function in this workspace
//! (`orion_rfq::accept_quote`, `orion_execution::acknowledge`, ...), this router does not own a
//! repository: a command that acts on existing state receives that state already loaded, via
//! [`Aggregate`]. Persisting the new aggregate state and writing its events transactionally is
//! the caller's job, via [`orion_outbox::write_transactional`] — [`Dispatched`] already holds
//! the events erased to a uniform envelope so heterogeneous aggregate events can be written in
//! one call regardless of which aggregate produced them.
//!
//! `SetKillSwitch` bypasses the gate (an operator disabling trading must work even while the
//! kill switch itself is active). `UpdateLimits`/`CreateInstrument`/`UpdateInstrument` are
//! reference-data/admin commands with no event-sourced aggregate behind them — the router
//! reports them as out of its scope rather than inventing aggregate semantics for them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use orion_control::{evaluate, kill_switch, CallerLimits, CommandKind, KillSwitchState, RateLimiters};
use orion_core::{
    command::{
        AcceptQuote, AmendOrder, CancelOrder, CancelRfq, Command, CommandError, CreateRfq,
        ErrorCode, PlaceOrder, SetKillSwitch,
    },
    context::Correlation,
    event::EventEnvelope,
};
use orion_execution::{amend, place_order, request_cancel, Order, OrderEvent};
use orion_rfq::{
    accept_quote, cancel_rfq, create_rfq, InstrumentRef, Rfq, RfqEvent, DEFAULT_MAX_EXPIRY,
};

/// Existing aggregate state a stateful command acts on, loaded by the caller before dispatch.
/// `CreateRfq`/`PlaceOrder` need no prior state (`None` is correct for them); every other
/// stateful command requires the matching variant or [`dispatch`] returns an `Internal` error.
pub enum Aggregate<'a> {
    None,
    Rfq(&'a mut Rfq),
    Order(&'a mut Order),
}

/// What a successful dispatch produced, already erased to `EventEnvelope<Value>`.
pub enum Dispatched {
    Rfq(Vec<EventEnvelope<Value>>),
    Order(Vec<EventEnvelope<Value>>),
    KillSwitch(EventEnvelope<Value>),
}

fn internal(correlation_id: Uuid, message: impl Into<String>) -> CommandError {
    CommandError::new(ErrorCode::Internal, message, correlation_id)
}

/// Erasure cannot fail for payloads this workspace defines (plain structs of primitives,
/// decimals and strings); a failure here means a payload stopped being serializable, which is
/// a programming error, not a runtime condition a caller can recover from.
fn erase<P: Serialize>(event: &EventEnvelope<P>) -> EventEnvelope<Value> {
    serde_json::to_value(event)
        .and_then(serde_json::from_value)
        .expect("event envelope payloads are always serializable")
}

fn erase_rfq_event(event: &RfqEvent) -> EventEnvelope<Value> {
    match event {
        RfqEvent::Created(e) => erase(e),
        RfqEvent::Sent(e) => erase(e),
        RfqEvent::QuoteReceived(e) => erase(e),
        RfqEvent::Ranking(e) => erase(e),
        RfqEvent::QuoteAccepted(e) => erase(e),
        RfqEvent::QuoteAcceptanceRejected(e) => erase(e),
        RfqEvent::Expired(e) => erase(e),
        RfqEvent::Cancelled(e) => erase(e),
    }
}

fn erase_order_event(event: &OrderEvent) -> EventEnvelope<Value> {
    match event {
        OrderEvent::Placed(e) => erase(e),
        OrderEvent::Acknowledged(e) => erase(e),
        OrderEvent::Rejected(e) => erase(e),
        OrderEvent::Filled(e) => erase(e),
        OrderEvent::Cancelled(e) => erase(e),
        OrderEvent::Amended(e) => erase(e),
    }
}

/// Runs the control gate for a command carrying `(instrument, qty, price)`. `CreateRfq` has no
/// price yet (quotes haven't arrived), so it gates with `price = 0`, which can never trip a
/// notional ceiling — the max-notional check re-applies once the RFQ is accepted and a real
/// execution price exists.
#[allow(clippy::too_many_arguments)]
fn gate(
    correlation: &Correlation,
    kill_switch: &KillSwitchState,
    rate_limiters: &RateLimiters,
    limits: &CallerLimits,
    kind: CommandKind,
    user_id: &str,
    instrument: &InstrumentRef,
    qty: Decimal,
    price: Decimal,
) -> Result<(), CommandError> {
    evaluate(
        correlation,
        kill_switch,
        rate_limiters,
        &correlation.tenant_id,
        user_id,
        kind,
        limits,
        &instrument.asset_class,
        &instrument.instrument_id,
        None,
        qty,
        price,
    )
    .map_err(|(err, _breach_event)| internal(correlation.correlation_id, err.to_string()))
}

/// Dispatches `command` through the control gate and into its owning aggregate.
///
/// `instrument` is required (and only consulted) for `CreateRfq`/`PlaceOrder`; `aggregate` is
/// required (and only consulted) for commands that mutate existing state. `now` is injected
/// rather than read from the clock so replays and tests are deterministic.
#[allow(clippy::too_many_arguments)]
pub fn dispatch(
    command: Command,
    correlation: &Correlation,
    kill_switch_state: &mut KillSwitchState,
    rate_limiters: &RateLimiters,
    limits: &CallerLimits,
    instrument: Option<&InstrumentRef>,
    aggregate: Aggregate<'_>,
    now: DateTime<Utc>,
) -> Result<Dispatched, CommandError> {
    let correlation_id = correlation.correlation_id;

    match command {
        Command::CreateRfq(CreateRfq {
            instrument_id: _,
            side,
            size,
            expiry_instant,
            requester_id,
            venue,
        }) => {
            let instrument = instrument
                .ok_or_else(|| internal(correlation_id, "CreateRfq dispatch requires a loaded InstrumentRef"))?;
            gate(
                correlation,
                kill_switch_state,
                rate_limiters,
                limits,
                CommandKind::Rfq,
                &requester_id,
                instrument,
                size,
                Decimal::ZERO,
            )?;
            let rfq_id = Uuid::new_v4().to_string();
            let (_, event) = create_rfq(
                rfq_id,
                correlation,
                instrument,
                requester_id,
                side,
                size,
                expiry_instant,
                venue,
                now,
                DEFAULT_MAX_EXPIRY,
            )
            .map_err(|e| e.into_command_error(correlation_id))?;
            Ok(Dispatched::Rfq(vec![erase_rfq_event(&event)]))
        }

        Command::AcceptQuote(AcceptQuote {
            rfq_id: _,
            quote_id,
            idempotency_key,
            expected_version,
        }) => {
            let rfq = match aggregate {
                Aggregate::Rfq(rfq) => rfq,
                _ => return Err(internal(correlation_id, "AcceptQuote dispatch requires a loaded Rfq")),
            };
            let event = accept_quote(rfq, correlation, quote_id, idempotency_key, expected_version, now)
                .map_err(|e| e.into_command_error(correlation_id))?;
            Ok(Dispatched::Rfq(vec![erase_rfq_event(&event)]))
        }

        Command::CancelRfq(CancelRfq { rfq_id: _ }) => {
            let rfq = match aggregate {
                Aggregate::Rfq(rfq) => rfq,
                _ => return Err(internal(correlation_id, "CancelRfq dispatch requires a loaded Rfq")),
            };
            let requester_id = rfq.requester_id.clone();
            let event = cancel_rfq(rfq, correlation, &requester_id, now)
                .map_err(|e| e.into_command_error(correlation_id))?;
            let events = event.iter().map(erase_rfq_event).collect();
            Ok(Dispatched::Rfq(events))
        }

        Command::PlaceOrder(PlaceOrder {
            instrument_id,
            side,
            qty,
            limit_price,
            time_in_force,
            owner_id,
            client_idempotency_key,
        }) => {
            let instrument = instrument
                .ok_or_else(|| internal(correlation_id, "PlaceOrder dispatch requires a loaded InstrumentRef"))?;
            gate(
                correlation,
                kill_switch_state,
                rate_limiters,
                limits,
                CommandKind::Order,
                &owner_id,
                instrument,
                qty,
                limit_price.unwrap_or(Decimal::ZERO),
            )?;
            let order_id = Uuid::new_v4().to_string();
            let (_, event) = place_order(
                order_id,
                correlation,
                instrument_id,
                side,
                qty,
                limit_price,
                time_in_force,
                owner_id,
                client_idempotency_key,
                now,
            )
            .map_err(|e| e.into_command_error(correlation_id))?;
            Ok(Dispatched::Order(vec![erase_order_event(&event)]))
        }

        Command::CancelOrder(CancelOrder { order_id: _ }) => {
            let order = match aggregate {
                Aggregate::Order(order) => order,
                _ => return Err(internal(correlation_id, "CancelOrder dispatch requires a loaded Order")),
            };
            let expected_version = order.version;
            let event = request_cancel(order, correlation, expected_version, now)
                .map_err(|e| e.into_command_error(correlation_id))?;
            let events = event.iter().map(erase_order_event).collect();
            Ok(Dispatched::Order(events))
        }

        Command::AmendOrder(AmendOrder {
            order_id: _,
            new_qty,
            new_limit_price,
        }) => {
            let order = match aggregate {
                Aggregate::Order(order) => order,
                _ => return Err(internal(correlation_id, "AmendOrder dispatch requires a loaded Order")),
            };
            let expected_version = order.version;
            let event = amend(order, correlation, new_qty, new_limit_price, expected_version, now)
                .map_err(|e| e.into_command_error(correlation_id))?;
            Ok(Dispatched::Order(vec![erase_order_event(&event)]))
        }

        Command::SetKillSwitch(SetKillSwitch {
            tenant_id,
            active,
            actor,
            reason,
        }) => {
            let event = if active {
                erase(&kill_switch::enable(kill_switch_state, correlation, tenant_id, actor, reason))
            } else {
                erase(&kill_switch::disable(kill_switch_state, correlation, tenant_id, actor, reason))
            };
            Ok(Dispatched::KillSwitch(event))
        }

        Command::UpdateLimits(_) | Command::CreateInstrument(_) | Command::UpdateInstrument(_) => {
            Err(internal(
                correlation_id,
                "reference-data and limits commands are applied directly against the config \
                 store and have no event-sourced aggregate to dispatch into",
            ))
        }
    }
}
