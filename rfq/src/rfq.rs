//! The RFQ aggregate and its coordinator commands (C4, spec.md §4.4).
//!
//! States and transitions: CREATED → SENT → QUOTING → (ACCEPTED | EXPIRED | CANCELLED);
//! ACCEPTED → TRADED (execution confirmation) or REJECTED (LP last-look; returns to QUOTING if
//! the RFQ is still open, otherwise terminal).
//!
//! Concurrency: a single RFQ's commands are serialized by optimistic locking on `version`, never
//! a pessimistic lock. Quote arrivals are concurrent but commutative, deduplicated by
//! `(rfqId, quoteId)`.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use indexmap::IndexMap;
use orion_core::{
    command::Side,
    context::Correlation,
    event::{Entity, EventEnvelope, EventType},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::RfqError,
    payloads::{
        QuoteAccepted, QuoteAcceptanceRejected, QuoteRankEntry, QuoteRanking, QuoteReceived,
        RfqCancelled, RfqCreated, RfqExpired, RfqSent,
    },
    quote::{rank_quotes, Quote},
    reference::InstrumentRef,
};

pub const PRODUCER: &str = "orion-rfq";

/// Default ceiling on `expiryInstant - now` enforced by [`create_rfq`] (spec.md §4.4: "not
/// beyond configured max (default 120 s)").
pub const DEFAULT_MAX_EXPIRY: ChronoDuration = ChronoDuration::seconds(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RfqStatus {
    Created,
    Sent,
    Quoting,
    Accepted,
    Rejected,
    Expired,
    Cancelled,
    Traded,
}

impl RfqStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Traded | Self::Expired | Self::Cancelled | Self::Rejected
        )
    }
}

#[derive(Debug, Clone)]
struct AcceptRecord {
    idempotency_key: String,
    event: RfqEvent,
}

#[derive(Debug, Clone)]
pub struct Rfq {
    pub rfq_id: String,
    pub tenant_id: String,
    pub requester_id: String,
    pub instrument_id: String,
    pub side: Side,
    pub size: Decimal,
    pub expiry_instant: DateTime<Utc>,
    pub status: RfqStatus,
    pub version: u64,
    pub quotes: IndexMap<String, Quote>,
    pub accepted_quote_id: Option<String>,
    pub venue: Option<String>,
    pub requires_two_way: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    last_accept: Option<AcceptRecord>,
}

/// Every event the RFQ aggregate can produce, each carrying its own typed payload.
#[derive(Debug, Clone)]
pub enum RfqEvent {
    Created(EventEnvelope<RfqCreated>),
    Sent(EventEnvelope<RfqSent>),
    QuoteReceived(EventEnvelope<QuoteReceived>),
    Ranking(EventEnvelope<QuoteRanking>),
    QuoteAccepted(EventEnvelope<QuoteAccepted>),
    QuoteAcceptanceRejected(EventEnvelope<QuoteAcceptanceRejected>),
    Expired(EventEnvelope<RfqExpired>),
    Cancelled(EventEnvelope<RfqCancelled>),
}

fn envelope<P>(
    correlation: &Correlation,
    event_type: EventType,
    entity: Entity,
    payload: P,
) -> EventEnvelope<P> {
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
pub fn create_rfq(
    rfq_id: String,
    correlation: &Correlation,
    instrument: &InstrumentRef,
    requester_id: String,
    side: Side,
    size: Decimal,
    expiry_instant: DateTime<Utc>,
    venue: Option<String>,
    now: DateTime<Utc>,
    max_expiry: ChronoDuration,
) -> Result<(Rfq, RfqEvent), RfqError> {
    if !instrument.active {
        return Err(RfqError::InstrumentInactive);
    }
    instrument.validate_size(size).map_err(RfqError::InvalidSize)?;
    if expiry_instant <= now || expiry_instant > now + max_expiry {
        return Err(RfqError::InvalidExpiry);
    }

    let rfq = Rfq {
        rfq_id: rfq_id.clone(),
        tenant_id: correlation.tenant_id.clone(),
        requester_id: requester_id.clone(),
        instrument_id: instrument.instrument_id.clone(),
        side,
        size,
        expiry_instant,
        status: RfqStatus::Created,
        version: 1,
        quotes: IndexMap::new(),
        accepted_quote_id: None,
        venue: venue.clone(),
        requires_two_way: instrument.requires_two_way,
        created_at: now,
        updated_at: now,
        last_accept: None,
    };

    let event = envelope(
        correlation,
        EventType::RfqCreated,
        Entity::new("Rfq", &rfq_id, 1),
        RfqCreated {
            rfq_id,
            requester_id,
            instrument_id: rfq.instrument_id.clone(),
            side,
            size,
            expiry_instant,
            venue,
        },
    );

    Ok((rfq, RfqEvent::Created(event)))
}

/// Transitions CREATED → SENT once routing has selected eligible LPs.
pub fn send_rfq(
    rfq: &mut Rfq,
    correlation: &Correlation,
    routed_lp_ids: Vec<String>,
    now: DateTime<Utc>,
) -> Result<RfqEvent, RfqError> {
    if rfq.status != RfqStatus::Created {
        return Err(RfqError::StateInvalid);
    }
    rfq.status = RfqStatus::Sent;
    rfq.version += 1;
    rfq.updated_at = now;

    let event = envelope(
        correlation,
        EventType::RfqSent,
        Entity::new("Rfq", &rfq.rfq_id, rfq.version),
        RfqSent {
            rfq_id: rfq.rfq_id.clone(),
            routed_lp_ids,
        },
    );
    Ok(RfqEvent::Sent(event))
}

/// `recordQuote`: idempotently appends a quote. Rejection reasons are checked in the priority
/// order from spec.md §4.4; a duplicate `quoteId` is a silent success (`Ok(vec![])`).
///
/// Every accepted quote re-ranks all currently live quotes for the RFQ's side and publishes the
/// result as a [`RfqEvent::Ranking`] projection update alongside the `QuoteReceived` event
/// (spec.md §4.4: "each RFQ state revision publishes current rankings").
pub fn record_quote(
    rfq: &mut Rfq,
    correlation: &Correlation,
    quote: Quote,
    reference_mid: Option<Decimal>,
    tolerance: Decimal,
    now: DateTime<Utc>,
) -> Result<Vec<RfqEvent>, RfqError> {
    if !matches!(rfq.status, RfqStatus::Sent | RfqStatus::Quoting) {
        return Err(RfqError::StateInvalid);
    }
    if now > rfq.expiry_instant {
        return Err(RfqError::Expired);
    }
    if rfq.quotes.contains_key(&quote.quote_id) {
        return Ok(Vec::new());
    }
    if rfq.requires_two_way && !quote.is_two_way() {
        return Err(RfqError::MissingBidOrAsk);
    }

    let mut price_tolerance_breached = false;
    if let (Some(mid), Some(price)) = (reference_mid, quote.price_for(rfq.side)) {
        let deviation = (price - mid).abs();
        if deviation > tolerance {
            price_tolerance_breached = true;
            tracing::warn!(
                rfq_id = %rfq.rfq_id,
                quote_id = %quote.quote_id,
                %deviation,
                %tolerance,
                "quote price outside reference-mid tolerance; accepted with flag"
            );
        }
    }

    let was_first_quote = rfq.quotes.is_empty();
    rfq.quotes.insert(quote.quote_id.clone(), quote.clone());
    rfq.version += 1;
    rfq.updated_at = now;
    if was_first_quote && rfq.status == RfqStatus::Sent {
        rfq.status = RfqStatus::Quoting;
    }

    let received = envelope(
        correlation,
        EventType::QuoteReceived,
        Entity::new("Rfq", &rfq.rfq_id, rfq.version),
        QuoteReceived {
            rfq_id: rfq.rfq_id.clone(),
            quote_id: quote.quote_id,
            lp_id: quote.lp_id,
            bid: quote.bid,
            ask: quote.ask,
            size: quote.size,
            price_tolerance_breached,
        },
    );

    let live_quotes: Vec<Quote> = rfq.quotes.values().cloned().collect();
    let rankings = rank_quotes(&live_quotes, rfq.side)
        .into_iter()
        .map(|(quote_id, rank)| QuoteRankEntry {
            quote_id,
            is_best_bid: rank.is_best_bid,
            is_best_ask: rank.is_best_ask,
            is_best_for_side: rank.is_best_for_side,
        })
        .collect();
    let ranking = envelope(
        correlation,
        EventType::RfqQuoteRanking,
        Entity::new("Rfq", &rfq.rfq_id, rfq.version),
        QuoteRanking {
            rfq_id: rfq.rfq_id.clone(),
            rankings,
        },
    );

    Ok(vec![RfqEvent::QuoteReceived(received), RfqEvent::Ranking(ranking)])
}

/// `acceptQuote`: optimistic-concurrency checked, idempotent on `idempotencyKey`.
pub fn accept_quote(
    rfq: &mut Rfq,
    correlation: &Correlation,
    quote_id: String,
    idempotency_key: String,
    expected_version: u64,
    now: DateTime<Utc>,
) -> Result<RfqEvent, RfqError> {
    if let Some(prior) = &rfq.last_accept {
        if prior.idempotency_key == idempotency_key {
            return Ok(prior.event.clone());
        }
    }
    if rfq.version != expected_version {
        return Err(RfqError::Conflict {
            expected: expected_version,
            actual: rfq.version,
        });
    }
    if !matches!(rfq.status, RfqStatus::Sent | RfqStatus::Quoting) {
        return Err(RfqError::StateInvalid);
    }
    if now > rfq.expiry_instant {
        return Err(RfqError::Expired);
    }
    let quote = rfq.quotes.get(&quote_id).ok_or(RfqError::QuoteNotFound)?;
    if quote.is_expired(now) {
        return Err(RfqError::QuoteExpired);
    }

    rfq.status = RfqStatus::Accepted;
    rfq.accepted_quote_id = Some(quote_id.clone());
    rfq.version += 1;
    rfq.updated_at = now;

    let event = envelope(
        correlation,
        EventType::QuoteAccepted,
        Entity::new("Rfq", &rfq.rfq_id, rfq.version),
        QuoteAccepted {
            rfq_id: rfq.rfq_id.clone(),
            quote_id,
            requester_id: rfq.requester_id.clone(),
            idempotency_key: idempotency_key.clone(),
        },
    );
    let wrapped = RfqEvent::QuoteAccepted(event);
    rfq.last_accept = Some(AcceptRecord {
        idempotency_key,
        event: wrapped.clone(),
    });
    Ok(wrapped)
}

/// `cancelRFQ`: only the requester may cancel; idempotent on an already-cancelled RFQ.
pub fn cancel_rfq(
    rfq: &mut Rfq,
    correlation: &Correlation,
    requester_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<RfqEvent>, RfqError> {
    if rfq.requester_id != requester_id {
        return Err(RfqError::Forbidden);
    }
    if rfq.status == RfqStatus::Cancelled {
        return Ok(None);
    }
    if !matches!(
        rfq.status,
        RfqStatus::Created | RfqStatus::Sent | RfqStatus::Quoting
    ) {
        return Err(RfqError::StateInvalid);
    }

    rfq.status = RfqStatus::Cancelled;
    rfq.version += 1;
    rfq.updated_at = now;

    let event = envelope(
        correlation,
        EventType::RfqCancelled,
        Entity::new("Rfq", &rfq.rfq_id, rfq.version),
        RfqCancelled {
            rfq_id: rfq.rfq_id.clone(),
        },
    );
    Ok(Some(RfqEvent::Cancelled(event)))
}

/// Applied by the execution saga (C6) on LP last-look rejection. Returns the RFQ to QUOTING if
/// still open, otherwise terminal REJECTED.
pub fn reject_acceptance(
    rfq: &mut Rfq,
    correlation: &Correlation,
    quote_id: String,
    reason: String,
    now: DateTime<Utc>,
    reopen: bool,
) -> Result<RfqEvent, RfqError> {
    if rfq.status != RfqStatus::Accepted {
        return Err(RfqError::StateInvalid);
    }
    rfq.status = if reopen {
        RfqStatus::Quoting
    } else {
        RfqStatus::Rejected
    };
    rfq.accepted_quote_id = None;
    rfq.version += 1;
    rfq.updated_at = now;

    let event = envelope(
        correlation,
        EventType::QuoteAcceptanceRejected,
        Entity::new("Rfq", &rfq.rfq_id, rfq.version),
        QuoteAcceptanceRejected {
            rfq_id: rfq.rfq_id.clone(),
            quote_id,
            reason,
        },
    );
    Ok(RfqEvent::QuoteAcceptanceRejected(event))
}

/// Applied by the execution saga on execution confirmation: ACCEPTED → TRADED. `TradeExecuted`
/// itself is emitted by `orion-execution`; this only advances the RFQ's own status.
pub fn mark_traded(rfq: &mut Rfq, now: DateTime<Utc>) -> Result<(), RfqError> {
    if rfq.status != RfqStatus::Accepted {
        return Err(RfqError::StateInvalid);
    }
    rfq.status = RfqStatus::Traded;
    rfq.version += 1;
    rfq.updated_at = now;
    Ok(())
}

/// The expiry scanner (spec.md §4.4): transitions every RFQ in {SENT, QUOTING} whose
/// `expiryInstant <= now` to EXPIRED. Tolerates running behind — a concurrent `acceptQuote` that
/// already advanced `version` naturally wins because this function only mutates RFQs still at
/// the version it observed.
pub fn scan_expired<'a>(
    rfqs: impl IntoIterator<Item = &'a mut Rfq>,
    now: DateTime<Utc>,
) -> Vec<RfqEvent> {
    rfqs.into_iter()
        .filter(|rfq| {
            matches!(rfq.status, RfqStatus::Sent | RfqStatus::Quoting) && rfq.expiry_instant <= now
        })
        .map(|rfq| {
            rfq.status = RfqStatus::Expired;
            rfq.version += 1;
            rfq.updated_at = now;
            let correlation = Correlation::root(rfq.tenant_id.clone());
            RfqEvent::Expired(envelope(
                &correlation,
                EventType::RfqExpired,
                Entity::new("Rfq", &rfq.rfq_id, rfq.version),
                RfqExpired {
                    rfq_id: rfq.rfq_id.clone(),
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn instrument() -> InstrumentRef {
        InstrumentRef::new("EURUSD", "fx_spot", dec!(1), dec!(1), dec!(10_000_000))
    }

    fn correlation() -> Correlation {
        Correlation::root("tenant-1")
    }

    fn quote(id: &str, ask: Decimal, at_secs: i64) -> Quote {
        Quote {
            quote_id: id.to_string(),
            rfq_id: "rfq-1".to_string(),
            lp_id: "lp-1".to_string(),
            bid: None,
            ask: Some(ask),
            size: dec!(1_000_000),
            received_at: DateTime::UNIX_EPOCH + ChronoDuration::seconds(at_secs),
            valid_until: None,
        }
    }

    fn created_rfq(now: DateTime<Utc>) -> Rfq {
        let (rfq, _) = create_rfq(
            "rfq-1".to_string(),
            &correlation(),
            &instrument(),
            "requester-1".to_string(),
            Side::Buy,
            dec!(1_000_000),
            now + ChronoDuration::seconds(60),
            None,
            now,
            DEFAULT_MAX_EXPIRY,
        )
        .unwrap();
        rfq
    }

    #[test]
    fn create_rejects_expiry_beyond_max() {
        let now = Utc::now();
        let err = create_rfq(
            "rfq-2".to_string(),
            &correlation(),
            &instrument(),
            "requester-1".to_string(),
            Side::Buy,
            dec!(1_000_000),
            now + ChronoDuration::seconds(600),
            None,
            now,
            DEFAULT_MAX_EXPIRY,
        )
        .unwrap_err();
        assert_eq!(err, RfqError::InvalidExpiry);
    }

    #[test]
    fn first_quote_transitions_sent_to_quoting() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        send_rfq(&mut rfq, &correlation(), vec!["lp-1".to_string()], now).unwrap();
        assert_eq!(rfq.status, RfqStatus::Sent);

        record_quote(&mut rfq, &correlation(), quote("q1", dec!(1.10), 0), None, dec!(0.01), now)
            .unwrap();
        assert_eq!(rfq.status, RfqStatus::Quoting);
    }

    #[test]
    fn duplicate_quote_id_is_silent_idempotent_success() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        send_rfq(&mut rfq, &correlation(), vec![], now).unwrap();
        record_quote(&mut rfq, &correlation(), quote("q1", dec!(1.10), 0), None, dec!(0.01), now)
            .unwrap();
        let version_after_first = rfq.version;

        let result =
            record_quote(&mut rfq, &correlation(), quote("q1", dec!(1.20), 1), None, dec!(0.01), now)
                .unwrap();
        assert!(result.is_empty());
        assert_eq!(rfq.version, version_after_first);
        assert_eq!(rfq.quotes["q1"].ask, Some(dec!(1.10)));
    }

    #[test]
    fn record_quote_emits_a_ranking_projection_reflecting_the_tighter_quote() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        send_rfq(&mut rfq, &correlation(), vec![], now).unwrap();

        record_quote(&mut rfq, &correlation(), quote("q1", dec!(1.10), 0), None, dec!(0.01), now)
            .unwrap();
        let events =
            record_quote(&mut rfq, &correlation(), quote("q2", dec!(1.05), 1), None, dec!(0.01), now)
                .unwrap();

        let RfqEvent::Ranking(ranking_event) = events
            .iter()
            .find(|e| matches!(e, RfqEvent::Ranking(_)))
            .unwrap()
        else {
            unreachable!()
        };
        let best = ranking_event
            .payload
            .rankings
            .iter()
            .find(|r| r.is_best_for_side)
            .unwrap();
        assert_eq!(best.quote_id, "q2", "the tighter ask must be ranked best");
    }

    #[test]
    fn accept_quote_detects_version_conflict() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        send_rfq(&mut rfq, &correlation(), vec![], now).unwrap();
        record_quote(&mut rfq, &correlation(), quote("q1", dec!(1.10), 0), None, dec!(0.01), now)
            .unwrap();

        let stale_version = rfq.version - 1;
        let err = accept_quote(
            &mut rfq,
            &correlation(),
            "q1".to_string(),
            "idem-1".to_string(),
            stale_version,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, RfqError::Conflict { .. }));
    }

    #[test]
    fn accept_quote_replay_with_same_idempotency_key_returns_original_result() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        send_rfq(&mut rfq, &correlation(), vec![], now).unwrap();
        record_quote(&mut rfq, &correlation(), quote("q1", dec!(1.10), 0), None, dec!(0.01), now)
            .unwrap();

        let version = rfq.version;
        let first = accept_quote(
            &mut rfq,
            &correlation(),
            "q1".to_string(),
            "idem-1".to_string(),
            version,
            now,
        )
        .unwrap();
        let replay = accept_quote(
            &mut rfq,
            &correlation(),
            "q1".to_string(),
            "idem-1".to_string(),
            version,
            now,
        )
        .unwrap();

        let RfqEvent::QuoteAccepted(first_env) = first else {
            panic!("expected QuoteAccepted");
        };
        let RfqEvent::QuoteAccepted(replay_env) = replay else {
            panic!("expected QuoteAccepted");
        };
        assert_eq!(first_env.event_id, replay_env.event_id);
    }

    #[test]
    fn expiry_scan_transitions_quoting_rfqs_past_expiry() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        send_rfq(&mut rfq, &correlation(), vec![], now).unwrap();

        let later = now + ChronoDuration::seconds(120);
        let events = scan_expired(std::iter::once(&mut rfq), later);
        assert_eq!(events.len(), 1);
        assert_eq!(rfq.status, RfqStatus::Expired);
    }

    #[test]
    fn cancel_requires_requester_match() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        let err = cancel_rfq(&mut rfq, &correlation(), "someone-else", now).unwrap_err();
        assert_eq!(err, RfqError::Forbidden);
    }

    #[test]
    fn second_cancel_is_idempotent_no_op() {
        let now = Utc::now();
        let mut rfq = created_rfq(now);
        cancel_rfq(&mut rfq, &correlation(), "requester-1", now)
            .unwrap()
            .unwrap();
        let second = cancel_rfq(&mut rfq, &correlation(), "requester-1", now).unwrap();
        assert!(second.is_none());
    }
}
