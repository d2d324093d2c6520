//! Seed end-to-end scenarios for the RFQ aggregate (spec.md §8).

use chrono::{Duration, Utc};
use orion_core::{command::Side, context::Correlation};
use orion_rfq::{
    accept_quote, cancel_rfq, create_rfq, record_quote, send_rfq, InstrumentRef, Quote, RfqEvent,
    RfqError, RfqStatus, DEFAULT_MAX_EXPIRY,
};
use rust_decimal_macros::dec;

fn eurusd() -> InstrumentRef {
    InstrumentRef::new("EURUSD", "fx_spot", dec!(1), dec!(1), dec!(10_000_000))
}

fn quote(id: &str, lp: &str, ask: rust_decimal::Decimal, now: chrono::DateTime<Utc>) -> Quote {
    Quote {
        quote_id: id.to_string(),
        rfq_id: "rfq-1".to_string(),
        lp_id: lp.to_string(),
        bid: None,
        ask: Some(ask),
        size: dec!(1_000_000),
        received_at: now,
        valid_until: Some(now + Duration::seconds(30)),
    }
}

/// Scenario 1: happy RFQ. Two quotes arrive, the tighter one (q2) is accepted, and replaying the
/// same idempotency key produces no new trade (the aggregate itself enforces this; the saga that
/// actually emits `TradeExecuted` lives in `orion-execution`).
#[test]
fn happy_rfq_accepts_the_better_quote_and_is_idempotent_on_replay() {
    let now = Utc::now();
    let correlation = Correlation::root("t1");

    let (mut rfq, _created) = create_rfq(
        "rfq-1".to_string(),
        &correlation,
        &eurusd(),
        "trader-1".to_string(),
        Side::Buy,
        dec!(1_000_000),
        now + Duration::seconds(30),
        None,
        now,
        DEFAULT_MAX_EXPIRY,
    )
    .unwrap();
    assert_eq!(rfq.status, RfqStatus::Created);

    send_rfq(&mut rfq, &correlation, vec!["lp-a".to_string(), "lp-b".to_string()], now).unwrap();
    assert_eq!(rfq.status, RfqStatus::Sent);

    record_quote(&mut rfq, &correlation, quote("q1", "lp-a", dec!(1.0850), now), None, dec!(0.01), now)
        .unwrap();
    let after_q2 =
        record_quote(&mut rfq, &correlation, quote("q2", "lp-b", dec!(1.0848), now), None, dec!(0.01), now)
            .unwrap();
    assert_eq!(rfq.status, RfqStatus::Quoting);

    let ranking = after_q2
        .iter()
        .find_map(|e| match e {
            RfqEvent::Ranking(env) => Some(env),
            _ => None,
        })
        .expect("record_quote must publish a ranking projection");
    let best = ranking
        .payload
        .rankings
        .iter()
        .find(|r| r.is_best_for_side)
        .expect("a tighter quote must be ranked best");
    assert_eq!(best.quote_id, "q2", "q2's tighter ask must be ranked best, not hand-picked");

    let version_before_accept = rfq.version;
    let first = accept_quote(&mut rfq, &correlation, best.quote_id.clone(), "k1".to_string(), version_before_accept, now)
        .unwrap();
    assert_eq!(rfq.status, RfqStatus::Accepted);
    assert_eq!(rfq.accepted_quote_id.as_deref(), Some("q2"));

    let replay = accept_quote(&mut rfq, &correlation, best.quote_id.clone(), "k1".to_string(), version_before_accept, now)
        .unwrap();
    let (RfqEvent::QuoteAccepted(first_env), RfqEvent::QuoteAccepted(replay_env)) = (first, replay) else {
        panic!("expected QuoteAccepted both times");
    };
    assert_eq!(first_env.event_id, replay_env.event_id, "replay must not mint a new event");
    assert_eq!(rfq.version, version_before_accept + 1, "replay must not advance version again");
}

/// Scenario 2: expiry race. No quote arrives before `expiryInstant`; the expiry scanner moves
/// the RFQ to EXPIRED and any subsequent `acceptQuote` is rejected as `StateInvalid`.
#[test]
fn expiry_race_blocks_acceptance_after_expiry_scan() {
    let now = Utc::now();
    let correlation = Correlation::root("t1");

    let (mut rfq, _created) = create_rfq(
        "rfq-2".to_string(),
        &correlation,
        &eurusd(),
        "trader-1".to_string(),
        Side::Buy,
        dec!(1_000_000),
        now + Duration::seconds(2),
        None,
        now,
        DEFAULT_MAX_EXPIRY,
    )
    .unwrap();
    send_rfq(&mut rfq, &correlation, vec!["lp-a".to_string()], now).unwrap();

    let past_expiry = now + Duration::seconds(3);
    let events = orion_rfq::scan_expired(std::iter::once(&mut rfq), past_expiry);
    assert_eq!(events.len(), 1);
    assert_eq!(rfq.status, RfqStatus::Expired);

    let err = accept_quote(
        &mut rfq,
        &correlation,
        "q-never-arrived".to_string(),
        "k1".to_string(),
        rfq.version,
        past_expiry,
    )
    .unwrap_err();
    assert_eq!(err, RfqError::StateInvalid);
}

/// Scenario 3: duplicate quote. The same LP sends `q1` twice; exactly one `QuoteReceived` is
/// recorded and the second send is a silent no-op.
#[test]
fn duplicate_quote_from_same_lp_is_recorded_once() {
    let now = Utc::now();
    let correlation = Correlation::root("t1");

    let (mut rfq, _created) = create_rfq(
        "rfq-3".to_string(),
        &correlation,
        &eurusd(),
        "trader-1".to_string(),
        Side::Buy,
        dec!(1_000_000),
        now + Duration::seconds(30),
        None,
        now,
        DEFAULT_MAX_EXPIRY,
    )
    .unwrap();
    send_rfq(&mut rfq, &correlation, vec!["lp-a".to_string()], now).unwrap();

    let first = record_quote(&mut rfq, &correlation, quote("q1", "lp-a", dec!(1.0850), now), None, dec!(0.01), now)
        .unwrap();
    assert!(!first.is_empty());
    let version_after_first = rfq.version;

    let second = record_quote(&mut rfq, &correlation, quote("q1", "lp-a", dec!(1.0999), now), None, dec!(0.01), now)
        .unwrap();
    assert!(second.is_empty(), "duplicate quoteId must be a silent success");
    assert_eq!(rfq.version, version_after_first);
    assert_eq!(rfq.quotes.len(), 1);
    assert_eq!(rfq.quotes["q1"].ask, Some(dec!(1.0850)), "first quote's price wins");
}

/// Boundary: a quote arriving at exactly `expiryInstant` is rejected, matching `acceptQuote`'s
/// own `now > expiry` boundary policy.
#[test]
fn quote_arriving_exactly_at_expiry_is_rejected() {
    let now = Utc::now();
    let correlation = Correlation::root("t1");
    let expiry = now + Duration::seconds(10);

    let (mut rfq, _created) = create_rfq(
        "rfq-4".to_string(),
        &correlation,
        &eurusd(),
        "trader-1".to_string(),
        Side::Buy,
        dec!(1_000_000),
        expiry,
        None,
        now,
        DEFAULT_MAX_EXPIRY,
    )
    .unwrap();
    send_rfq(&mut rfq, &correlation, vec!["lp-a".to_string()], now).unwrap();

    let err = record_quote(&mut rfq, &correlation, quote("q1", "lp-a", dec!(1.0850), expiry), None, dec!(0.01), expiry)
        .unwrap_err();
    assert_eq!(err, RfqError::Expired);
}

/// Cancellation is idempotent: a second `cancelRFQ` from the same requester is a no-op, not an
/// error, so retried requests don't fail.
#[test]
fn cancel_is_idempotent_for_the_owning_requester() {
    let now = Utc::now();
    let correlation = Correlation::root("t1");

    let (mut rfq, _created) = create_rfq(
        "rfq-5".to_string(),
        &correlation,
        &eurusd(),
        "trader-1".to_string(),
        Side::Buy,
        dec!(1_000_000),
        now + Duration::seconds(30),
        None,
        now,
        DEFAULT_MAX_EXPIRY,
    )
    .unwrap();

    let first = cancel_rfq(&mut rfq, &correlation, "trader-1", now).unwrap();
    assert!(first.is_some());
    assert_eq!(rfq.status, RfqStatus::Cancelled);

    let second = cancel_rfq(&mut rfq, &correlation, "trader-1", now).unwrap();
    assert!(second.is_none());
}
