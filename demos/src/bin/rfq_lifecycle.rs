//! Walks one RFQ through its full happy-path lifecycle (spec.md §4.4):
//! create → send → quote → accept → mark traded, printing each emitted event.

use chrono::{Duration, Utc};
use orion_core::{command::Side, context::Correlation};
use orion_rfq::{
    accept_quote, create_rfq, mark_traded, record_quote, send_rfq, InstrumentRef, Quote, RfqEvent,
    DEFAULT_MAX_EXPIRY,
};
use rust_decimal_macros::dec;

fn main() {
    tracing_subscriber::fmt::init();

    let correlation = Correlation::root("tenant-demo");
    let instrument = InstrumentRef::new("EURUSD", "fx_spot", dec!(1), dec!(1), dec!(10_000_000));
    let now = Utc::now();

    let (mut rfq, created) = create_rfq(
        "rfq-demo-1".to_string(),
        &correlation,
        &instrument,
        "trader-1".to_string(),
        Side::Buy,
        dec!(1_000_000),
        now + Duration::seconds(60),
        None,
        now,
        DEFAULT_MAX_EXPIRY,
    )
    .expect("valid RFQ");
    print_event(&created);

    let sent = send_rfq(&mut rfq, &correlation, vec!["lp-1".to_string(), "lp-2".to_string()], now)
        .expect("CREATED -> SENT");
    print_event(&sent);

    let quote = Quote {
        quote_id: "quote-1".to_string(),
        rfq_id: rfq.rfq_id.clone(),
        lp_id: "lp-1".to_string(),
        bid: None,
        ask: Some(dec!(1.0855)),
        size: dec!(1_000_000),
        received_at: now,
        valid_until: Some(now + Duration::seconds(30)),
    };
    for event in record_quote(&mut rfq, &correlation, quote, None, dec!(0.001), now)
        .expect("quote accepted by the aggregate")
    {
        print_event(&event);
    }

    let accepted = accept_quote(
        &mut rfq,
        &correlation,
        "quote-1".to_string(),
        "idem-demo-1".to_string(),
        rfq.version,
        now,
    )
    .expect("quote-1 exists and RFQ is QUOTING");
    print_event(&accepted);

    mark_traded(&mut rfq, now).expect("execution saga confirms the trade");
    println!("final status: {:?} (version {})", rfq.status, rfq.version);
}

fn print_event(event: &RfqEvent) {
    println!("{event:?}");
}
