//! Runs a simulated tick source through the full market-data pipeline (C7, spec.md §4.7) and
//! prints each coalesced snapshot as it's published.

use std::sync::Arc;
use std::time::Duration;

use orion_core::context::Correlation;
use orion_marketdata::{Fanout, FanoutConfig, OrderingTracker, Pipeline, SimulatedSource, StalenessTracker};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let correlation = Correlation::root("tenant-demo");
    let (fanout, mut snapshots) = Fanout::new(FanoutConfig {
        interval: Duration::from_millis(200),
    });

    let pipeline = Pipeline::new(
        OrderingTracker::new(chrono::Duration::seconds(1)),
        StalenessTracker::new(chrono::Duration::seconds(5)),
        Arc::clone(&fanout),
    );

    let (tx, rx) = mpsc::channel(256);
    let source = SimulatedSource::new(
        vec!["EURUSD".into(), "GBPUSD".into(), "USDJPY".into()],
        20,
        rust_decimal_macros::dec!(0.0001),
    );

    tokio::spawn(source.run(tx));
    tokio::spawn(pipeline.run(correlation, rx, Duration::from_secs(1)));
    tokio::spawn(fanout.run());

    for _ in 0..10 {
        snapshots.changed().await.expect("fanout task alive");
        let snapshot = snapshots.borrow_and_update().clone();
        println!("snapshot: {snapshot:?}");
    }
}
