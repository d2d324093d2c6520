//! Coalesced fan-out (C7, spec.md §4.7): ticks are coalesced into a snapshot published at a
//! configurable cadence (default 100 ms / 10 Hz). Within a coalescing window, several ticks on
//! the same instrument collapse into the one incremental update the window publishes; a
//! subscriber that cannot keep up simply observes the latest snapshot when it next looks, rather
//! than queuing — `tokio::sync::watch` gives this "keep only the latest" behaviour for free,
//! which is the backpressure-drop-latest semantics spec.md calls for.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use smol_str::SmolStr;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::payloads::MarketSnapshotUpdated;
use crate::tick::Tick;

#[derive(Debug, Clone, Copy)]
pub struct FanoutConfig {
    pub interval: StdDuration,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            interval: StdDuration::from_millis(100),
        }
    }
}

/// The coalesced view published to subscribers at each tick of the fan-out clock.
pub type Snapshot = Arc<HashMap<SmolStr, MarketSnapshotUpdated>>;

/// A subscriber's instrument scope (spec.md §4.7/§6: `Subscribe(instrumentIds[])`). `All` is
/// used internally by the fan-out clock itself; subscribers always pass `Only`.
#[derive(Debug, Clone)]
enum InstrumentFilter {
    All,
    Only(HashSet<SmolStr>),
}

impl InstrumentFilter {
    fn scoped(instruments: &[SmolStr]) -> Self {
        InstrumentFilter::Only(instruments.iter().cloned().collect())
    }

    fn apply(&self, snapshot: &Snapshot) -> Snapshot {
        match self {
            InstrumentFilter::All => Arc::clone(snapshot),
            InstrumentFilter::Only(ids) => Arc::new(
                snapshot
                    .iter()
                    .filter(|(id, _)| ids.contains(*id))
                    .map(|(id, update)| (id.clone(), update.clone()))
                    .collect(),
            ),
        }
    }
}

/// A scoped fan-out subscription: reads the shared coalesced snapshot but exposes only the
/// instruments the subscriber asked for.
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
    filter: InstrumentFilter,
}

impl Subscription {
    /// Waits for the next coalescing window to publish, mirroring [`watch::Receiver::changed`].
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// Returns the current snapshot restricted to this subscription's instruments, marking it
    /// as seen the same way [`watch::Receiver::borrow_and_update`] does.
    pub fn snapshot(&mut self) -> Snapshot {
        let full = self.rx.borrow_and_update().clone();
        self.filter.apply(&full)
    }
}

/// Accumulates the latest tick per instrument and periodically publishes a coalesced snapshot.
/// A new subscriber's first read of the channel is the full current snapshot; every later read
/// is the incremental diff the coalescing window produced since the subscriber last looked.
pub struct Fanout {
    config: FanoutConfig,
    latest: Mutex<HashMap<SmolStr, Tick>>,
    tx: watch::Sender<Snapshot>,
}

impl Fanout {
    pub fn new(config: FanoutConfig) -> (Arc<Self>, watch::Receiver<Snapshot>) {
        let (tx, rx) = watch::channel(Arc::new(HashMap::new()));
        (
            Arc::new(Self {
                config,
                latest: Mutex::new(HashMap::new()),
                tx,
            }),
            rx,
        )
    }

    /// Records a normalized tick. The tick is held until the next coalescing window fires; a
    /// burst of ticks on the same instrument within one window is collapsed to the last value.
    pub fn ingest(&self, tick: Tick) {
        self.latest.lock().insert(tick.instrument_id.clone(), tick);
    }

    /// Subscribes to coalesced updates scoped to `instruments` only (spec.md §4.7/§6:
    /// `Subscribe(instrumentIds[])`). The first `snapshot()` read is the current state for
    /// those instruments; every later one is the incremental diff since last read.
    pub fn subscribe(&self, instruments: &[SmolStr]) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            filter: InstrumentFilter::scoped(instruments),
        }
    }

    /// Transport-agnostic subscription: a `Stream` of coalesced snapshots scoped to
    /// `instruments`, the first item being the current snapshot (subscribe's immediate send)
    /// and every later item an incremental update. The BFF/WebSocket boundary that fans this
    /// out to browser clients is out of scope.
    pub fn subscribe_stream(&self, instruments: &[SmolStr]) -> impl Stream<Item = Snapshot> {
        let filter = InstrumentFilter::scoped(instruments);
        WatchStream::new(self.tx.subscribe()).map(move |snapshot| filter.apply(&snapshot))
    }

    /// Runs the coalescing clock until every receiver is dropped. Each firing publishes the
    /// full latest-known state as one snapshot; `watch::Sender::send` overwrites any value a
    /// slow subscriber hasn't yet observed, which is the drop-latest backpressure policy.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.interval);
        loop {
            interval.tick().await;
            let drained: HashMap<SmolStr, Tick> = self.latest.lock().clone();
            if drained.is_empty() {
                continue;
            }
            let snapshot: HashMap<SmolStr, MarketSnapshotUpdated> = drained
                .into_iter()
                .map(|(id, tick)| {
                    (
                        id.clone(),
                        MarketSnapshotUpdated {
                            instrument_id: id.to_string(),
                            bid: tick.bid,
                            ask: tick.ask,
                            source_time: tick.source_time,
                        },
                    )
                })
                .collect();
            if self.tx.send(Arc::new(snapshot)).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tick(instrument: &str) -> Tick {
        Tick {
            instrument_id: instrument.into(),
            source: "sim".into(),
            bid: dec!(1.1000),
            ask: dec!(1.1002),
            source_time: chrono::Utc::now(),
            ingested_at: chrono::Utc::now(),
            late: false,
        }
    }

    #[tokio::test]
    async fn coalescing_window_collapses_bursts_to_one_entry() {
        let (fanout, _rx) = Fanout::new(FanoutConfig {
            interval: StdDuration::from_millis(20),
        });
        fanout.ingest(tick("EURUSD"));
        fanout.ingest(tick("EURUSD"));
        fanout.ingest(tick("GBPUSD"));

        let mut sub = fanout.subscribe(&["EURUSD".into(), "GBPUSD".into()]);
        let handle = tokio::spawn(Arc::clone(&fanout).run());
        sub.changed().await.expect("snapshot published");
        let snapshot = sub.snapshot();
        assert_eq!(snapshot.len(), 2);
        handle.abort();
    }

    #[tokio::test]
    async fn late_subscriber_sees_latest_snapshot_not_a_backlog() {
        let (fanout, _rx) = Fanout::new(FanoutConfig {
            interval: StdDuration::from_millis(10),
        });
        fanout.ingest(tick("EURUSD"));
        let mut sub = fanout.subscribe(&["EURUSD".into()]);
        let handle = tokio::spawn(Arc::clone(&fanout).run());
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        sub.changed().await.ok();
        let snapshot = sub.snapshot();
        assert_eq!(snapshot.len(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn subscription_only_sees_its_requested_instruments() {
        let (fanout, _rx) = Fanout::new(FanoutConfig {
            interval: StdDuration::from_millis(10),
        });
        fanout.ingest(tick("EURUSD"));
        fanout.ingest(tick("GBPUSD"));

        let mut sub = fanout.subscribe(&["EURUSD".into()]);
        let handle = tokio::spawn(Arc::clone(&fanout).run());
        sub.changed().await.expect("snapshot published");
        let snapshot = sub.snapshot();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key(&SmolStr::new("EURUSD")));
        assert!(!snapshot.contains_key(&SmolStr::new("GBPUSD")));
        handle.abort();
    }
}
