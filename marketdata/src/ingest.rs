//! Tick ingestion (C7, spec.md §4.7): three interchangeable modes feed the same normalization
//! pipeline — a simulated random-walk generator, a recorded replay at a configurable speed
//! factor, and a minimal `Adapter` trait for a real venue feed.

use std::time::Duration as StdDuration;

use rand::Rng;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use tokio::sync::mpsc;

use crate::tick::{RawTick, TickMode};

/// A venue adapter's tick callback, invoked once per normalized tick as it arrives off the wire.
pub type TickCallback = Box<dyn Fn(RawTick) + Send + Sync>;

/// The minimal capability set an external venue adapter must provide: `{connect, subscribe,
/// onTick, disconnect}` (spec.md §4.7(c)). `on_tick` registers the callback the adapter invokes
/// for every tick once subscribed; `disconnect` must be safe to call even if `connect` was never
/// reached.
#[async_trait::async_trait]
pub trait Adapter: Send + Sync {
    async fn connect(&mut self) -> Result<(), AdapterError>;
    async fn subscribe(&mut self, instruments: &[SmolStr]) -> Result<(), AdapterError>;
    fn on_tick(&mut self, callback: TickCallback);
    async fn disconnect(&mut self) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AdapterError {
    #[error("adapter connection failed: {0}")]
    ConnectionFailed(String),
    #[error("subscription rejected: {0}")]
    SubscriptionRejected(String),
}

/// Drives an `Adapter` and republishes whatever it pushes through `on_tick` as normalized
/// `RawTick`s onto `sink`. Adapters are expected to translate their venue's wire format
/// themselves; this type only owns the connect/subscribe/on_tick/disconnect lifecycle, since the
/// wire decode is adapter-specific and out of scope here.
pub struct AdapterSource<A: Adapter> {
    adapter: A,
}

impl<A: Adapter> AdapterSource<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    pub async fn start(
        &mut self,
        instruments: &[SmolStr],
        sink: mpsc::Sender<RawTick>,
    ) -> Result<(), AdapterError> {
        self.adapter.on_tick(Box::new(move |tick| {
            let _ = sink.try_send(tick);
        }));
        self.adapter.connect().await?;
        self.adapter.subscribe(instruments).await?;
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), AdapterError> {
        self.adapter.disconnect().await
    }
}

/// Generates a random-walk tick stream for a fixed instrument universe, at `ticks_per_second`,
/// until the receiving end of `sink` is dropped.
pub struct SimulatedSource {
    instruments: Vec<SmolStr>,
    ticks_per_second: u32,
    tick_step: Decimal,
}

impl SimulatedSource {
    pub fn new(instruments: Vec<SmolStr>, ticks_per_second: u32, tick_step: Decimal) -> Self {
        Self {
            instruments,
            ticks_per_second,
            tick_step,
        }
    }

    pub async fn run(self, sink: mpsc::Sender<RawTick>) {
        let mut mids: Vec<Decimal> = self.instruments.iter().map(|_| Decimal::new(11000, 4)).collect();
        let period = StdDuration::from_secs_f64(1.0 / self.ticks_per_second.max(1) as f64);
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let mut rng = rand::rng();
            for (idx, instrument) in self.instruments.iter().enumerate() {
                let drift = if rng.random_bool(0.5) { self.tick_step } else { -self.tick_step };
                mids[idx] += drift;
                let spread = Decimal::new(2, 4);
                let tick = RawTick {
                    instrument_id: instrument.clone(),
                    source: "simulated".into(),
                    bid: mids[idx] - spread,
                    ask: mids[idx] + spread,
                    source_time: chrono::Utc::now(),
                };
                if sink.send(tick).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Replays a fixed, pre-recorded sequence of ticks, respecting their original relative timing
/// scaled by `speed_factor` (2.0 plays twice as fast; values <= 0 are clamped to real time).
pub struct ReplaySource {
    ticks: Vec<RawTick>,
    speed_factor: f64,
}

impl ReplaySource {
    pub fn new(ticks: Vec<RawTick>, speed_factor: f64) -> Self {
        Self {
            ticks,
            speed_factor: if speed_factor > 0.0 { speed_factor } else { 1.0 },
        }
    }

    pub async fn run(self, sink: mpsc::Sender<RawTick>) {
        let mut prev_source_time = None;
        for tick in self.ticks {
            if let Some(prev) = prev_source_time {
                let gap = (tick.source_time - prev).to_std().unwrap_or_default();
                let scaled = gap.div_f64(self.speed_factor);
                tokio::time::sleep(scaled).await;
            }
            prev_source_time = Some(tick.source_time);
            if sink.send(tick).await.is_err() {
                return;
            }
        }
    }
}

pub fn mode_of_source(source: &str) -> TickMode {
    match source {
        "simulated" => TickMode::Simulated,
        "replay" => TickMode::Replay,
        _ => TickMode::Adapter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeAdapter {
        callback: Option<TickCallback>,
    }

    #[async_trait::async_trait]
    impl Adapter for FakeAdapter {
        async fn connect(&mut self) -> Result<(), AdapterError> {
            Ok(())
        }

        async fn subscribe(&mut self, instruments: &[SmolStr]) -> Result<(), AdapterError> {
            let callback = self.callback.as_ref().expect("on_tick registered before subscribe");
            for instrument in instruments {
                callback(RawTick {
                    instrument_id: instrument.clone(),
                    source: "fake-venue".into(),
                    bid: Decimal::new(11000, 4),
                    ask: Decimal::new(11002, 4),
                    source_time: chrono::Utc::now(),
                });
            }
            Ok(())
        }

        fn on_tick(&mut self, callback: TickCallback) {
            self.callback = Some(callback);
        }

        async fn disconnect(&mut self) -> Result<(), AdapterError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn adapter_source_forwards_ticks_through_on_tick_to_the_sink() {
        let mut source = AdapterSource::new(FakeAdapter { callback: None });
        let (tx, mut rx) = mpsc::channel(16);

        source.start(&[SmolStr::new("EURUSD")], tx).await.unwrap();

        let tick = rx.recv().await.expect("tick forwarded via on_tick");
        assert_eq!(tick.instrument_id, "EURUSD");
        assert_eq!(tick.source, "fake-venue");
    }

    #[tokio::test]
    async fn simulated_source_emits_ticks_for_every_instrument() {
        let instruments = vec![SmolStr::new("EURUSD"), SmolStr::new("GBPUSD")];
        let (tx, mut rx) = mpsc::channel(16);
        let source = SimulatedSource::new(instruments, 1000, Decimal::new(1, 4));
        tokio::spawn(source.run(tx));

        let first = rx.recv().await.expect("tick");
        let second = rx.recv().await.expect("tick");
        assert_ne!(first.instrument_id, second.instrument_id);
    }

    #[tokio::test]
    async fn replay_source_emits_in_order() {
        let t0 = chrono::Utc::now();
        let ticks = vec![
            RawTick {
                instrument_id: "EURUSD".into(),
                source: "replay".into(),
                bid: Decimal::new(11000, 4),
                ask: Decimal::new(11002, 4),
                source_time: t0,
            },
            RawTick {
                instrument_id: "EURUSD".into(),
                source: "replay".into(),
                bid: Decimal::new(11001, 4),
                ask: Decimal::new(11003, 4),
                source_time: t0 + chrono::Duration::milliseconds(5),
            },
        ];
        let (tx, mut rx) = mpsc::channel(16);
        let source = ReplaySource::new(ticks, 100.0);
        source.run(tx).await;

        let first = rx.recv().await.expect("tick");
        let second = rx.recv().await.expect("tick");
        assert!(second.source_time > first.source_time);
    }
}
