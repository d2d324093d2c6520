//! System composition (spec.md §1's five responsibilities, wired into one process).
//!
//! Uses a `SystemArgs` → `SystemBuilder` → `SystemBuild::init()` → `System` staging:
//! `build()` assembles every component but starts no tasks; `init()` spawns the
//! long-running loops (outbox relay, market-data fan-out) and hands back a `System` holding
//! their `JoinHandle`s plus the shared control-plane state every command dispatch consults.
//!
//! What this does NOT do: accept inbound commands from a transport, run a consumer's
//! message-bus poll loop, or construct a `PgPool`/Kafka client. Those boundaries (gRPC/HTTP,
//! the message bus) are out of scope per spec.md §1; callers own them and call into the pieces
//! assembled here — `crate::router::dispatch` for the gate-then-aggregate sequencing,
//! `orion_consumer::process_event` for inbound replay.

use std::sync::Arc;

use orion_control::{KillSwitchState, RateLimitConfig, RateLimiters};
use orion_core::{context::Correlation, error::OrionError};
use orion_marketdata::fanout::Snapshot;
use orion_marketdata::{Fanout, FanoutConfig, OrderingTracker, Pipeline, RawTick, StalenessTracker};
use orion_outbox::{LogPublisher, RelayConfig};
use parking_lot::RwLock;
use sqlx::PgPool;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Optional outbox relay wiring. Omit it (leave `SystemArgs::outbox` `None`) when the caller
/// publishes from its own process, or in tests that only exercise the aggregates.
pub struct OutboxArgs {
    pub pool: PgPool,
    pub publisher: Box<dyn LogPublisher>,
    pub config: RelayConfig,
}

/// Optional market-data ingest wiring: a receiver already fed by whichever ingestion mode the
/// caller picked ([`orion_marketdata::SimulatedSource`], [`orion_marketdata::ReplaySource`], or
/// an [`orion_marketdata::Adapter`] impl driven through [`orion_marketdata::AdapterSource`]).
pub struct MarketDataArgs {
    pub correlation: Correlation,
    pub ticks: mpsc::Receiver<RawTick>,
    pub fanout: FanoutConfig,
    pub late_threshold: chrono::Duration,
    pub stale_threshold: chrono::Duration,
    pub staleness_scan_interval: std::time::Duration,
}

/// Everything needed to assemble a running Orion Trading Event Core process.
pub struct SystemArgs {
    pub rate_limits: RateLimitConfig,
    pub kill_switch: KillSwitchState,
    pub outbox: Option<OutboxArgs>,
    pub marketdata: Option<MarketDataArgs>,
}

impl Default for SystemArgs {
    fn default() -> Self {
        Self {
            rate_limits: RateLimitConfig::default(),
            kill_switch: KillSwitchState::default(),
            outbox: None,
            marketdata: None,
        }
    }
}

/// Builds a [`SystemBuild`] from [`SystemArgs`]. Construction never starts a task; call
/// [`SystemBuild::init`] for that.
#[derive(Debug)]
pub struct SystemBuilder {
    args: SystemArgs,
}

impl SystemBuilder {
    pub fn new(args: SystemArgs) -> Self {
        Self { args }
    }

    pub fn build(self) -> Result<SystemBuild, OrionError> {
        let rate_limiters = RateLimiters::new(self.args.rate_limits);
        let kill_switch = Arc::new(RwLock::new(self.args.kill_switch));

        let fanout = self.args.marketdata.as_ref().map(|md| Fanout::new(md.fanout));

        Ok(SystemBuild {
            rate_limiters: Arc::new(rate_limiters),
            kill_switch,
            outbox: self.args.outbox,
            marketdata: self.args.marketdata,
            fanout,
        })
    }
}

impl std::fmt::Debug for SystemBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemBuilder").finish_non_exhaustive()
    }
}

/// Fully assembled, not-yet-running system. Holds everything [`SystemBuild::init`] needs to
/// spawn the long-running loops.
pub struct SystemBuild {
    pub rate_limiters: Arc<RateLimiters>,
    pub kill_switch: Arc<RwLock<KillSwitchState>>,
    outbox: Option<OutboxArgs>,
    marketdata: Option<MarketDataArgs>,
    fanout: Option<(Arc<Fanout>, watch::Receiver<Snapshot>)>,
}

impl std::fmt::Debug for SystemBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemBuild").finish_non_exhaustive()
    }
}

impl SystemBuild {
    /// Spawns the outbox relay (if configured) and the market-data pipeline + fan-out clock (if
    /// configured) on the current tokio runtime, returning the running [`System`].
    pub fn init(self) -> System {
        let mut handles = Vec::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        if let Some(outbox) = self.outbox {
            let rx = shutdown_rx.clone();
            handles.push(tokio::spawn(async move {
                orion_outbox::relay_loop(outbox.pool, outbox.publisher, outbox.config, rx).await;
            }));
        }

        let fanout_rx = self.fanout.as_ref().map(|(_, rx)| rx.clone());
        if let (Some(md), Some((fanout, _))) = (self.marketdata, self.fanout) {
            let correlation = md.correlation;
            let pipeline = Pipeline::new(
                OrderingTracker::new(md.late_threshold),
                StalenessTracker::new(md.stale_threshold),
                Arc::clone(&fanout),
            );
            let scan_interval = md.staleness_scan_interval;
            handles.push(tokio::spawn(async move {
                pipeline.run(correlation, md.ticks, scan_interval).await;
            }));
            handles.push(tokio::spawn(async move {
                fanout.run().await;
            }));
        }

        System {
            rate_limiters: self.rate_limiters,
            kill_switch: self.kill_switch,
            fanout: fanout_rx,
            handles,
            shutdown: shutdown_tx,
        }
    }
}

/// A running Orion Trading Event Core process. Dropping this does not stop the spawned tasks —
/// call [`System::shutdown`] for a graceful stop.
pub struct System {
    pub rate_limiters: Arc<RateLimiters>,
    pub kill_switch: Arc<RwLock<KillSwitchState>>,
    pub fanout: Option<watch::Receiver<Snapshot>>,
    handles: Vec<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("tasks", &self.handles.len())
            .finish_non_exhaustive()
    }
}

impl orion_core::shutdown::AsyncShutdown for System {
    type Result = Result<(), OrionError>;

    fn shutdown(&mut self) -> impl std::future::Future<Output = Self::Result> {
        async move {
            let _ = self.shutdown.send(true);
            Ok(())
        }
    }
}
