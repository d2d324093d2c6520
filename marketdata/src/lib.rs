#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]
//! # orion-marketdata
//!
//! Tick ingestion (simulated random-walk, recorded replay, pluggable adapter), normalization,
//! per-`(instrumentId, source)` staleness detection, per-instrument ordering and coalesced
//! fan-out for the Orion Trading Event Core (C7). See spec.md §4.7.

pub mod fanout;
pub mod ingest;
pub mod ordering;
pub mod payloads;
pub mod pipeline;
pub mod staleness;
pub mod tick;

pub use fanout::{Fanout, FanoutConfig, Snapshot, Subscription};
pub use ingest::{Adapter, AdapterError, AdapterSource, ReplaySource, SimulatedSource};
pub use ordering::OrderingTracker;
pub use pipeline::{DropCounters, Pipeline};
pub use staleness::StalenessTracker;
pub use tick::{validate, RawTick, Tick, TickMode, TickValidationError};
