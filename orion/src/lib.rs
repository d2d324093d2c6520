#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]
//! # orion
//!
//! Facade crate for the Orion Trading Event Core: re-exports every component crate under a
//! single namespace and provides [`system::System`], the builder that wires the spawnable pieces
//! (the outbox relay, the market-data pipeline and fan-out clock) together with the shared
//! control-plane state (kill switch, rate limiters) a running process needs.
//!
//! Users who only need one or two aggregates (eg/ a service that only handles RFQs) should
//! depend on `orion-rfq` directly rather than pulling in this crate.
//!
//! # Example
//! ```rust,ignore
//! use orion::prelude::*;
//! use orion::system::{SystemArgs, SystemBuilder};
//!
//! let system = SystemBuilder::new(SystemArgs::default()).build()?.init();
//! ```

pub use orion_control as control;
pub use orion_core as core;
pub use orion_execution as execution;
pub use orion_integration as integration;
pub use orion_marketdata as marketdata;
pub use orion_outbox as outbox;
pub use orion_rfq as rfq;

// `orion-consumer` is re-exported under its own name rather than shortened: `process_event` is
// invoked per-event by the caller's own message-bus poll loop (spec.md §4.3's consumer isn't a
// task this crate spawns), so callers reach it as `orion::consumer::process_event` alongside
// their own bus client, not through `system::System`.
pub use orion_consumer as consumer;

pub mod router;
pub mod system;

/// Commonly needed symbols across every aggregate: the event envelope, the correlation context,
/// and the facade's own composition types.
pub mod prelude {
    pub use crate::control::{evaluate, CallerLimits, CommandKind, ControlError, KillSwitchState};
    pub use crate::core::command::{Command, CommandError, ErrorCode};
    pub use crate::core::context::Correlation;
    pub use crate::core::error::OrionError;
    pub use crate::core::event::{Entity, EventEnvelope, EventType};
    pub use crate::execution::{Order, OrderError, OrderEvent, OrderStatus};
    pub use crate::marketdata::{Fanout, FanoutConfig, Pipeline, Tick};
    pub use crate::rfq::{Rfq, RfqError, RfqEvent, RfqStatus};
    pub use crate::router::{dispatch, Aggregate, Dispatched};
    pub use crate::system::{System, SystemArgs, SystemBuilder};
}
