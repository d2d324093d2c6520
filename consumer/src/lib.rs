#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
//! # orion-consumer
//!
//! Idempotent consumer runtime (C3): at-least-once delivery, exactly-once effect. Every
//! consumer group (projections, the execution saga, the post-trade saga) implements
//! [`handler::ConsumerHandler`] and drives its events through [`runtime::process_event`], which
//! owns the dedup claim, transient retry/backoff, DLQ routing, and per-partition sequence-gap
//! detection described in spec.md §4.3.

pub mod config;
pub mod dedup;
pub mod dlq;
pub mod error;
pub mod handler;
pub mod runtime;
pub mod sequence;

pub use config::ConsumerConfig;
pub use error::{ConsumerError, HandlerFailure};
pub use handler::ConsumerHandler;
pub use runtime::{process_event, Outcome};
pub use sequence::SequenceTracker;
