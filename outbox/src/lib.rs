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
#![allow(clippy::type_complexity)]
//! # orion-outbox
//!
//! Transactional outbox writer and relay (C2): the pattern that turns a single state-mutating
//! command into "exactly one outbox row per intended event", published to the log at-least-once
//! with a dead-letter fallback after exhausting retries. See spec.md §4.2.
//!
//! - [`writer::write_transactional`] is called by `orion-rfq`/`orion-execution`/`orion-control`
//!   alongside their aggregate writes, inside the same DB transaction.
//! - [`relay::relay_loop`] runs as a standalone background task (typically its own process, so
//!   it scales independently of the command-handling services) and drives unpublished rows to
//!   the log.

pub mod config;
pub mod error;
pub mod relay;
pub mod row;
pub mod writer;

pub use config::RelayConfig;
pub use error::{OutboxError, PublishError};
pub use relay::{relay_loop, LogPublisher};
pub use row::{DeadLetterRow, OutboxRow};
pub use writer::{write_transactional, TxFuture};
