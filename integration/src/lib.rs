#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Integration — low-level plumbing
//!
//! Channel, collection and stream primitives shared by every Orion Trading
//! Event Core crate. Nothing in here is trading-domain specific: it is the
//! "cheap cardinality and cheap channel" toolkit that `orion-core`,
//! `orion-outbox`, `orion-consumer`, `orion-rfq`, `orion-execution`,
//! `orion-marketdata` and `orion-control` all build on.

use serde::{Deserialize, Serialize};

/// Errors produced by the plumbing in this crate.
pub mod error;

/// `Tx` channel abstraction plus droppable-sender wrappers.
pub mod channel;

/// Variable-cardinality collection types (`OneOrMany`, `NoneOneOrMany`) and fast
/// `IndexMap`/`IndexSet` aliases.
pub mod collection;

/// [`Validator`]s are capable of determining if their internal state is satisfactory to fulfill
/// some use case defined by the implementor.
pub trait Validator {
    /// Check if `Self` is valid for some use case.
    fn validate(self) -> Result<Self, error::IntegrationError>
    where
        Self: Sized;
}

/// Determines if something is considered "unrecoverable", such as an unrecoverable error.
pub trait Unrecoverable {
    fn is_unrecoverable(&self) -> bool;
}

/// Communicates if something is terminal (eg/ requires shutdown or restart).
///
/// Used by `orion-core::EngineEvent`/`orion-consumer` loops to know when to stop polling.
pub trait Terminal {
    fn is_terminal(&self) -> bool;
}

/// Indicates an `Iterator` or `Stream` has ended.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize,
)]
pub struct FeedEnded;
