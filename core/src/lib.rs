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
//! # orion-core
//!
//! Foundational crate of the Orion Trading Event Core: the canonical [`event::EventEnvelope`]
//! and [`event::EventType`] catalog (C1), the [`command::Command`] surface every aggregate
//! crate accepts, [`context::Correlation`] for explicit causal-chain propagation, the aggregated
//! [`error::OrionError`] type, and shared logging/shutdown plumbing.
//!
//! Every other workspace crate (`orion-outbox`, `orion-consumer`, `orion-rfq`,
//! `orion-execution`, `orion-marketdata`, `orion-control`) depends on this one; it depends on
//! none of them. Composition of the full system lives in the top-level `orion` facade crate.

use chrono::{DateTime, Utc};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Event envelope, catalog and entity attribution (C1). See spec.md §3-4.1.
pub mod event;

/// Request-scoped correlation/causation context, threaded explicitly through call frames.
pub mod context;

/// The command surface and its closed error-code set (spec.md §6).
pub mod command;

/// Aggregated error type for composition code.
pub mod error;

/// Tracing-based logging initialisers shared by every binary in the workspace.
pub mod logging;

/// Traits and types related to component shutdowns.
pub mod shutdown;

/// Test fixtures shared across the workspace's crates.
pub mod test_utils;

/// A value paired with the wall-clock time it was observed or produced.
///
/// Used where a bare value isn't enough to reason about staleness, eg/ the last tick seen for
/// an `(instrumentId, source)` pair (spec.md §7's 5s staleness threshold).
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Deserialize,
    Serialize,
    Constructor,
)]
pub struct Timed<T> {
    pub value: T,
    pub time: DateTime<Utc>,
}

/// A monotonically increasing sequence number.
///
/// Maps directly onto `entity.sequence` in [`event::Entity`]: every event attributed to a given
/// entity carries a strictly increasing `Sequence`, which is how consumers detect gaps and
/// out-of-order delivery (spec.md's ordering invariant for C3/C7).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor,
)]
pub struct Sequence(pub u64);

impl Sequence {
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the current sequence and advances self by one, mirroring `fetch_add` on an
    /// atomic counter.
    pub fn fetch_add(&mut self) -> Sequence {
        let sequence = *self;
        self.0 += 1;
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_fetch_add_returns_previous_and_advances() {
        let mut seq = Sequence(0);
        assert_eq!(seq.fetch_add(), Sequence(0));
        assert_eq!(seq.fetch_add(), Sequence(1));
        assert_eq!(seq.value(), 2);
    }
}
