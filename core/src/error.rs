//! # Core error types
//!
//! Centralized error handling aggregating the per-crate error enums of the Trading Event Core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Central error type used by composition code in the `orion` facade crate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Error)]
pub enum OrionError {
    /// An outbound channel's receiver was dropped (a component shut down unexpectedly).
    #[error("channel receiver dropped: {0}")]
    RxDropped(#[from] RxDropped),

    /// An awaited async task panicked or was cancelled.
    #[error("task join error: {0}")]
    JoinError(String),

    /// A component could not be constructed from its configuration.
    #[error("builder error: {0}")]
    Builder(String),
}

/// Indicates that the receiver side of a communication channel was dropped.
///
/// Typical scenarios: a consumer task panicked, the relay's publish channel was dropped during
/// shutdown, or a subscriber's fan-out channel closed mid-stream.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
#[error("RxDropped")]
pub struct RxDropped;

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for RxDropped {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for OrionError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::RxDropped(RxDropped)
    }
}

impl From<tokio::task::JoinError> for OrionError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::JoinError(format!("{value:?}"))
    }
}
