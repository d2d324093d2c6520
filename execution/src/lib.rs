//! # orion-execution
//!
//! Order aggregate & OMS (C5), abstract LP/venue adapter, and the execution & post-trade saga
//! with settlement retries (C6). See spec.md §4.5-4.6.
#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

pub mod client;
pub mod error;
pub mod last_look;
pub mod order;
pub mod payloads;
pub mod saga;

pub use client::{ExecutionClient, MockExecutionClient, VenueAck};
pub use error::{ClientError, OrderError, SagaError};
pub use last_look::{LastLookDecision, LastLookStrategy, NoOpLastLook, TimingDriftLastLook};
pub use order::{
    acknowledge, amend, apply_fill, confirm_cancel, place_order, reject, request_cancel, Order,
    OrderEvent, OrderStatus,
};
pub use saga::{
    advance_after_failure, begin_attempt, confirm_trade, create_trade, mark_failed, mark_settled,
    next_backoff, request_settlement, simulate_outcome, Settlement, SettlementConfig,
    SettlementStatus, Trade,
};
