//! # orion-control
//!
//! The control-plane gate (C8): kill switch, entitlement checks, rate limits and max-notional
//! ceilings, evaluated in that order before any command reaches an aggregate. See spec.md §4.8.
#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

pub mod check;
pub mod entitlement;
pub mod error;
pub mod gate;
pub mod kill_switch;
pub mod payloads;
pub mod rate_limit;

pub use entitlement::Entitlement;
pub use error::ControlError;
pub use gate::{evaluate, CallerLimits, CommandKind};
pub use kill_switch::KillSwitchState;
pub use rate_limit::{RateLimitConfig, RateLimiters};
