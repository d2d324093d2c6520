//! # orion-rfq
//!
//! The RFQ aggregate (C4): finite-state-machine lifecycle, quote ranking, and the expiry
//! scanner, as specified in spec.md §4.4.
#![forbid(unsafe_code)]
#![warn(unused, missing_debug_implementations, rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

pub mod error;
pub mod payloads;
pub mod quote;
pub mod reference;
pub mod rfq;

pub use error::RfqError;
pub use payloads::{QuoteRankEntry, QuoteRanking};
pub use quote::{rank_quotes, Quote, QuoteRank};
pub use reference::{InstrumentRef, SizeViolation, SizeWarning, VenueRef};
pub use rfq::{
    accept_quote, cancel_rfq, create_rfq, mark_traded, record_quote, reject_acceptance,
    scan_expired, send_rfq, Rfq, RfqEvent, RfqStatus, DEFAULT_MAX_EXPIRY, PRODUCER,
};
