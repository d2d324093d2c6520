// Mini-Disclaimer: Educational/experimental use; not investment advice or affiliation; see README & DISCLAIMER.
//! # Logging Configuration
//!
//! Standardized logging configuration for the Orion Trading Event Core. Provides structured
//! logs with a filter to reduce noise from high-frequency internal polling spans.
//!
//! ## Features
//!
//! - **Configurable Output**: Human-readable or JSON format
//! - **Environment Filtering**: Uses `RUST_LOG` for levels
//! - **Poll Noise Filter**: Suppresses per-iteration events from the outbox relay's poll loop
//!   and the market-data coalescer's per-tick span, which would otherwise dominate logs at
//!   their respective polling/coalescing cadences.
//! - **Default INFO Level**: Adjustable as needed
//!
//! ## Usage
//!
//! ### Standard Logging (human-readable)
//! ```rust,ignore
//! use orion_core::logging::init_logging;
//!
//! fn main() {
//!     init_logging();
//!     tracing::info!("trading event core started");
//! }
//! ```
//!
//! ### JSON Logging (aggregators / observability)
//! ```rust,ignore
//! use orion_core::logging::init_json_logging;
//!
//! fn main() {
//!     init_json_logging();
//!     tracing::info!("trading event core started");
//! }
//! ```
//!
//! ### Environment Configuration
//! ```bash
//! export RUST_LOG=debug
//! export RUST_LOG=orion_rfq=info,orion_execution=debug,orion_marketdata=warn
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Span name the outbox relay (`orion-outbox`) and market-data coalescer (`orion-marketdata`)
/// use for their tight polling loops. Events emitted inside these spans are suppressed by
/// [`PollNoiseFilter`] to keep INFO-level logs readable.
pub const POLL_LOOP_SPAN_NAME: &str = "poll_loop";

/// Initializes standard (non-JSON) logging.
///
/// Filters duplicate/high-frequency logs generated by tight polling loops (outbox relay,
/// market-data coalescer).
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(PollNoiseFilter)
        .init()
}

/// Initializes JSON logging, for aggregators / observability pipelines.
pub fn init_json_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .with(PollNoiseFilter)
        .init()
}

struct PollNoiseFilter;

impl<S> tracing_subscriber::layer::Layer<S> for PollNoiseFilter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn event_enabled(
        &self,
        _: &tracing::Event<'_>,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> bool {
        if let Some(span) = ctx.lookup_current() {
            span.name() != POLL_LOOP_SPAN_NAME
        } else {
            true
        }
    }
}
