//! Abstract liquidity-provider / venue adapter (C5/C6).
//!
//! A unified interface for order execution across venues, extensible enough to add new venue
//! integrations without touching the saga that drives them. Concrete venue adapters are
//! out-of-scope collaborators (spec.md §4.7's adapter-mode note makes the same call for market
//! data).

use crate::{error::ClientError, order::Order};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueAck {
    pub venue_order_id: String,
}

/// Unified interface a venue or liquidity-provider integration implements to receive orders and
/// settlement instructions from the OMS.
#[async_trait::async_trait]
pub trait ExecutionClient: Send + Sync {
    fn venue(&self) -> &str;

    async fn submit_order(&self, order: &Order) -> Result<VenueAck, ClientError>;

    async fn cancel_order(&self, order: &Order) -> Result<(), ClientError>;

    async fn settle(&self, trade_id: &str, settlement_id: &str) -> Result<(), ClientError>;
}

/// Simulated venue for backtesting and integration tests. Deterministic: always acks and
/// settles, never rejects. Tests that want rejection behaviour compose their own stub rather
/// than configuring flakiness into this one.
#[derive(Debug, Clone)]
pub struct MockExecutionClient {
    venue: String,
}

impl MockExecutionClient {
    pub fn new(venue: impl Into<String>) -> Self {
        Self { venue: venue.into() }
    }
}

#[async_trait::async_trait]
impl ExecutionClient for MockExecutionClient {
    fn venue(&self) -> &str {
        &self.venue
    }

    async fn submit_order(&self, order: &Order) -> Result<VenueAck, ClientError> {
        Ok(VenueAck {
            venue_order_id: format!("mock-{}", order.order_id),
        })
    }

    async fn cancel_order(&self, _order: &Order) -> Result<(), ClientError> {
        Ok(())
    }

    async fn settle(&self, _trade_id: &str, _settlement_id: &str) -> Result<(), ClientError> {
        Ok(())
    }
}
