use serde_json::Value;
use sqlx::{Postgres, Transaction};

use orion_core::event::EventEnvelope;

use crate::error::HandlerFailure;

/// A consumer group's business action: project onto a read model, issue a downstream command,
/// advance a saga. Runs inside the same transaction as the dedup claim (spec.md §4.3 step 4),
/// so the projection write and the dedup marker commit or roll back together.
#[async_trait::async_trait]
pub trait ConsumerHandler: Send + Sync {
    async fn handle(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        envelope: &EventEnvelope<Value>,
    ) -> Result<(), HandlerFailure>;
}
