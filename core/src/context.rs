//! Correlation context propagation.
//!
//! Design Notes §9: "thread correlation and tenant context explicitly through every call frame.
//! At the gRPC/HTTP boundary, deserialize a header into a context value; pass it down." No
//! thread-local/ambient bag — `Correlation` is an ordinary value threaded through function
//! arguments.

use crate::event::{CausationId, EventEnvelope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The request-scoped identity every command and consumer handler carries explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    pub tenant_id: String,
    pub correlation_id: Uuid,
    pub causation_id: CausationId,
}

impl Correlation {
    /// A fresh root correlation context, as created at a command's entry point (eg/ the gRPC
    /// boundary deserializing a header).
    pub fn root(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            correlation_id: Uuid::new_v4(),
            causation_id: CausationId::Direct,
        }
    }

    /// Derives the context for an event caused by `self`'s current event `event_id`.
    pub fn child_of(&self, event_id: Uuid) -> Self {
        Self {
            tenant_id: self.tenant_id.clone(),
            correlation_id: self.correlation_id,
            causation_id: CausationId::Event(event_id),
        }
    }

    /// Derives the context that produced the given envelope, for continuing a causal chain.
    pub fn from_envelope<P>(envelope: &EventEnvelope<P>) -> Self {
        Self {
            tenant_id: envelope.tenant_id.clone(),
            correlation_id: envelope.correlation_id,
            causation_id: CausationId::Event(envelope.event_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_of_keeps_tenant_and_correlation_but_updates_causation() {
        let root = Correlation::root("tenant-1");
        let event_id = Uuid::new_v4();
        let child = root.child_of(event_id);
        assert_eq!(child.tenant_id, root.tenant_id);
        assert_eq!(child.correlation_id, root.correlation_id);
        assert_eq!(child.causation_id, CausationId::Event(event_id));
    }
}
