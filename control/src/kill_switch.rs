//! Kill switch (C8, spec.md §4.8): per-tenant or global, toggled by `SetKillSwitch` and
//! propagated to every gate instance via a broadcast topic. `KillSwitchState` here models the
//! in-memory projection a gate consults; the broadcast/convergence mechanism itself lives in the
//! consumer that applies `KillSwitchEnabled`/`Disabled` events to this state.

use std::collections::HashSet;

use chrono::Utc;
use orion_core::{
    context::Correlation,
    event::{Entity, EventEnvelope, EventType},
};
use uuid::Uuid;

use crate::payloads::{KillSwitchDisabled, KillSwitchEnabled};

pub const PRODUCER: &str = "orion-control";

#[derive(Debug, Clone, Default)]
pub struct KillSwitchState {
    global: bool,
    tenants: HashSet<String>,
}

impl KillSwitchState {
    pub fn is_active(&self, tenant_id: &str) -> bool {
        self.global || self.tenants.contains(tenant_id)
    }

    pub fn enable(&mut self, tenant_id: Option<&str>) {
        match tenant_id {
            Some(id) => {
                self.tenants.insert(id.to_string());
            }
            None => self.global = true,
        }
    }

    pub fn disable(&mut self, tenant_id: Option<&str>) {
        match tenant_id {
            Some(id) => {
                self.tenants.remove(id);
            }
            None => self.global = false,
        }
    }
}

fn envelope<P>(correlation: &Correlation, event_type: EventType, entity_id: &str, payload: P) -> EventEnvelope<P> {
    EventEnvelope {
        event_id: Uuid::new_v4(),
        event_type,
        event_version: 1,
        occurred_at: Utc::now(),
        producer: PRODUCER.to_string(),
        tenant_id: correlation.tenant_id.clone(),
        correlation_id: correlation.correlation_id,
        causation_id: correlation.causation_id.clone(),
        entity: Entity::new("KillSwitch", entity_id, 1),
        payload,
    }
}

pub fn enable(
    state: &mut KillSwitchState,
    correlation: &Correlation,
    tenant_id: Option<String>,
    actor: String,
    reason: String,
) -> EventEnvelope<KillSwitchEnabled> {
    state.enable(tenant_id.as_deref());
    envelope(
        correlation,
        EventType::KillSwitchEnabled,
        tenant_id.as_deref().unwrap_or("global"),
        KillSwitchEnabled {
            tenant_id,
            actor,
            reason,
        },
    )
}

pub fn disable(
    state: &mut KillSwitchState,
    correlation: &Correlation,
    tenant_id: Option<String>,
    actor: String,
    reason: String,
) -> EventEnvelope<KillSwitchDisabled> {
    state.disable(tenant_id.as_deref());
    envelope(
        correlation,
        EventType::KillSwitchDisabled,
        tenant_id.as_deref().unwrap_or("global"),
        KillSwitchDisabled {
            tenant_id,
            actor,
            reason,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_kill_switch_blocks_every_tenant() {
        let mut state = KillSwitchState::default();
        let correlation = Correlation::root("tenant-1");
        enable(&mut state, &correlation, None, "ops".to_string(), "incident".to_string());
        assert!(state.is_active("tenant-1"));
        assert!(state.is_active("tenant-2"));
    }

    #[test]
    fn per_tenant_kill_switch_is_scoped() {
        let mut state = KillSwitchState::default();
        let correlation = Correlation::root("tenant-1");
        enable(
            &mut state,
            &correlation,
            Some("tenant-1".to_string()),
            "ops".to_string(),
            "incident".to_string(),
        );
        assert!(state.is_active("tenant-1"));
        assert!(!state.is_active("tenant-2"));
    }
}
