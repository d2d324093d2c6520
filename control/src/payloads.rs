use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimitBreached {
    pub tenant_id: String,
    pub user_id: Option<String>,
    pub reason: String,
    pub command_kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillSwitchEnabled {
    pub tenant_id: Option<String>,
    pub actor: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillSwitchDisabled {
    pub tenant_id: Option<String>,
    pub actor: String,
    pub reason: String,
}
