// ── Workspace snapshot ──
//
// The whole store as one serde document. The CLI persists this to the
// `--state` file between invocations.

use serde::{Deserialize, Serialize};

use crate::model::{
    ActiveCall, Alert, Backup, CallFlowMenu, Device, EntityId, InterfaceStats, User, Vlan,
    VpnConnection, VpnServer,
};

/// Every collection plus the editor selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub menus: Vec<CallFlowMenu>,
    pub selected_menu: Option<EntityId>,
    pub calls: Vec<ActiveCall>,
    pub devices: Vec<Device>,
    pub selected_device: Option<EntityId>,
    pub interfaces: Vec<InterfaceStats>,
    pub vlans: Vec<Vlan>,
    pub vpn_servers: Vec<VpnServer>,
    pub vpn_sessions: Vec<VpnConnection>,
    pub alerts: Vec<Alert>,
    pub backups: Vec<Backup>,
    pub users: Vec<User>,
}

impl Workspace {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_sections_default_to_empty() {
        let ws = Workspace::from_json(r#"{"selected_menu": "1"}"#).unwrap();
        assert!(ws.menus.is_empty());
        assert_eq!(ws.selected_menu, Some(EntityId::from("1")));
    }

    #[test]
    fn seed_survives_json() {
        let ws = crate::store::seed::workspace();
        let back = Workspace::from_json(&ws.to_json().unwrap()).unwrap();
        assert_eq!(back, ws);
    }
}
