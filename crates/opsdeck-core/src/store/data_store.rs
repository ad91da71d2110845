// ── Central data store ──
//
// One repository per entity type, plus the two editor selections (menu
// being edited, router in focus). Mutations are broadcast to subscribers
// via `watch` channels.

use std::sync::Arc;

use tokio::sync::watch;

use super::repository::{InMemoryRepository, Repository};
use super::workspace::Workspace;
use crate::model::{
    ActiveCall, Alert, Backup, CallFlowMenu, Device, EntityId, InterfaceStats, User, Vlan,
    VpnConnection, VpnServer,
};

/// Central in-memory store for both portals.
pub struct DataStore {
    menus: InMemoryRepository<CallFlowMenu>,
    calls: InMemoryRepository<ActiveCall>,
    devices: InMemoryRepository<Device>,
    interfaces: InMemoryRepository<InterfaceStats>,
    vlans: InMemoryRepository<Vlan>,
    vpn_servers: InMemoryRepository<VpnServer>,
    vpn_sessions: InMemoryRepository<VpnConnection>,
    alerts: InMemoryRepository<Alert>,
    backups: InMemoryRepository<Backup>,
    users: InMemoryRepository<User>,
    selected_menu: watch::Sender<Option<EntityId>>,
    selected_device: watch::Sender<Option<EntityId>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::from_workspace(Workspace::default())
    }

    pub fn from_workspace(ws: Workspace) -> Self {
        let (selected_menu, _) = watch::channel(ws.selected_menu);
        let (selected_device, _) = watch::channel(ws.selected_device);

        Self {
            menus: InMemoryRepository::with_entities(ws.menus),
            calls: InMemoryRepository::with_entities(ws.calls),
            devices: InMemoryRepository::with_entities(ws.devices),
            interfaces: InMemoryRepository::with_entities(ws.interfaces),
            vlans: InMemoryRepository::with_entities(ws.vlans),
            vpn_servers: InMemoryRepository::with_entities(ws.vpn_servers),
            vpn_sessions: InMemoryRepository::with_entities(ws.vpn_sessions),
            alerts: InMemoryRepository::with_entities(ws.alerts),
            backups: InMemoryRepository::with_entities(ws.backups),
            users: InMemoryRepository::with_entities(ws.users),
            selected_menu,
            selected_device,
        }
    }

    /// Owned snapshot of everything, suitable for serialization.
    pub fn to_workspace(&self) -> Workspace {
        Workspace {
            menus: self.menus.to_vec(),
            selected_menu: self.selected_menu(),
            calls: self.calls.to_vec(),
            devices: self.devices.to_vec(),
            selected_device: self.selected_device(),
            interfaces: self.interfaces.to_vec(),
            vlans: self.vlans.to_vec(),
            vpn_servers: self.vpn_servers.to_vec(),
            vpn_sessions: self.vpn_sessions.to_vec(),
            alerts: self.alerts.to_vec(),
            backups: self.backups.to_vec(),
            users: self.users.to_vec(),
        }
    }

    // ── Repositories ─────────────────────────────────────────────────

    pub fn menus(&self) -> &InMemoryRepository<CallFlowMenu> {
        &self.menus
    }

    pub fn calls(&self) -> &InMemoryRepository<ActiveCall> {
        &self.calls
    }

    pub fn devices(&self) -> &InMemoryRepository<Device> {
        &self.devices
    }

    pub fn interfaces(&self) -> &InMemoryRepository<InterfaceStats> {
        &self.interfaces
    }

    pub fn vlans(&self) -> &InMemoryRepository<Vlan> {
        &self.vlans
    }

    pub fn vpn_servers(&self) -> &InMemoryRepository<VpnServer> {
        &self.vpn_servers
    }

    pub fn vpn_sessions(&self) -> &InMemoryRepository<VpnConnection> {
        &self.vpn_sessions
    }

    pub fn alerts(&self) -> &InMemoryRepository<Alert> {
        &self.alerts
    }

    pub fn backups(&self) -> &InMemoryRepository<Backup> {
        &self.backups
    }

    pub fn users(&self) -> &InMemoryRepository<User> {
        &self.users
    }

    // ── Selections ───────────────────────────────────────────────────

    pub fn selected_menu(&self) -> Option<EntityId> {
        self.selected_menu.borrow().clone()
    }

    pub fn set_selected_menu(&self, id: Option<EntityId>) {
        self.selected_menu.send_replace(id);
    }

    pub fn selected_device(&self) -> Option<EntityId> {
        self.selected_device.borrow().clone()
    }

    pub fn set_selected_device(&self, id: Option<EntityId>) {
        self.selected_device.send_replace(id);
    }

    /// The focused router, if the selection still resolves.
    pub fn focused_device(&self) -> Option<Arc<Device>> {
        self.selected_device().and_then(|id| self.devices.get(&id))
    }

    // ── Change tracking ──────────────────────────────────────────────

    /// Sum of every repository's mutation counter. Changes whenever any
    /// record anywhere is written.
    pub fn revision(&self) -> u64 {
        [
            self.menus.version(),
            self.calls.version(),
            self.devices.version(),
            self.interfaces.version(),
            self.vlans.version(),
            self.vpn_servers.version(),
            self.vpn_sessions.version(),
            self.alerts.version(),
            self.backups.version(),
            self.users.version(),
        ]
        .iter()
        .sum()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::seed;

    #[test]
    fn workspace_roundtrip_keeps_order_and_selection() {
        let ws = seed::workspace();
        let store = DataStore::from_workspace(ws.clone());
        assert_eq!(store.to_workspace(), ws);
    }

    #[test]
    fn revision_moves_on_any_write() {
        let store = DataStore::from_workspace(seed::workspace());
        let before = store.revision();
        store.alerts().delete(&EntityId::from("1")).unwrap();
        assert!(store.revision() > before);
    }

    #[test]
    fn focused_device_follows_selection() {
        let store = DataStore::from_workspace(seed::workspace());
        assert!(store.focused_device().is_none());
        store.set_selected_device(Some(EntityId::from("2")));
        assert_eq!(store.focused_device().unwrap().name, "RouterOS-Branch");
        store.set_selected_device(Some(EntityId::from("missing")));
        assert!(store.focused_device().is_none());
    }
}
