// ── Editors ──
//
// Mutating operations for both portals. All of them go through the
// `Repository` trait and replace whole records.

mod menu;
mod network;

pub use menu::MenuEditor;
pub use network::{
    acknowledge_alert, create_backup, create_user, create_vlan, default_backup_name,
    register_device, resolve_alert,
};
