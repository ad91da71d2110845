// ── Domain model ──
//
// Canonical record types for both portals. Everything the CLI renders or
// the generators read is defined here.

pub mod entity_id;

pub mod admin;
pub mod alert;
pub mod call;
pub mod device;
pub mod email;
pub mod menu;
pub mod network;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use opsdeck_core::model::*` gives you everything.

pub use entity_id::EntityId;

// Telephony
pub use call::{ActiveCall, CallStatus};
pub use menu::{CallFlowMenu, MenuAction, MenuOption};

// Network
pub use device::{
    Device, DeviceRegistration, DeviceStatus, InterfaceStats, LinkState, ROUTEROS_API_PORT,
};
pub use network::{
    Vlan, VlanDraft, VlanStatus, VpnConnection, VpnProtocol, VpnServer, VpnSessionStatus,
};

// Alerts
pub use alert::{Alert, AlertCategory, AlertSeverity, AlertStatus};
pub use email::{AlertContext, EmailAlertConfig, RenderedEmail, TEMPLATE_VARIABLES};

// Administration
pub use admin::{Backup, BackupKind, BackupStatus, User, UserDraft, UserRole, UserStatus};
