// opsdeck-core: domain model, entity store, editors and artifact generators
// shared by the opsdeck CLI.

pub mod calls;
pub mod editor;
pub mod error;
pub mod flow;
pub mod format;
pub mod model;
pub mod probe;
pub mod report;
pub mod settings;
pub mod store;
pub mod stream;
pub mod summary;

// ── Primary re-exports ──────────────────────────────────────────────
pub use calls::{CallBoard, spawn_duration_ticker};
pub use editor::MenuEditor;
pub use error::CoreError;
pub use flow::{
    CallFlowExport, ValidationPolicy, ValidationReport, export_call_flow, generate_agi_script,
    validate,
};
pub use probe::{Reachable, probe_tcp};
pub use settings::{IvrSettings, SecretDisclosure, export_manager_conf, render_agi_server};
pub use store::{DataStore, Entity, InMemoryRepository, Repository, Workspace};
pub use stream::EntityStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Telephony
    ActiveCall, CallFlowMenu, CallStatus, MenuAction, MenuOption,
    // Network
    Device, DeviceRegistration, DeviceStatus, EntityId, InterfaceStats, Vlan, VpnConnection,
    VpnServer,
    // Alerts
    Alert, AlertSeverity, AlertStatus, EmailAlertConfig,
    // Administration
    Backup, User, UserRole,
};
