// ── Network portal editors ──
//
// Form submission and status flips for alerts, VLANs, users, routers and
// backups. Status changes are plain assignments without transition guards.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;

use crate::error::CoreError;
use crate::model::{
    Alert, AlertStatus, Backup, BackupKind, BackupStatus, Device, DeviceRegistration,
    DeviceStatus, EntityId, User, UserDraft, UserStatus, Vlan, VlanDraft, VlanStatus,
};
use crate::store::Repository;

/// Size recorded for a freshly requested manual backup.
const MANUAL_BACKUP_SIZE: u64 = 2_621_440;

// ── Alerts ──────────────────────────────────────────────────────────

pub fn acknowledge_alert(
    alerts: &impl Repository<Alert>,
    id: &EntityId,
) -> Result<Arc<Alert>, CoreError> {
    set_alert_status(alerts, id, AlertStatus::Acknowledged)
}

pub fn resolve_alert(
    alerts: &impl Repository<Alert>,
    id: &EntityId,
) -> Result<Arc<Alert>, CoreError> {
    set_alert_status(alerts, id, AlertStatus::Resolved)
}

fn set_alert_status(
    alerts: &impl Repository<Alert>,
    id: &EntityId,
    status: AlertStatus,
) -> Result<Arc<Alert>, CoreError> {
    let alert = alerts.modify(id, &mut |alert| {
        alert.status = status;
        true
    })?;
    tracing::info!(%id, %status, "alert status changed");
    Ok(alert)
}

// ── VLANs ───────────────────────────────────────────────────────────

/// Create an active VLAN with no member ports.
///
/// Requires a tag in `1..=4094` and a non-empty name. Tags must be unique.
pub fn create_vlan(
    vlans: &impl Repository<Vlan>,
    draft: VlanDraft,
) -> Result<Arc<Vlan>, CoreError> {
    let tag = draft
        .vlan_id
        .ok_or_else(|| CoreError::validation("vlan_id", "a VLAN id is required"))?;
    if !(1..=4094).contains(&tag) {
        return Err(CoreError::validation(
            "vlan_id",
            format!("{tag} is outside 1..=4094"),
        ));
    }
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(CoreError::validation("name", "a VLAN name is required"));
    }
    if vlans.list().iter().any(|v| v.vlan_id == tag) {
        return Err(CoreError::validation(
            "vlan_id",
            format!("VLAN {tag} already exists"),
        ));
    }

    let interface = match draft.interface.trim() {
        "" => "bridge".to_owned(),
        other => other.to_owned(),
    };
    vlans.create(Vlan {
        id: EntityId::generate(),
        vlan_id: tag,
        name: name.to_owned(),
        interface,
        status: VlanStatus::Active,
        ports: Vec::new(),
        description: draft.description,
    })
}

// ── Users ───────────────────────────────────────────────────────────

/// Create an active user who has never logged in.
///
/// Username, e-mail and password are all required. The password is only
/// checked for presence; it is not stored on the record.
pub fn create_user(
    users: &impl Repository<User>,
    draft: UserDraft,
    now: DateTime<Utc>,
) -> Result<Arc<User>, CoreError> {
    let username = draft.username.trim();
    if username.is_empty() {
        return Err(CoreError::validation("username", "a username is required"));
    }
    let email = draft.email.trim();
    if email.is_empty() {
        return Err(CoreError::validation("email", "an e-mail address is required"));
    }
    let has_password = draft
        .password
        .as_ref()
        .is_some_and(|p| !p.expose_secret().is_empty());
    if !has_password {
        return Err(CoreError::validation("password", "a password is required"));
    }
    if users.list().iter().any(|u| u.username == username) {
        return Err(CoreError::validation(
            "username",
            format!("user '{username}' already exists"),
        ));
    }

    users.create(User {
        id: EntityId::generate(),
        username: username.to_owned(),
        email: email.to_owned(),
        role: draft.role,
        status: UserStatus::Active,
        last_login: None,
        created_at: now,
    })
}

// ── Routers ─────────────────────────────────────────────────────────

/// Add a router to the inventory. It stays offline until it is seen.
pub fn register_device(
    devices: &impl Repository<Device>,
    form: &DeviceRegistration,
) -> Result<Arc<Device>, CoreError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(CoreError::validation("name", "a device name is required"));
    }
    let ip = form
        .ip
        .ok_or_else(|| CoreError::validation("ip", "an IP address is required"))?;

    let model = form.model.trim();
    devices.create(Device {
        id: EntityId::generate(),
        name: name.to_owned(),
        ip,
        api_port: form.api_port,
        model: if model.is_empty() { "unknown".into() } else { model.to_owned() },
        version: None,
        location: form.location.clone().filter(|l| !l.trim().is_empty()),
        status: DeviceStatus::Offline,
        last_seen: None,
        uptime_secs: None,
        cpu_pct: None,
        memory_pct: None,
    })
}

// ── Backups ─────────────────────────────────────────────────────────

/// Record a manual backup of the focused router.
///
/// Fails with [`CoreError::NoDeviceSelected`] when no router is in focus.
/// Without a name, the backup is called `backup_<unix millis>`.
pub fn create_backup(
    backups: &impl Repository<Backup>,
    device: Option<&Device>,
    name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Arc<Backup>, CoreError> {
    let device = device.ok_or(CoreError::NoDeviceSelected)?;
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| default_backup_name(now), str::to_owned);

    tracing::info!(device = %device.name, %name, "creating backup");
    backups.create(Backup {
        id: EntityId::generate(),
        name,
        device: device.name.clone(),
        created_at: now,
        size_bytes: MANUAL_BACKUP_SIZE,
        kind: BackupKind::Manual,
        status: BackupStatus::Success,
    })
}

pub fn default_backup_name(now: DateTime<Utc>) -> String {
    format!("backup_{}", now.timestamp_millis())
}
