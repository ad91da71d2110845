// ── Demo seed data ──
//
// The sample records both dashboards start with. Used when no state file
// exists yet, and as fixtures throughout the test suite.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::workspace::Workspace;
use crate::model::{
    ActiveCall, Alert, AlertCategory, AlertSeverity, AlertStatus, Backup, BackupKind,
    BackupStatus, CallFlowMenu, CallStatus, Device, DeviceStatus, EntityId, InterfaceStats,
    LinkState, MenuAction, MenuOption, ROUTEROS_API_PORT, User, UserRole, UserStatus, Vlan,
    VlanStatus, VpnConnection, VpnProtocol, VpnServer, VpnSessionStatus,
};

const MIB: u64 = 1024 * 1024;

/// Seed workspace relative to the current time.
pub fn workspace() -> Workspace {
    workspace_at(Utc::now())
}

/// Seed workspace with call start times and "last seen" values anchored at `now`.
pub fn workspace_at(now: DateTime<Utc>) -> Workspace {
    Workspace {
        menus: menus(),
        selected_menu: Some(EntityId::from("1")),
        calls: calls(now),
        devices: devices(now),
        selected_device: None,
        interfaces: interfaces(),
        vlans: vlans(),
        vpn_servers: vpn_servers(),
        vpn_sessions: vpn_sessions(),
        alerts: alerts(),
        backups: backups(),
        users: users(),
    }
}

/// The single "Main Menu" the call-flow builder opens with.
pub fn menus() -> Vec<CallFlowMenu> {
    vec![CallFlowMenu {
        id: EntityId::from("1"),
        name: "Main Menu".into(),
        greeting:
            "Welcome to our company. Press 1 for sales, 2 for support, or 0 for operator.".into(),
        timeout: 10,
        max_retries: 3,
        options: vec![
            option("1", "1", "Sales", MenuAction::Extension, "1001"),
            option("2", "2", "Support", MenuAction::Queue, "support"),
            option("3", "0", "Operator", MenuAction::Extension, "1000"),
        ],
    }]
}

fn option(id: &str, key: &str, label: &str, action: MenuAction, target: &str) -> MenuOption {
    MenuOption {
        id: EntityId::from(id),
        key: key.into(),
        label: label.into(),
        action,
        target: Some(target.into()),
    }
}

#[rustfmt::skip]
fn calls(now: DateTime<Utc>) -> Vec<ActiveCall> {
    let call = |id: &str, number: &str, name: Option<&str>, ago: u64, menu: &str, status, ch: &str| {
        ActiveCall {
            id: EntityId::from(id),
            caller_number: number.into(),
            caller_name: name.map(Into::into),
            started_at: now - secs(ago),
            current_menu: menu.into(),
            status,
            channel: ch.into(),
            duration_secs: ago,
        }
    };

    vec![
        call("1", "555-0123", Some("John Smith"), 180, "Main Menu", CallStatus::Active, "SIP/1001-0000001"),
        call("2", "555-0456", Some("Sarah Johnson"), 45, "Support Menu", CallStatus::OnHold, "SIP/1002-0000002"),
        call("3", "555-0789", None, 15, "Main Menu", CallStatus::Ringing, "SIP/1003-0000003"),
    ]
}

#[rustfmt::skip]
fn devices(now: DateTime<Utc>) -> Vec<Device> {
    let device = |id: &str,
                  name: &str,
                  ip: [u8; 4],
                  model: &str,
                  version: &str,
                  status,
                  seen_ago: u64,
                  uptime: u64,
                  cpu: f64,
                  mem: f64| Device {
        id: EntityId::from(id),
        name: name.into(),
        ip: ip.into(),
        api_port: ROUTEROS_API_PORT,
        model: model.into(),
        version: Some(version.into()),
        location: None,
        status,
        last_seen: Some(now - secs(seen_ago)),
        uptime_secs: Some(uptime),
        cpu_pct: Some(cpu),
        memory_pct: Some(mem),
    };

    vec![
        device("1", "RouterOS-Main", [192, 168, 1, 1], "hEX S", "7.11.2", DeviceStatus::Online, 120, dhm(15, 3, 22), 15.0, 45.0),
        device("2", "RouterOS-Branch", [192, 168, 2, 1], "RB750Gr3", "7.10.1", DeviceStatus::Online, 300, dhm(8, 12, 45), 8.0, 32.0),
        device("3", "RouterOS-Backup", [192, 168, 3, 1], "CCR1009", "7.11.2", DeviceStatus::Warning, 3600, dhm(2, 8, 15), 65.0, 78.0),
    ]
}

#[rustfmt::skip]
fn interfaces() -> Vec<InterfaceStats> {
    let iface = |id: &str, name: &str, kind: &str, rx: u64, tx: u64, rx_rate, tx_rate, rx_pk, tx_pk| {
        InterfaceStats {
            id: EntityId::from(id),
            name: name.into(),
            kind: kind.into(),
            state: LinkState::Up,
            rx_bytes: rx,
            tx_bytes: tx,
            rx_rate_mbps: rx_rate,
            tx_rate_mbps: tx_rate,
            rx_packets: rx_pk,
            tx_packets: tx_pk,
        }
    };

    vec![
        iface("1", "ether1-gateway", "ethernet", 1_024_567_890, 987_654_321, 15.2, 8.7, 1_254_678, 987_432),
        iface("2", "ether2-local", "ethernet", 567_890_123, 456_789_012, 5.4, 3.2, 678_543, 543_210),
        iface("3", "wlan1", "wireless", 234_567_890, 345_678_901, 2.1, 4.8, 345_678, 456_789),
    ]
}

#[rustfmt::skip]
fn vlans() -> Vec<Vlan> {
    let vlan = |id: &str, tag: u16, name: &str, status, ports: &[&str], desc: &str| Vlan {
        id: EntityId::from(id),
        vlan_id: tag,
        name: name.into(),
        interface: "bridge".into(),
        status,
        ports: ports.iter().map(|p| (*p).to_owned()).collect(),
        description: desc.into(),
    };

    vec![
        vlan("1", 10, "VLAN_ADMIN", VlanStatus::Active, &["ether2", "ether3"], "Administration network"),
        vlan("2", 20, "VLAN_USERS", VlanStatus::Active, &["ether4", "ether5", "wlan1"], "User network"),
        vlan("3", 30, "VLAN_GUEST", VlanStatus::Active, &["wlan1"], "Guest network"),
        vlan("4", 100, "VLAN_SERVERS", VlanStatus::Inactive, &["ether6"], "Server network"),
    ]
}

fn vpn_servers() -> Vec<VpnServer> {
    let server = |id: &str, name: &str, protocol, enabled, port, active, max| VpnServer {
        id: EntityId::from(id),
        name: name.into(),
        protocol,
        enabled,
        port,
        active_connections: active,
        max_connections: max,
    };

    vec![
        server("1", "PPTP Server", VpnProtocol::Pptp, true, 1723, 3, 10),
        server("2", "L2TP Server", VpnProtocol::L2tp, true, 1701, 2, 20),
        server("3", "OpenVPN Server", VpnProtocol::Ovpn, false, 1194, 0, 50),
    ]
}

#[rustfmt::skip]
fn vpn_sessions() -> Vec<VpnConnection> {
    let session = |id: &str,
                   name: &str,
                   protocol,
                   status,
                   user: &str,
                   remote: [u8; 4],
                   local: [u8; 4],
                   uptime,
                   rx,
                   tx| VpnConnection {
        id: EntityId::from(id),
        name: name.into(),
        protocol,
        status,
        user: user.into(),
        remote_ip: remote.into(),
        local_ip: local.into(),
        uptime_secs: uptime,
        rx_bytes: rx,
        tx_bytes: tx,
    };

    vec![
        session("1", "VPN-User-01", VpnProtocol::Pptp, VpnSessionStatus::Connected, "admin", [203, 0, 113, 45], [10, 0, 0, 2], dhm(0, 2, 35), 15 * MIB, 8 * MIB),
        session("2", "VPN-Branch-Office", VpnProtocol::L2tp, VpnSessionStatus::Connected, "branch_user", [198, 51, 100, 23], [10, 0, 0, 3], dhm(1, 5, 12), 100 * MIB, 50 * MIB),
        session("3", "VPN-Mobile-01", VpnProtocol::Pptp, VpnSessionStatus::Disconnected, "mobile_user", [192, 0, 2, 156], [10, 0, 0, 4], 0, 0, 0),
    ]
}

#[rustfmt::skip]
fn alerts() -> Vec<Alert> {
    let alert = |id: &str, severity, title: &str, description: &str, device: &str, ts, status, category| Alert {
        id: EntityId::from(id),
        severity,
        title: title.into(),
        description: description.into(),
        device: device.into(),
        timestamp: ts,
        status,
        category,
    };

    vec![
        alert(
            "1",
            AlertSeverity::Critical,
            "Interface ether1 down",
            "Primary interface ether1 has been disconnected for 5 minutes",
            "RouterOS-Main",
            at(2024, 1, 15, 14, 30, 25),
            AlertStatus::Active,
            AlertCategory::Connectivity,
        ),
        alert(
            "2",
            AlertSeverity::Warning,
            "High CPU usage",
            "Router CPU has been at 85% for the last 15 minutes",
            "RouterOS-Branch",
            at(2024, 1, 15, 14, 25, 10),
            AlertStatus::Acknowledged,
            AlertCategory::Performance,
        ),
        alert(
            "3",
            AlertSeverity::Warning,
            "Unstable VPN link",
            "The branch VPN connection dropped 3 times in the last hour",
            "RouterOS-Main",
            at(2024, 1, 15, 13, 45, 33),
            AlertStatus::Active,
            AlertCategory::Connectivity,
        ),
        alert(
            "4",
            AlertSeverity::Info,
            "Update available",
            "RouterOS 7.12 is available for download",
            "RouterOS-Backup",
            at(2024, 1, 15, 12, 0, 0),
            AlertStatus::Active,
            AlertCategory::Configuration,
        ),
        alert(
            "5",
            AlertSeverity::Critical,
            "Unauthorized access attempt",
            "Multiple failed logins detected from 203.0.113.45",
            "RouterOS-Main",
            at(2024, 1, 15, 11, 15, 22),
            AlertStatus::Resolved,
            AlertCategory::Security,
        ),
    ]
}

#[rustfmt::skip]
fn backups() -> Vec<Backup> {
    let backup = |id: &str, name: &str, device: &str, ts, size, kind| Backup {
        id: EntityId::from(id),
        name: name.into(),
        device: device.into(),
        created_at: ts,
        size_bytes: size,
        kind,
        status: BackupStatus::Success,
    };

    vec![
        backup("1", "backup_main_router_20241227", "Main Router", at(2024, 12, 27, 10, 30, 0), 2_411_725, BackupKind::Manual),
        backup("2", "backup_auto_20241226", "Main Router", at(2024, 12, 26, 3, 0, 0), 2_202_010, BackupKind::Automatic),
        backup("3", "backup_branch_router_20241225", "Branch Router", at(2024, 12, 25, 15, 45, 0), 1_887_437, BackupKind::Manual),
    ]
}

#[rustfmt::skip]
fn users() -> Vec<User> {
    let user = |id: &str, username: &str, email: &str, role, status, login, created| User {
        id: EntityId::from(id),
        username: username.into(),
        email: email.into(),
        role,
        status,
        last_login: Some(login),
        created_at: created,
    };

    vec![
        user("1", "admin", "admin@company.com", UserRole::Admin, UserStatus::Active, at(2024, 12, 27, 9, 30, 0), at(2024, 1, 15, 0, 0, 0)),
        user("2", "operator1", "operator1@company.com", UserRole::Operator, UserStatus::Active, at(2024, 12, 26, 16, 45, 0), at(2024, 3, 20, 0, 0, 0)),
        user("3", "viewer_support", "support@company.com", UserRole::Viewer, UserStatus::Inactive, at(2024, 12, 20, 14, 20, 0), at(2024, 6, 10, 0, 0, 0)),
    ]
}

// ── Helpers ─────────────────────────────────────────────────────────

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_default()
}

fn secs(n: u64) -> Duration {
    Duration::seconds(i64::try_from(n).unwrap_or(i64::MAX))
}

const fn dhm(days: u64, hours: u64, mins: u64) -> u64 {
    days * 86_400 + hours * 3_600 + mins * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_counts_match_dashboards() {
        let ws = workspace();
        assert_eq!(ws.menus.len(), 1);
        assert_eq!(ws.menus[0].options.len(), 3);
        assert_eq!(ws.calls.len(), 3);
        assert_eq!(ws.devices.len(), 3);
        assert_eq!(ws.vlans.len(), 4);
        assert_eq!(ws.vpn_servers.len(), 3);
        assert_eq!(ws.vpn_sessions.len(), 3);
        assert_eq!(ws.alerts.len(), 5);
        assert_eq!(ws.backups.len(), 3);
        assert_eq!(ws.users.len(), 3);
        assert_eq!(ws.interfaces.len(), 3);
    }

    #[test]
    fn call_durations_match_start_times() {
        let now = at(2025, 1, 1, 12, 0, 0);
        for call in workspace_at(now).calls {
            assert_eq!(call.elapsed_at(now), call.duration_secs);
        }
    }

    #[test]
    fn uptime_helper() {
        assert_eq!(dhm(1, 5, 12), 105_120);
    }
}
