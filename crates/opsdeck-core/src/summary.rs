// ── Read-only dashboard projections ──
//
// Every summary is recomputed from the snapshot it is given; nothing here
// caches or mutates.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{
    ActiveCall, Alert, AlertSeverity, AlertStatus, CallStatus, Device, DeviceStatus,
    InterfaceStats, LinkState, VpnConnection, VpnServer, VpnSessionStatus,
};
use crate::store::{DataStore, Repository};

/// How many active alerts the compact panel shows.
pub const COMPACT_ALERT_COUNT: usize = 3;

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    /// Active alerts by severity.
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub acknowledged: usize,
    pub resolved: usize,
    /// The first active alerts, in store order.
    pub recent: Vec<Arc<Alert>>,
}

impl AlertSummary {
    pub fn active(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

pub fn alert_summary(alerts: &[Arc<Alert>], compact: usize) -> AlertSummary {
    let mut summary = AlertSummary::default();
    for alert in alerts {
        match alert.status {
            AlertStatus::Active => {
                match alert.severity {
                    AlertSeverity::Critical => summary.critical += 1,
                    AlertSeverity::Warning => summary.warning += 1,
                    AlertSeverity::Info => summary.info += 1,
                }
                if summary.recent.len() < compact {
                    summary.recent.push(Arc::clone(alert));
                }
            }
            AlertStatus::Acknowledged => summary.acknowledged += 1,
            AlertStatus::Resolved => summary.resolved += 1,
        }
    }
    summary
}

// ── Calls ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallSummary {
    pub total: usize,
    pub active: usize,
    pub on_hold: usize,
    pub ringing: usize,
    pub transferred: usize,
    /// Mean of `duration_secs`, 0 with no calls.
    pub avg_duration_secs: u64,
}

pub fn call_summary(calls: &[Arc<ActiveCall>]) -> CallSummary {
    let mut summary = CallSummary {
        total: calls.len(),
        ..CallSummary::default()
    };
    let mut total_secs = 0u64;
    for call in calls {
        total_secs += call.duration_secs;
        match call.status {
            CallStatus::Active => summary.active += 1,
            CallStatus::OnHold => summary.on_hold += 1,
            CallStatus::Ringing => summary.ringing += 1,
            CallStatus::Transferred => summary.transferred += 1,
        }
    }
    if let Ok(n) = u64::try_from(calls.len()) {
        summary.avg_duration_secs = total_secs.checked_div(n).unwrap_or(0);
    }
    summary
}

// ── Devices ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub warning: usize,
}

pub fn device_summary(devices: &[Arc<Device>]) -> DeviceSummary {
    devices.iter().fold(
        DeviceSummary {
            total: devices.len(),
            ..DeviceSummary::default()
        },
        |mut acc, d| {
            match d.status {
                DeviceStatus::Online => acc.online += 1,
                DeviceStatus::Offline => acc.offline += 1,
                DeviceStatus::Warning => acc.warning += 1,
            }
            acc
        },
    )
}

// ── VPN ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerUtilisation {
    pub name: String,
    pub active: u32,
    pub max: u32,
    /// `active / max` as a percentage; 0 when `max` is 0.
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VpnSummary {
    pub servers: usize,
    pub servers_enabled: usize,
    pub sessions: usize,
    pub sessions_connected: usize,
    /// Traffic over connected sessions.
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub utilisation: Vec<ServerUtilisation>,
}

pub fn vpn_summary(servers: &[Arc<VpnServer>], sessions: &[Arc<VpnConnection>]) -> VpnSummary {
    let connected: Vec<&Arc<VpnConnection>> = sessions
        .iter()
        .filter(|s| s.status == VpnSessionStatus::Connected)
        .collect();

    VpnSummary {
        servers: servers.len(),
        servers_enabled: servers.iter().filter(|s| s.enabled).count(),
        sessions: sessions.len(),
        sessions_connected: connected.len(),
        rx_bytes: connected.iter().map(|s| s.rx_bytes).sum(),
        tx_bytes: connected.iter().map(|s| s.tx_bytes).sum(),
        utilisation: servers.iter().map(|s| utilisation(s)).collect(),
    }
}

fn utilisation(server: &VpnServer) -> ServerUtilisation {
    let percent = if server.max_connections == 0 {
        0.0
    } else {
        f64::from(server.active_connections) * 100.0 / f64::from(server.max_connections)
    };
    ServerUtilisation {
        name: server.name.clone(),
        active: server.active_connections,
        max: server.max_connections,
        percent,
    }
}

// ── Interfaces ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub interfaces: usize,
    pub up: usize,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_rate_mbps: f64,
    pub tx_rate_mbps: f64,
}

pub fn traffic_summary(interfaces: &[Arc<InterfaceStats>]) -> TrafficSummary {
    interfaces.iter().fold(
        TrafficSummary {
            interfaces: interfaces.len(),
            ..TrafficSummary::default()
        },
        |mut acc, i| {
            if i.state == LinkState::Up {
                acc.up += 1;
            }
            acc.rx_bytes += i.rx_bytes;
            acc.tx_bytes += i.tx_bytes;
            acc.rx_rate_mbps += i.rx_rate_mbps;
            acc.tx_rate_mbps += i.tx_rate_mbps;
            acc
        },
    )
}

// ── Overview ────────────────────────────────────────────────────────

/// Landing-page numbers for both portals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub menus: usize,
    pub calls: CallSummary,
    pub devices: DeviceSummary,
    pub alerts: AlertSummary,
    pub vpn: VpnSummary,
    pub traffic: TrafficSummary,
    pub vlans_active: usize,
    pub backups: usize,
    pub users: usize,
}

pub fn overview(store: &DataStore) -> Overview {
    Overview {
        menus: store.menus().len(),
        calls: call_summary(&store.calls().list()),
        devices: device_summary(&store.devices().list()),
        alerts: alert_summary(&store.alerts().list(), COMPACT_ALERT_COUNT),
        vpn: vpn_summary(&store.vpn_servers().list(), &store.vpn_sessions().list()),
        traffic: traffic_summary(&store.interfaces().list()),
        vlans_active: store
            .vlans()
            .list()
            .iter()
            .filter(|v| v.status == crate::model::VlanStatus::Active)
            .count(),
        backups: store.backups().len(),
        users: store.users().len(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EntityId;
    use crate::store::seed;

    fn store() -> DataStore {
        DataStore::from_workspace(seed::workspace())
    }

    #[test]
    fn alert_counts_only_active_by_severity() {
        let store = store();
        let summary = alert_summary(&store.alerts().list(), COMPACT_ALERT_COUNT);
        assert_eq!((summary.critical, summary.warning, summary.info), (1, 1, 1));
        assert_eq!(summary.acknowledged, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.active(), 3);
        let ids: Vec<String> = summary.recent.iter().map(|a| a.id.to_string()).collect();
        assert_eq!(ids, ["1", "3", "4"]);
    }

    #[test]
    fn compact_view_is_capped() {
        let store = store();
        let summary = alert_summary(&store.alerts().list(), 1);
        assert_eq!(summary.recent.len(), 1);
        assert_eq!(summary.active(), 3);
    }

    #[test]
    fn resolving_moves_counts() {
        let store = store();
        crate::editor::resolve_alert(store.alerts(), &EntityId::from("1")).unwrap();
        let summary = alert_summary(&store.alerts().list(), COMPACT_ALERT_COUNT);
        assert_eq!(summary.critical, 0);
        assert_eq!(summary.resolved, 2);
    }

    #[test]
    fn call_counts_by_status() {
        let summary = call_summary(&store().calls().list());
        assert_eq!(summary.total, 3);
        assert_eq!((summary.active, summary.on_hold, summary.ringing), (1, 1, 1));
        assert_eq!(summary.avg_duration_secs, 80);
        assert_eq!(call_summary(&[]).avg_duration_secs, 0);
    }

    #[test]
    fn device_counts_by_status() {
        let summary = device_summary(&store().devices().list());
        assert_eq!(summary, DeviceSummary {
            total: 3,
            online: 2,
            offline: 0,
            warning: 1,
        });
    }

    #[test]
    fn vpn_utilisation() {
        let store = store();
        let summary = vpn_summary(&store.vpn_servers().list(), &store.vpn_sessions().list());
        assert_eq!(summary.servers_enabled, 2);
        assert_eq!(summary.sessions_connected, 2);
        assert_eq!(summary.rx_bytes, 115 * 1024 * 1024);
        assert!((summary.utilisation[0].percent - 30.0).abs() < f64::EPSILON);
        assert!((summary.utilisation[2].percent).abs() < f64::EPSILON);
    }

    #[test]
    fn overview_reads_every_collection() {
        let o = overview(&store());
        assert_eq!(o.menus, 1);
        assert_eq!(o.vlans_active, 3);
        assert_eq!(o.traffic.up, 3);
        assert_eq!(o.backups, 3);
        assert_eq!(o.users, 3);
    }
}
