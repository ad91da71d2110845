// ── Router inventory domain types ──

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use strum::{Display, EnumString};

use super::entity_id::EntityId;

/// Default RouterOS API port.
pub const ROUTEROS_API_PORT: u16 = 8728;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
}

/// A managed router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: EntityId,
    pub name: String,
    pub ip: IpAddr,
    pub api_port: u16,
    pub model: String,
    pub version: Option<String>,
    pub location: Option<String>,
    pub status: DeviceStatus,
    pub last_seen: Option<DateTime<Utc>>,
    pub uptime_secs: Option<u64>,
    pub cpu_pct: Option<f64>,
    pub memory_pct: Option<f64>,
}

/// Form data for registering a new router.
///
/// The password is only used to test the connection; it is never stored
/// on the resulting [`Device`].
#[derive(Debug, Clone)]
pub struct DeviceRegistration {
    pub name: String,
    pub ip: Option<IpAddr>,
    pub username: String,
    pub password: Option<SecretString>,
    pub api_port: u16,
    pub model: String,
    pub location: Option<String>,
}

impl Default for DeviceRegistration {
    fn default() -> Self {
        Self {
            name: String::new(),
            ip: None,
            username: String::new(),
            password: None,
            api_port: ROUTEROS_API_PORT,
            model: String::new(),
            location: None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkState {
    Up,
    Down,
}

/// Traffic counters for one router interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStats {
    pub id: EntityId,
    pub name: String,
    pub kind: String,
    pub state: LinkState,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Current receive rate in Mbps.
    pub rx_rate_mbps: f64,
    pub tx_rate_mbps: f64,
    pub rx_packets: u64,
    pub tx_packets: u64,
}
