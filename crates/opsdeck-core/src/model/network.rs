// ── VLAN and VPN domain types ──

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use strum::{Display, EnumString};

use super::entity_id::EntityId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VlanStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: EntityId,
    /// 802.1Q tag, 1..=4094.
    pub vlan_id: u16,
    pub name: String,
    pub interface: String,
    pub status: VlanStatus,
    pub ports: Vec<String>,
    pub description: String,
}

/// Form data for a new VLAN. `vlan_id` and `name` are required.
#[derive(Debug, Clone)]
pub struct VlanDraft {
    pub vlan_id: Option<u16>,
    pub name: String,
    pub interface: String,
    pub description: String,
}

impl Default for VlanDraft {
    fn default() -> Self {
        Self {
            vlan_id: None,
            name: String::new(),
            interface: "bridge".into(),
            description: String::new(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VpnProtocol {
    Pptp,
    L2tp,
    Ovpn,
    Ipsec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnServer {
    pub id: EntityId,
    pub name: String,
    pub protocol: VpnProtocol,
    pub enabled: bool,
    pub port: u16,
    pub active_connections: u32,
    pub max_connections: u32,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VpnSessionStatus {
    Connected,
    Disconnected,
    Connecting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnConnection {
    pub id: EntityId,
    pub name: String,
    pub protocol: VpnProtocol,
    pub status: VpnSessionStatus,
    pub user: String,
    pub remote_ip: IpAddr,
    pub local_ip: IpAddr,
    pub uptime_secs: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}
