//! VPN server and session handlers.

use std::sync::Arc;

use tabled::Tabled;

use opsdeck_core::format::{format_bytes, format_uptime};
use opsdeck_core::summary::vpn_summary;
use opsdeck_core::{Repository, VpnConnection, VpnServer};

use crate::cli::{GlobalOpts, VpnArgs, VpnCommand};
use crate::error::CliError;
use crate::output;
use crate::state::Session;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Connections")]
    connections: String,
}

impl From<&Arc<VpnServer>> for ServerRow {
    fn from(s: &Arc<VpnServer>) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            protocol: s.protocol.to_string().to_uppercase(),
            port: s.port,
            enabled: util::yes_no(s.enabled),
            connections: format!("{}/{}", s.active_connections, s.max_connections),
        }
    }
}

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Remote")]
    remote: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "RX / TX")]
    traffic: String,
}

impl From<&Arc<VpnConnection>> for SessionRow {
    fn from(c: &Arc<VpnConnection>) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            user: c.user.clone(),
            protocol: c.protocol.to_string().to_uppercase(),
            status: c.status.to_string(),
            remote: c.remote_ip.to_string(),
            uptime: format_uptime(c.uptime_secs),
            traffic: format!("{} / {}", format_bytes(c.rx_bytes), format_bytes(c.tx_bytes)),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(session: &Session, args: VpnArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = session.store();

    let out = match args.command {
        VpnCommand::Servers => output::render_list(
            &global.output,
            &store.vpn_servers().list(),
            |x| ServerRow::from(x),
            |s| s.id.to_string(),
        ),
        VpnCommand::Sessions => output::render_list(
            &global.output,
            &store.vpn_sessions().list(),
            |x| SessionRow::from(x),
            |c| c.id.to_string(),
        ),
        VpnCommand::Summary => {
            let summary = vpn_summary(&store.vpn_servers().list(), &store.vpn_sessions().list());
            output::render_single(
                &global.output,
                &summary,
                |s| {
                    let mut lines = vec![
                        format!("Servers:   {} ({} enabled)", s.servers, s.servers_enabled),
                        format!("Sessions:  {} ({} connected)", s.sessions, s.sessions_connected),
                        format!(
                            "Traffic:   {} in, {} out",
                            format_bytes(s.rx_bytes),
                            format_bytes(s.tx_bytes)
                        ),
                        "Utilisation".to_owned(),
                    ];
                    lines.extend(s.utilisation.iter().map(|u| {
                        format!("  {:<16} {:>3}/{:<3} {:>5.1}%", u.name, u.active, u.max, u.percent)
                    }));
                    lines.join("\n")
                },
                |s| s.sessions_connected.to_string(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
