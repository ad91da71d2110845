//! Dashboard overview handler.

use chrono::Utc;

use opsdeck_core::CallBoard;
use opsdeck_core::format::{format_bytes, format_duration};
use opsdeck_core::summary::{Overview, overview};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Tone};
use crate::state::Session;

fn detail(o: &Overview, color: bool) -> String {
    let count = |n: usize, tone: Tone| {
        if n == 0 {
            output::paint(&n.to_string(), Tone::Muted, color)
        } else {
            output::paint(&n.to_string(), tone, color)
        }
    };

    let mut lines = vec![
        "IVR".to_owned(),
        format!("  Menus:        {}", o.menus),
        format!(
            "  Calls:        {} ({} active, {} on hold, {} ringing)",
            o.calls.total,
            count(o.calls.active, Tone::Good),
            o.calls.on_hold,
            o.calls.ringing
        ),
        format!("  Avg length:   {}", format_duration(o.calls.avg_duration_secs)),
        String::new(),
        "Network".to_owned(),
        format!(
            "  Routers:      {} ({} online, {} warning, {} offline)",
            o.devices.total,
            count(o.devices.online, Tone::Good),
            count(o.devices.warning, Tone::Warn),
            count(o.devices.offline, Tone::Bad)
        ),
        format!(
            "  Alerts:       {} active ({} critical, {} warning, {} info)",
            o.alerts.active(),
            count(o.alerts.critical, Tone::Bad),
            count(o.alerts.warning, Tone::Warn),
            o.alerts.info
        ),
        format!(
            "  VPN:          {}/{} sessions connected on {} server(s)",
            o.vpn.sessions_connected, o.vpn.sessions, o.vpn.servers_enabled
        ),
        format!(
            "  Traffic:      {} in, {} out ({:.1}/{:.1} Mbps)",
            format_bytes(o.traffic.rx_bytes),
            format_bytes(o.traffic.tx_bytes),
            o.traffic.rx_rate_mbps,
            o.traffic.tx_rate_mbps
        ),
        format!("  VLANs:        {} active", o.vlans_active),
        format!("  Backups:      {}", o.backups),
        format!("  Users:        {}", o.users),
    ];

    if !o.alerts.recent.is_empty() {
        lines.push(String::new());
        lines.push("Recent alerts".to_owned());
        for alert in &o.alerts.recent {
            let tone = match alert.severity {
                opsdeck_core::AlertSeverity::Critical => Tone::Bad,
                opsdeck_core::AlertSeverity::Warning => Tone::Warn,
                opsdeck_core::AlertSeverity::Info => Tone::Muted,
            };
            lines.push(format!(
                "  {} {} ({})",
                output::paint(&format!("[{}]", alert.severity), tone, color),
                alert.title,
                alert.device
            ));
        }
    }

    lines.join("\n")
}

pub fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    CallBoard::new(session.store().calls()).refresh_durations(Utc::now());
    let summary = overview(session.store());
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &summary,
        |o| detail(o, color),
        |o| o.alerts.active().to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
