//! Alert triage handlers.

use std::sync::Arc;

use tabled::Tabled;

use opsdeck_core::editor::{acknowledge_alert, resolve_alert};
use opsdeck_core::summary::{AlertSummary, alert_summary};
use opsdeck_core::{Alert, AlertSeverity, AlertStatus, EntityId, Repository};

use crate::cli::{AlertSeverityArg, AlertStatusArg, AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tone};
use crate::state::Session;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&Arc<Alert>> for AlertRow {
    fn from(a: &Arc<Alert>) -> Self {
        Self {
            id: a.id.to_string(),
            severity: a.severity.to_string(),
            title: a.title.clone(),
            device: a.device.clone(),
            category: a.category.to_string(),
            status: a.status.to_string(),
            time: a.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub(crate) fn severity_from(arg: AlertSeverityArg) -> AlertSeverity {
    match arg {
        AlertSeverityArg::Critical => AlertSeverity::Critical,
        AlertSeverityArg::Warning => AlertSeverity::Warning,
        AlertSeverityArg::Info => AlertSeverity::Info,
    }
}

fn status_from(arg: AlertStatusArg) -> AlertStatus {
    match arg {
        AlertStatusArg::Active => AlertStatus::Active,
        AlertStatusArg::Acknowledged => AlertStatus::Acknowledged,
        AlertStatusArg::Resolved => AlertStatus::Resolved,
    }
}

fn summary_detail(s: &AlertSummary, color: bool) -> String {
    let mut lines = vec![
        format!("Active:       {}", s.active()),
        format!("  Critical:   {}", output::paint(&s.critical.to_string(), Tone::Bad, color)),
        format!("  Warning:    {}", output::paint(&s.warning.to_string(), Tone::Warn, color)),
        format!("  Info:       {}", s.info),
        format!("Acknowledged: {}", s.acknowledged),
        format!("Resolved:     {}", output::paint(&s.resolved.to_string(), Tone::Muted, color)),
    ];
    if !s.recent.is_empty() {
        lines.push("Recent".into());
        lines.extend(
            s.recent
                .iter()
                .map(|a| format!("  {} [{}] {} ({})", a.id, a.severity, a.title, a.device)),
        );
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(session: &Session, args: AlertsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let alerts = session.store().alerts();

    match args.command {
        AlertsCommand::List { status, severity } => {
            let status = status.map(status_from);
            let severity = severity.map(severity_from);
            let filtered: Vec<Arc<Alert>> = alerts
                .list()
                .iter()
                .filter(|a| status.is_none_or(|s| a.status == s))
                .filter(|a| severity.is_none_or(|s| a.severity == s))
                .cloned()
                .collect();
            let out = output::render_list(&global.output, &filtered, |x| AlertRow::from(x), |a| {
                a.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Summary { recent } => {
            let summary = alert_summary(&alerts.list(), recent);
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &summary,
                |s| summary_detail(s, color),
                |s| s.active().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Acknowledge { alert } => {
            let updated = acknowledge_alert(alerts, &EntityId::from(alert.as_str()))?;
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Alert '{}' acknowledged", updated.title);
            }
            Ok(())
        }

        AlertsCommand::Resolve { alert } => {
            let updated = resolve_alert(alerts, &EntityId::from(alert.as_str()))?;
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Alert '{}' resolved", updated.title);
            }
            Ok(())
        }
    }
}
