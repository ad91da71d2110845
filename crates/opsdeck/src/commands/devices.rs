//! Router inventory command handlers.

use std::net::IpAddr;
use std::sync::Arc;

use tabled::Tabled;

use opsdeck_core::editor::register_device;
use opsdeck_core::format::format_uptime;
use opsdeck_core::probe::test_device_connection;
use opsdeck_core::{Device, DeviceRegistration, DeviceStatus, Repository};

use crate::cli::{DeviceForm, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Tone};
use crate::state::Session;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "")]
    focus: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "CPU")]
    cpu: String,
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.0}%"))
}

fn status_tone(status: DeviceStatus) -> Tone {
    match status {
        DeviceStatus::Online => Tone::Good,
        DeviceStatus::Warning => Tone::Warn,
        DeviceStatus::Offline => Tone::Bad,
    }
}

fn detail(d: &Arc<Device>, color: bool) -> String {
    [
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.name),
        format!("Address:   {}:{}", d.ip, d.api_port),
        format!("Model:     {}", d.model),
        format!("RouterOS:  {}", util::or_dash(d.version.as_deref())),
        format!("Location:  {}", util::or_dash(d.location.as_deref())),
        format!(
            "Status:    {}",
            output::paint(&d.status.to_string(), status_tone(d.status), color)
        ),
        format!(
            "Last seen: {}",
            d.last_seen
                .map_or_else(|| "never".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        ),
        format!("Uptime:    {}", d.uptime_secs.map_or_else(|| "-".into(), format_uptime)),
        format!("CPU:       {}", pct(d.cpu_pct)),
        format!("Memory:    {}", pct(d.memory_pct)),
    ]
    .join("\n")
}

// ── Form ────────────────────────────────────────────────────────────

fn registration(form: DeviceForm, prompt_password: bool) -> Result<DeviceRegistration, CliError> {
    let ip = match form.ip.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<IpAddr>().map_err(|_| CliError::Validation {
            field: "ip".into(),
            reason: format!("'{raw}' is not an IP address"),
        })?),
        None => None,
    };
    let password = if prompt_password {
        util::secret_or_prompt(form.password, "RouterOS password: ")?
    } else {
        form.password.map(secrecy::SecretString::from)
    };
    Ok(DeviceRegistration {
        name: form.name,
        ip,
        username: form.username,
        password,
        api_port: form.api_port,
        model: form.model,
        location: form.location,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = session.store();

    match args.command {
        DevicesCommand::List => {
            let focused = store.selected_device();
            let devices = store.devices().list();
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow {
                    focus: if focused.as_ref() == Some(&d.id) { "*" } else { "" },
                    id: d.id.to_string(),
                    name: d.name.clone(),
                    ip: d.ip.to_string(),
                    model: d.model.clone(),
                    status: d.status.to_string(),
                    uptime: d.uptime_secs.map_or_else(|| "-".into(), format_uptime),
                    cpu: pct(d.cpu_pct),
                },
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let d = util::find_entity(store.devices(), &device, |d| d.name.as_str())?;
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &d,
                |d| detail(d, color),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Register { form, test } => {
            let form = registration(form, test)?;
            if test {
                let cancel = util::cancel_on_ctrl_c();
                let ok =
                    test_device_connection(&form, config::probe_timeout(global), &cancel).await?;
                util::report_reachable(&ok, global.quiet);
            }
            let device = register_device(store.devices(), &form)?;
            session.persist(global.quiet)?;
            output::print_output(&device.id.to_string(), global.quiet);
            if !global.quiet {
                eprintln!("✓ Router '{}' registered", device.name);
            }
            Ok(())
        }

        DevicesCommand::Test(form) => {
            let form = registration(form, true)?;
            let cancel = util::cancel_on_ctrl_c();
            let ok = test_device_connection(&form, config::probe_timeout(global), &cancel).await?;
            util::report_reachable(&ok, global.quiet);
            Ok(())
        }

        DevicesCommand::Select { device } => {
            let d = util::find_entity(store.devices(), &device, |d| d.name.as_str())?;
            store.set_selected_device(Some(d.id.clone()));
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Focused router '{}'", d.name);
            }
            Ok(())
        }
    }
}
