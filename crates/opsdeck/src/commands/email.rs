//! E-mail alert notification handlers.
//!
//! Settings live in the local key/value file, not the workspace; the SMTP
//! password lives in the system keyring.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use opsdeck_config::{SMTP_PASSWORD_KEY, SettingsStore};
use opsdeck_core::model::AlertContext;
use opsdeck_core::probe::test_smtp;
use opsdeck_core::{EmailAlertConfig, EntityId, Repository};

use crate::cli::{EmailArgs, EmailCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::state::Session;

use super::{alerts::severity_from, util};

/// Substituted for `{dashboard_url}` when the profile sets none.
const DEFAULT_DASHBOARD_URL: &str = "http://localhost:8080";

#[derive(Serialize)]
struct EmailView<'a> {
    #[serde(flatten)]
    config: &'a EmailAlertConfig,
    password: &'static str,
}

fn view(config: &EmailAlertConfig) -> EmailView<'_> {
    let set = config
        .password
        .as_ref()
        .is_some_and(|p| !p.expose_secret().is_empty());
    EmailView {
        config,
        password: if set { "****" } else { "(not set)" },
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn detail(v: &EmailView<'_>) -> String {
    let c = v.config;
    let types: Vec<String> = c.alert_types.iter().map(ToString::to_string).collect();
    [
        format!("Enabled:     {}", util::yes_no(c.enabled)),
        format!("SMTP:        {}:{}", c.smtp_server, c.smtp_port),
        format!("User:        {}", or_dash(&c.username)),
        format!("Password:    {}", v.password),
        format!("From:        {}", or_dash(&c.from_email)),
        format!(
            "Recipients:  {}",
            if c.to_emails.is_empty() {
                "(none)".to_owned()
            } else {
                c.to_emails.join(", ")
            }
        ),
        format!("Alert types: {}", types.join(", ")),
        format!("Subject:     {}", c.subject),
        "Template:".to_owned(),
        c.template
            .lines()
            .map(|l| format!("  {l}"))
            .collect::<Vec<_>>()
            .join("\n"),
    ]
    .join("\n")
}

/// Save without rewriting a keyring password that was only read back.
fn save(store: &mut SettingsStore, mut config: EmailAlertConfig) -> Result<(), CliError> {
    config.password = None;
    store.save_email_config(&config)?;
    Ok(())
}

#[allow(clippy::too_many_lines)]
pub async fn handle(
    session: &Session,
    args: EmailArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut store = SettingsStore::open(SettingsStore::default_path())?;
    let mut cfg = store.load_email_config()?;

    match args.command {
        EmailCommand::Show => {
            let v = view(&cfg);
            let out = output::render_single(&global.output, &v, detail, |v| {
                v.config.to_emails.join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EmailCommand::Set {
            enabled,
            smtp_server,
            smtp_port,
            username,
            from,
            subject,
            template,
            alert_types,
        } => {
            if let Some(v) = enabled {
                cfg.enabled = v;
            }
            if let Some(v) = smtp_server {
                cfg.smtp_server = v;
            }
            if let Some(v) = smtp_port {
                cfg.smtp_port = v;
            }
            if let Some(v) = username {
                cfg.username = v;
            }
            if let Some(v) = from {
                cfg.from_email = v;
            }
            if let Some(v) = subject {
                cfg.subject = v;
            }
            if let Some(v) = template {
                cfg.template = v;
            }
            if let Some(types) = alert_types {
                let mut types: Vec<_> = types.into_iter().map(severity_from).collect();
                types.sort_unstable_by(|a, b| b.cmp(a));
                types.dedup();
                cfg.alert_types = types;
            }
            save(&mut store, cfg)?;
            if !global.quiet {
                eprintln!("✓ E-mail settings saved to {}", store.path().display());
            }
            Ok(())
        }

        EmailCommand::AddRecipient { email } => {
            cfg.add_recipient(&email)?;
            save(&mut store, cfg)?;
            if !global.quiet {
                eprintln!("✓ Added recipient {}", email.trim());
            }
            Ok(())
        }

        EmailCommand::RemoveRecipient { email } => {
            if !cfg.remove_recipient(&email) {
                return Err(CliError::NotFound {
                    resource_type: "recipient".into(),
                    identifier: email,
                    list_command: "email show".into(),
                });
            }
            save(&mut store, cfg)?;
            if !global.quiet {
                eprintln!("✓ Removed recipient {}", email.trim());
            }
            Ok(())
        }

        EmailCommand::SetPassword => {
            let password = rpassword::prompt_password("SMTP password: ")?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "the SMTP password cannot be empty".into(),
                });
            }
            config::store_secret(SMTP_PASSWORD_KEY, &SecretString::from(password))?;
            if !global.quiet {
                eprintln!("✓ SMTP password stored in system keyring");
            }
            Ok(())
        }

        EmailCommand::Test => {
            let cancel = util::cancel_on_ctrl_c();
            let ok = test_smtp(&cfg, config::probe_timeout(global), &cancel).await?;
            util::report_reachable(&ok, global.quiet);
            Ok(())
        }

        EmailCommand::Preview { alert } => {
            let alert = session.store().alerts().require(&EntityId::from(alert.as_str()))?;
            let device_ip = session
                .store()
                .devices()
                .list()
                .iter()
                .find(|d| d.name == alert.device)
                .map(|d| d.ip);
            let dashboard_url = config::active_profile(global)?
                .1
                .dashboard_url
                .unwrap_or_else(|| DEFAULT_DASHBOARD_URL.into());

            if !cfg.should_notify(&alert) && !global.quiet {
                eprintln!("note: with the current settings this alert would not be sent");
            }
            let email = cfg.render(
                &alert,
                AlertContext {
                    device_ip,
                    dashboard_url: &dashboard_url,
                },
            );
            let out = output::render_single(
                &global.output,
                &email,
                |e| format!("Subject: {}\n\n{}", e.subject, e.body),
                |e| e.subject.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EmailCommand::Reset => {
            if !util::confirm("Forget the saved e-mail settings?", "email reset", global.yes)? {
                return Ok(());
            }
            let removed = store.clear_email_config()?;
            if !global.quiet {
                if removed {
                    eprintln!("✓ E-mail settings reset to defaults");
                } else {
                    eprintln!("E-mail settings were already at defaults");
                }
            }
            Ok(())
        }
    }
}
