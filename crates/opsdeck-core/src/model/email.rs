// ── E-mail alert settings ──
//
// The one settings blob that survives between sessions. The SMTP password
// is write-only: it is skipped by serde and lives in the keyring instead.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::alert::{Alert, AlertSeverity};
use crate::error::CoreError;

/// Placeholders understood by [`EmailAlertConfig::render`].
pub const TEMPLATE_VARIABLES: &[&str] = &[
    "{device_name}",
    "{alert_type}",
    "{alert_title}",
    "{alert_description}",
    "{timestamp}",
    "{device_ip}",
    "{dashboard_url}",
];

const DEFAULT_TEMPLATE: &str = "An alert was raised on a MikroTik router:

Device: {device_name}
Alert type: {alert_type}
Title: {alert_title}
Description: {alert_description}
Date and time: {timestamp}
Device IP: {device_ip}

Please check the device status immediately.

Dashboard: {dashboard_url}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailAlertConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    #[serde(skip)]
    pub password: Option<SecretString>,
    pub from_email: String,
    pub to_emails: Vec<String>,
    pub alert_types: Vec<AlertSeverity>,
    pub subject: String,
    pub template: String,
}

impl Default for EmailAlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 587,
            username: String::new(),
            password: None,
            from_email: String::new(),
            to_emails: Vec::new(),
            alert_types: vec![AlertSeverity::Critical, AlertSeverity::Warning],
            subject: "[MikroTik Alert] {alert_type}: {device_name}".into(),
            template: DEFAULT_TEMPLATE.into(),
        }
    }
}

/// Subject and body ready to hand to a mailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Values substituted into the subject and body templates.
#[derive(Debug, Clone, Copy)]
pub struct AlertContext<'a> {
    pub device_ip: Option<IpAddr>,
    pub dashboard_url: &'a str,
}

impl EmailAlertConfig {
    /// Add a recipient. Rejects addresses without `@` and duplicates.
    pub fn add_recipient(&mut self, email: &str) -> Result<(), CoreError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(CoreError::validation(
                "email",
                format!("'{email}' is not an e-mail address"),
            ));
        }
        if self.to_emails.iter().any(|e| e == email) {
            return Err(CoreError::validation(
                "email",
                format!("'{email}' is already a recipient"),
            ));
        }
        self.to_emails.push(email.to_owned());
        Ok(())
    }

    /// Remove a recipient. Returns `false` if it was not present.
    pub fn remove_recipient(&mut self, email: &str) -> bool {
        let before = self.to_emails.len();
        self.to_emails.retain(|e| e != email.trim());
        self.to_emails.len() != before
    }

    /// Whether an alert of this severity should be mailed.
    pub fn should_notify(&self, alert: &Alert) -> bool {
        self.enabled && !self.to_emails.is_empty() && self.alert_types.contains(&alert.severity)
    }

    pub fn render(&self, alert: &Alert, ctx: AlertContext<'_>) -> RenderedEmail {
        RenderedEmail {
            subject: substitute(&self.subject, alert, ctx),
            body: substitute(&self.template, alert, ctx),
        }
    }
}

fn substitute(template: &str, alert: &Alert, ctx: AlertContext<'_>) -> String {
    let ip = ctx
        .device_ip
        .map_or_else(|| "unknown".to_owned(), |ip| ip.to_string());
    template
        .replace("{device_name}", &alert.device)
        .replace("{alert_type}", &alert.severity.to_string())
        .replace("{alert_title}", &alert.title)
        .replace("{alert_description}", &alert.description)
        .replace("{timestamp}", &format_timestamp(alert.timestamp))
        .replace("{device_ip}", &ip)
        .replace("{dashboard_url}", ctx.dashboard_url)
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{AlertCategory, AlertStatus, EntityId};
    use chrono::TimeZone;

    fn alert(severity: AlertSeverity) -> Alert {
        Alert {
            id: EntityId::from("1"),
            severity,
            title: "ether1 down".into(),
            description: "Uplink lost".into(),
            device: "RouterOS-Main".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 25).unwrap(),
            status: AlertStatus::Active,
            category: AlertCategory::Connectivity,
        }
    }

    #[test]
    fn add_recipient_rejects_missing_at_sign() {
        let mut cfg = EmailAlertConfig::default();
        assert!(cfg.add_recipient("admin.example.com").is_err());
        assert!(cfg.to_emails.is_empty());
    }

    #[test]
    fn add_recipient_rejects_duplicates() {
        let mut cfg = EmailAlertConfig::default();
        cfg.add_recipient("noc@example.com").unwrap();
        assert!(cfg.add_recipient(" noc@example.com ").is_err());
        assert_eq!(cfg.to_emails, ["noc@example.com"]);
    }

    #[test]
    fn remove_recipient_reports_presence() {
        let mut cfg = EmailAlertConfig::default();
        cfg.add_recipient("noc@example.com").unwrap();
        assert!(cfg.remove_recipient("noc@example.com"));
        assert!(!cfg.remove_recipient("noc@example.com"));
    }

    #[test]
    fn notify_respects_enabled_flag_and_types() {
        let mut cfg = EmailAlertConfig::default();
        cfg.add_recipient("noc@example.com").unwrap();
        assert!(!cfg.should_notify(&alert(AlertSeverity::Critical)));

        cfg.enabled = true;
        assert!(cfg.should_notify(&alert(AlertSeverity::Critical)));
        assert!(!cfg.should_notify(&alert(AlertSeverity::Info)));
    }

    #[test]
    fn render_fills_every_placeholder() {
        let cfg = EmailAlertConfig::default();
        let mail = cfg.render(
            &alert(AlertSeverity::Critical),
            AlertContext {
                device_ip: Some("192.168.1.1".parse().unwrap()),
                dashboard_url: "https://noc.example.com",
            },
        );
        assert_eq!(mail.subject, "[MikroTik Alert] critical: RouterOS-Main");
        assert!(mail.body.contains("Device IP: 192.168.1.1"));
        assert!(mail.body.contains("2024-01-15 14:30:25 UTC"));
        for var in TEMPLATE_VARIABLES {
            assert!(!mail.body.contains(var), "{var} left unrendered");
        }
    }

    #[test]
    fn password_never_serialized() {
        let cfg = EmailAlertConfig {
            password: Some(SecretString::from("hunter2")),
            ..EmailAlertConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
    }
}
