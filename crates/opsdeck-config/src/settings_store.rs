// ── Persisted settings ──
//
// A flat JSON key/value file for state that outlives a session (the
// e-mail alert form). Secrets never land here; the SMTP password goes to
// the keyring under `SMTP_PASSWORD_KEY`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use opsdeck_core::EmailAlertConfig;

use crate::{ConfigError, SMTP_PASSWORD_KEY, data_dir, delete_secret, load_secret, store_secret};

/// Key the e-mail alert configuration is stored under.
pub const EMAIL_CONFIG_KEY: &str = "mikrotik-email-config";

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl SettingsStore {
    /// `settings.json` in the platform data directory.
    pub fn default_path() -> PathBuf {
        data_dir().join("settings.json")
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Map::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.entries
            .get(key)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(Into::into)
    }

    /// Store `value` under `key` and write the file.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), ConfigError> {
        self.entries.insert(key.to_owned(), serde_json::to_value(value)?);
        self.flush()
    }

    /// Remove `key`. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &str) -> Result<bool, ConfigError> {
        if self.entries.remove(key).is_none() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    // ── E-mail alerts ──

    /// The saved e-mail alert form, or the defaults. The SMTP password is
    /// filled in from the keyring when one is stored.
    pub fn load_email_config(&self) -> Result<EmailAlertConfig, ConfigError> {
        let mut config: EmailAlertConfig = self.get(EMAIL_CONFIG_KEY)?.unwrap_or_default();
        config.password = load_secret(SMTP_PASSWORD_KEY);
        Ok(config)
    }

    /// Save the form. A password on `config` is written to the keyring.
    pub fn save_email_config(&mut self, config: &EmailAlertConfig) -> Result<(), ConfigError> {
        if let Some(ref password) = config.password {
            store_secret(SMTP_PASSWORD_KEY, password)?;
        }
        self.set(EMAIL_CONFIG_KEY, config)
    }

    /// Drop the saved form and its keyring password.
    pub fn clear_email_config(&mut self) -> Result<bool, ConfigError> {
        let removed = self.remove(EMAIL_CONFIG_KEY)?;
        if let Err(e) = delete_secret(SMTP_PASSWORD_KEY) {
            tracing::warn!(error = %e, "could not delete SMTP password from keyring");
        }
        Ok(removed)
    }

    fn flush(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "settings written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opsdeck_core::AlertSeverity;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.keys().count(), 0);
        assert_eq!(store.get::<String>("anything").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("settings.json");

        let mut store = SettingsStore::open(&path).unwrap();
        store.set("theme", &"dark").unwrap();
        store.set("refresh", &30_u32).unwrap();

        let reopened = SettingsStore::open(&path).unwrap();
        assert_eq!(reopened.get::<String>("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(reopened.get::<u32>("refresh").unwrap(), Some(30));
    }

    #[test]
    fn remove_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        store.set("theme", &"dark").unwrap();
        assert!(store.remove("theme").unwrap());
        assert!(!store.remove("theme").unwrap());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(SettingsStore::open(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn email_config_defaults_then_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::open(&path).unwrap();
        let mut config = store.load_email_config().unwrap();
        assert!(!config.enabled);
        assert_eq!(config.smtp_port, 587);

        config.enabled = true;
        config.add_recipient("noc@example.com").unwrap();
        config.alert_types = vec![AlertSeverity::Critical];
        store.save_email_config(&config).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains(EMAIL_CONFIG_KEY));
        assert!(!raw.contains("password"));

        let loaded = SettingsStore::open(&path).unwrap().load_email_config().unwrap();
        assert!(loaded.enabled);
        assert_eq!(loaded.to_emails, ["noc@example.com"]);
        assert_eq!(loaded.alert_types, [AlertSeverity::Critical]);
    }
}
