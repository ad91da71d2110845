//! Shared configuration for the opsdeck CLI.
//!
//! TOML profiles describing a PBX deployment, secret resolution
//! (env + keyring + plaintext), translation to `opsdeck_core::IvrSettings`,
//! and the small JSON settings file that outlives a session.

mod settings_store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use opsdeck_core::settings::{
    AgiSettings, AsteriskSettings, AudioSettings, DatabaseKind, DatabaseSettings, FeatureFlags,
};
use opsdeck_core::IvrSettings;

pub use settings_store::{EMAIL_CONFIG_KEY, SettingsStore};

/// Keyring service all opsdeck secrets are stored under.
pub const KEYRING_SERVICE: &str = "opsdeck";

/// Keyring entry for the alert mailer's SMTP password.
pub const SMTP_PASSWORD_KEY: &str = "email/smtp-password";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no AMI secret configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named PBX profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds allowed for a connection probe.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    5
}

/// A named PBX deployment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    /// AMI host.
    pub host: String,

    /// AMI port.
    pub port: u16,

    /// AMI user.
    pub username: String,

    /// AMI secret (plaintext; prefer keyring or env var).
    pub secret: Option<String>,

    /// Environment variable holding the AMI secret.
    pub secret_env: Option<String>,

    /// Dialplan context for the FastAGI extension.
    pub context: String,

    /// Link placed in alert e-mails.
    pub dashboard_url: Option<String>,

    pub agi: AgiSettings,
    pub audio: AudioSettings,
    pub features: FeatureFlags,
    pub database: DatabaseProfile,
}

impl Default for Profile {
    fn default() -> Self {
        let ami = AsteriskSettings::default();
        Self {
            host: ami.host,
            port: ami.port,
            username: ami.username,
            secret: None,
            secret_env: None,
            context: ami.context,
            dashboard_url: None,
            agi: AgiSettings::default(),
            audio: AudioSettings::default(),
            features: FeatureFlags::default(),
            database: DatabaseProfile::default(),
        }
    }
}

/// Call-log database section of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseProfile {
    #[serde(rename = "type")]
    pub kind: DatabaseKind,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: Option<String>,
    pub password_env: Option<String>,
}

impl Default for DatabaseProfile {
    fn default() -> Self {
        let db = DatabaseSettings::default();
        Self {
            kind: db.kind,
            host: db.host,
            port: db.port,
            name: db.name,
            username: db.username,
            password: None,
            password_env: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "opsdeck", "opsdeck")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for persisted settings (`settings.json`).
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("opsdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment overrides use `OPSDECK_` and a double underscore between
/// levels, e.g. `OPSDECK_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OPSDECK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    tracing::debug!(path = %path.display(), "config written");
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

/// Keyring entry name for a profile's AMI secret.
pub fn ami_secret_key(profile_name: &str) -> String {
    format!("{profile_name}/ami-secret")
}

/// Keyring entry name for a profile's database password.
pub fn db_password_key(profile_name: &str) -> String {
    format!("{profile_name}/db-password")
}

pub fn store_secret(key: &str, secret: &SecretString) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, key)?.set_password(secret.expose_secret())?;
    tracing::info!(key, "secret stored in keyring");
    Ok(())
}

/// Read a secret from the keyring. Missing entries and unavailable
/// keyrings both read as `None`.
pub fn load_secret(key: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, key).ok()?;
    match entry.get_password() {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            tracing::debug!(key, error = %e, "keyring unavailable");
            None
        }
    }
}

/// Remove a keyring entry. Returns `false` if there was none.
pub fn delete_secret(key: &str) -> Result<bool, ConfigError> {
    match keyring::Entry::new(KEYRING_SERVICE, key)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ── Secret resolution ───────────────────────────────────────────────

fn resolve_chain(
    env_name: Option<&str>,
    keyring_key: &str,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    // 1. Env var named by the profile
    if let Some(env_name) = env_name {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = load_secret(keyring_key) {
        return Some(secret);
    }

    // 3. Plaintext in config
    plaintext.map(SecretString::from)
}

/// Resolve the AMI secret: `secret_env`, then keyring, then plaintext.
pub fn resolve_ami_secret(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_chain(
        profile.secret_env.as_deref(),
        &ami_secret_key(profile_name),
        profile.secret.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the database password the same way. Absent means empty.
pub fn resolve_db_password(profile: &Profile, profile_name: &str) -> SecretString {
    resolve_chain(
        profile.database.password_env.as_deref(),
        &db_password_key(profile_name),
        profile.database.password.as_deref(),
    )
    .unwrap_or_else(|| SecretString::from(String::new()))
}

// ── Translation ─────────────────────────────────────────────────────

/// Build the settings the exporters render from a profile.
///
/// A profile without any AMI secret still converts; the secret is empty
/// and `manager.conf` shows it as such.
pub fn profile_to_settings(
    profile: &Profile,
    profile_name: &str,
) -> Result<IvrSettings, ConfigError> {
    let secret = match resolve_ami_secret(profile, profile_name) {
        Ok(secret) => secret,
        Err(ConfigError::NoCredentials { .. }) => {
            tracing::debug!(profile = profile_name, "no AMI secret configured");
            SecretString::from(String::new())
        }
        Err(e) => return Err(e),
    };

    let settings = IvrSettings {
        asterisk: AsteriskSettings {
            host: profile.host.clone(),
            port: profile.port,
            username: profile.username.clone(),
            secret,
            context: profile.context.clone(),
        },
        agi: profile.agi.clone(),
        audio: profile.audio.clone(),
        database: DatabaseSettings {
            kind: profile.database.kind,
            host: profile.database.host.clone(),
            port: profile.database.port,
            name: profile.database.name.clone(),
            username: profile.database.username.clone(),
            password: resolve_db_password(profile, profile_name),
        },
        features: profile.features.clone(),
    };

    settings.validate().map_err(|e| match e {
        opsdeck_core::CoreError::Validation { field, reason } => {
            ConfigError::Validation { field, reason }
        }
        other => ConfigError::Validation {
            field: format!("profiles.{profile_name}"),
            reason: other.to_string(),
        },
    })?;
    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opsdeck_core::settings::AudioFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults, Defaults::default());
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn partial_profile_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
output = "json"

[profiles.lab]
host = "pbx.lab"
secret = "s3cret"

[profiles.lab.audio]
format = "ulaw"

[profiles.lab.database]
type = "postgresql"
port = 5432
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 5);

        let lab = &cfg.profiles["lab"];
        assert_eq!(lab.host, "pbx.lab");
        assert_eq!(lab.port, 5038);
        assert_eq!(lab.context, "from-internal");
        assert_eq!(lab.audio.format, AudioFormat::Ulaw);
        assert_eq!(lab.audio.sample_rate, 8000);
        assert_eq!(lab.database.kind, DatabaseKind::Postgresql);
        assert_eq!(lab.database.name, "ivr_data");
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                host: "10.0.0.5".into(),
                dashboard_url: Some("https://noc.example.com".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn plaintext_secret_is_last_resort() {
        let profile = Profile {
            secret: Some("from-file".into()),
            ..Profile::default()
        };
        let secret = resolve_ami_secret(&profile, "opsdeck-test-plaintext").unwrap();
        assert_eq!(secret.expose_secret(), "from-file");
    }

    #[test]
    fn env_var_beats_plaintext() {
        let expected = std::env::var("PATH").unwrap();
        let profile = Profile {
            secret: Some("from-file".into()),
            secret_env: Some("PATH".into()),
            ..Profile::default()
        };
        let secret = resolve_ami_secret(&profile, "opsdeck-test-env").unwrap();
        assert_eq!(secret.expose_secret(), expected);
    }

    #[test]
    fn no_secret_anywhere() {
        let profile = Profile {
            secret_env: Some("OPSDECK_TEST_SURELY_UNSET_VARIABLE".into()),
            ..Profile::default()
        };
        let err = resolve_ami_secret(&profile, "opsdeck-test-missing").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NoCredentials { ref profile } if profile == "opsdeck-test-missing"
        ));
    }

    #[test]
    fn profile_converts_without_secret() {
        let settings = profile_to_settings(&Profile::default(), "opsdeck-test-convert").unwrap();
        assert_eq!(settings.asterisk.host, "localhost");
        assert!(settings.asterisk.secret.expose_secret().is_empty());
        assert_eq!(settings.agi.port, 4573);
    }

    #[test]
    fn invalid_profile_rejected() {
        let mut profile = Profile::default();
        profile.audio.sample_rate = 22050;
        let err = profile_to_settings(&profile, "opsdeck-test-invalid").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { ref field, .. } if field == "audio.sample_rate"
        ));
    }
}
