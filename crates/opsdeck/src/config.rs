//! CLI configuration: thin wrapper around `opsdeck_config` shared types.
//!
//! Adds `GlobalOpts`-aware profile selection on top of the shared crate.

use std::time::Duration;

use opsdeck_core::IvrSettings;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use opsdeck_config::{
    Config, Profile, ami_secret_key, config_path, db_password_key, load_config_or_default,
    save_config, store_secret,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// `"a, b"` or `"(none)"`, for `ProfileNotFound` help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// The active profile. An explicitly requested profile must exist; the
/// implicit default falls back to built-in settings.
pub fn active_profile(global: &GlobalOpts) -> Result<(String, Profile), CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);
    match cfg.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_some() => Err(CliError::ProfileNotFound {
            available: available_profiles(&cfg),
            name,
        }),
        None => {
            tracing::debug!(profile = %name, "no such profile; using built-in settings");
            Ok((name, Profile::default()))
        }
    }
}

/// Resolve the active profile into the settings the exporters render.
pub fn resolve_settings(global: &GlobalOpts) -> Result<(String, IvrSettings), CliError> {
    let (name, profile) = active_profile(global)?;
    let settings = opsdeck_config::profile_to_settings(&profile, &name)?;
    Ok((name, settings))
}

/// Probe timeout from `--timeout`.
pub fn probe_timeout(global: &GlobalOpts) -> Duration {
    Duration::from_secs(global.timeout.max(1))
}
