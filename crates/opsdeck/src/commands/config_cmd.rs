//! Config subcommand handlers.

use std::str::FromStr;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use opsdeck_core::settings::{AudioFormat, DatabaseKind};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext secrets masked, for every output format.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.secret.is_some() {
            profile.secret = Some(MASK.into());
        }
        if profile.database.password.is_some() {
            profile.database.password = Some(MASK.into());
        }
    }
    cfg
}

/// Format config for display. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "host = \"{}\"", p.host);
        let _ = writeln!(out, "port = {}", p.port);
        let _ = writeln!(out, "username = \"{}\"", p.username);
        if let Some(ref secret) = p.secret {
            let _ = writeln!(out, "secret = \"{secret}\"");
        }
        if let Some(ref env) = p.secret_env {
            let _ = writeln!(out, "secret_env = \"{env}\"");
        }
        let _ = writeln!(out, "context = \"{}\"", p.context);
        if let Some(ref url) = p.dashboard_url {
            let _ = writeln!(out, "dashboard_url = \"{url}\"");
        }
        let _ = writeln!(
            out,
            "agi = {{ host = \"{}\", port = {}, max_connections = {}, timeout = {} }}",
            p.agi.host, p.agi.port, p.agi.max_connections, p.agi.timeout
        );
        let _ = writeln!(
            out,
            "audio = {{ format = \"{}\", sample_rate = {}, channels = {}, volume = {} }}",
            p.audio.format, p.audio.sample_rate, p.audio.channels, p.audio.volume
        );
        let db = &p.database;
        let _ = write!(
            out,
            "database = {{ type = \"{}\", host = \"{}\", port = {}, name = \"{}\", \
             username = \"{}\"",
            db.kind, db.host, db.port, db.name, db.username
        );
        if let Some(ref pw) = db.password {
            let _ = write!(out, ", password = \"{pw}\"");
        }
        if let Some(ref env) = db.password_env {
            let _ = write!(out, ", password_env = \"{env}\"");
        }
        let _ = writeln!(out, " }}");
        let f = &p.features;
        let _ = writeln!(
            out,
            "features = {{ call_recording = {}, dtmf_detection = {}, background_music = {}, \
             voicemail = {}, call_queue = {}, callback = {} }}",
            f.call_recording,
            f.dtmf_detection,
            f.background_music,
            f.voicemail,
            f.call_queue,
            f.callback
        );
    }

    out
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse<T: FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("'{value}' is not {expected}"),
    })
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim().to_owned()).filter(|v| !v.is_empty())
}

const VALID_KEYS: &str = "host, port, username, secret, secret_env, context, dashboard_url, \
     agi.host, agi.port, agi.max_connections, agi.timeout, audio.format, audio.sample_rate, \
     audio.channels, audio.volume, database.type, database.host, database.port, database.name, \
     database.username, database.password_env, features.<flag>";

/// Apply one `key = value` assignment to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    let flag = |v: &str| parse::<bool>(key, v, "'true' or 'false'");
    match key {
        "host" => profile.host = value,
        "port" => profile.port = parse(key, &value, "a port number")?,
        "username" => profile.username = value,
        "secret" => profile.secret = non_empty(&value),
        "secret_env" | "secret-env" => profile.secret_env = non_empty(&value),
        "context" => profile.context = value,
        "dashboard_url" | "dashboard-url" => profile.dashboard_url = non_empty(&value),

        "agi.host" => profile.agi.host = value,
        "agi.port" => profile.agi.port = parse(key, &value, "a port number")?,
        "agi.max_connections" => profile.agi.max_connections = parse(key, &value, "a number")?,
        "agi.timeout" => profile.agi.timeout = parse(key, &value, "a number (seconds)")?,

        "audio.format" => {
            profile.audio.format = AudioFormat::from_str(value.trim()).map_err(|_| {
                CliError::Validation {
                    field: key.into(),
                    reason: "must be one of wav, gsm, ulaw, alaw".into(),
                }
            })?;
        }
        "audio.sample_rate" => profile.audio.sample_rate = parse(key, &value, "a number (Hz)")?,
        "audio.channels" => profile.audio.channels = parse(key, &value, "1 or 2")?,
        "audio.volume" => profile.audio.volume = parse(key, &value, "a percentage")?,

        "database.type" => {
            profile.database.kind = DatabaseKind::from_str(value.trim()).map_err(|_| {
                CliError::Validation {
                    field: key.into(),
                    reason: "must be one of sqlite, mysql, postgresql".into(),
                }
            })?;
        }
        "database.host" => profile.database.host = value,
        "database.port" => profile.database.port = parse(key, &value, "a port number")?,
        "database.name" => profile.database.name = value,
        "database.username" => profile.database.username = value,
        "database.password_env" => profile.database.password_env = non_empty(&value),

        "features.call_recording" => profile.features.call_recording = flag(&value)?,
        "features.dtmf_detection" => profile.features.dtmf_detection = flag(&value)?,
        "features.background_music" => profile.features.background_music = flag(&value)?,
        "features.voicemail" => profile.features.voicemail = flag(&value)?,
        "features.call_queue" => profile.features.call_queue = flag(&value)?,
        "features.callback" => profile.features.callback = flag(&value)?,

        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
            });
        }
    }
    Ok(())
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: String,
    keyring_key: &str,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_secret(keyring_key, &SecretString::from(secret))?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("opsdeck: configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let defaults = Profile::default();

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. AMI endpoint
            let host: String = Input::new()
                .with_prompt("Asterisk host")
                .default(defaults.host.clone())
                .interact_text()
                .map_err(prompt_err)?;
            let port: u16 = Input::new()
                .with_prompt("AMI port")
                .default(defaults.port)
                .interact_text()
                .map_err(prompt_err)?;
            let username: String = Input::new()
                .with_prompt("AMI user")
                .default(defaults.username.clone())
                .interact_text()
                .map_err(prompt_err)?;

            // 3. AMI secret
            let secret = rpassword::prompt_password("AMI secret (empty to skip): ")
                .map_err(prompt_err)?;
            let secret = if secret.is_empty() {
                None
            } else {
                let key = config::ami_secret_key(&profile_name);
                prompt_keyring_storage(secret, &key, "AMI secret")?
            };

            // 4. Dialplan and FastAGI
            let context: String = Input::new()
                .with_prompt("Dialplan context")
                .default(defaults.context.clone())
                .interact_text()
                .map_err(prompt_err)?;
            let agi_port: u16 = Input::new()
                .with_prompt("FastAGI port")
                .default(defaults.agi.port)
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile {
                host,
                port,
                username,
                secret,
                context,
                ..defaults
            };
            profile.agi.port = agi_port;

            // 5. Merge into any existing config
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: opsdeck settings test-ami");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_key(profile, &key, value)?;
            // Reject values the exporters would refuse before they reach disk.
            opsdeck_config::profile_to_settings(profile, &profile_name)?;

            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: opsdeck config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetSecret ───────────────────────────────────────────────
        ConfigCommand::SetSecret { database } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let (key, label) = if database {
                (config::db_password_key(&profile_name), "Database password: ")
            } else {
                (config::ami_secret_key(&profile_name), "AMI secret: ")
            };
            let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            config::store_secret(&key, &SecretString::from(secret))?;

            if !global.quiet {
                eprintln!("✓ Secret stored in system keyring for profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
