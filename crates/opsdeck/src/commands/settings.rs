//! PBX settings command handlers.

use secrecy::ExposeSecret;
use serde::Serialize;

use opsdeck_core::probe;
use opsdeck_core::settings::{AGI_SERVER_FILE_NAME, MANAGER_CONF_FILE_NAME};
use opsdeck_core::{IvrSettings, SecretDisclosure, export_manager_conf, render_agi_server};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

/// Serializable view of the settings with secrets masked.
#[derive(Serialize)]
struct SettingsView<'a> {
    profile: &'a str,
    asterisk: AsteriskView<'a>,
    agi: &'a opsdeck_core::settings::AgiSettings,
    audio: &'a opsdeck_core::settings::AudioSettings,
    database: DatabaseView<'a>,
    features: &'a opsdeck_core::settings::FeatureFlags,
}

#[derive(Serialize)]
struct AsteriskView<'a> {
    host: &'a str,
    port: u16,
    username: &'a str,
    secret: &'static str,
    context: &'a str,
}

#[derive(Serialize)]
struct DatabaseView<'a> {
    #[serde(rename = "type")]
    kind: String,
    host: &'a str,
    port: u16,
    name: &'a str,
    username: &'a str,
    password: &'static str,
}

fn mask(secret: &secrecy::SecretString) -> &'static str {
    if secret.expose_secret().is_empty() {
        "(not set)"
    } else {
        "****"
    }
}

fn view<'a>(profile: &'a str, s: &'a IvrSettings) -> SettingsView<'a> {
    SettingsView {
        profile,
        asterisk: AsteriskView {
            host: &s.asterisk.host,
            port: s.asterisk.port,
            username: &s.asterisk.username,
            secret: mask(&s.asterisk.secret),
            context: &s.asterisk.context,
        },
        agi: &s.agi,
        audio: &s.audio,
        database: DatabaseView {
            kind: s.database.kind.to_string(),
            host: &s.database.host,
            port: s.database.port,
            name: &s.database.name,
            username: &s.database.username,
            password: mask(&s.database.password),
        },
        features: &s.features,
    }
}

fn detail(v: &SettingsView<'_>) -> String {
    let f = v.features;
    [
        format!("Profile:          {}", v.profile),
        String::new(),
        "Asterisk".into(),
        format!("  AMI:            {}:{}", v.asterisk.host, v.asterisk.port),
        format!("  User:           {}", v.asterisk.username),
        format!("  Secret:         {}", v.asterisk.secret),
        format!("  Context:        {}", v.asterisk.context),
        "AGI".into(),
        format!("  Listen:         {}:{}", v.agi.host, v.agi.port),
        format!("  Max conns:      {}", v.agi.max_connections),
        format!("  Timeout:        {}s", v.agi.timeout),
        "Audio".into(),
        format!("  Format:         {}", v.audio.format),
        format!("  Sample rate:    {} Hz", v.audio.sample_rate),
        format!("  Channels:       {}", v.audio.channels),
        format!("  Volume:         {}%", v.audio.volume),
        "Database".into(),
        format!("  Type:           {}", v.database.kind),
        format!("  Server:         {}:{}", v.database.host, v.database.port),
        format!("  Name:           {}", v.database.name),
        format!("  User:           {}", v.database.username),
        format!("  Password:       {}", v.database.password),
        "Features".into(),
        format!("  Recording:      {}", util::yes_no(f.call_recording)),
        format!("  DTMF detection: {}", util::yes_no(f.dtmf_detection)),
        format!("  Hold music:     {}", util::yes_no(f.background_music)),
        format!("  Voicemail:      {}", util::yes_no(f.voicemail)),
        format!("  Call queue:     {}", util::yes_no(f.call_queue)),
        format!("  Callback:       {}", util::yes_no(f.callback)),
    ]
    .join("\n")
}

pub async fn handle(args: SettingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (profile, settings) = config::resolve_settings(global)?;

    match args.command {
        SettingsCommand::Show => {
            let v = view(&profile, &settings);
            let out = output::render_single(&global.output, &v, detail, |v| v.profile.to_owned());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // Resolution already validated; reaching here means the profile is sound.
        SettingsCommand::Validate => {
            if !global.quiet {
                eprintln!("✓ Profile '{profile}' settings are valid");
            }
            Ok(())
        }

        SettingsCommand::ManagerConf {
            file,
            reveal_secrets,
        } => {
            let disclosure = if reveal_secrets {
                if !global.quiet {
                    eprintln!("warning: the AMI secret is written in plaintext");
                }
                SecretDisclosure::Reveal
            } else {
                SecretDisclosure::Redact
            };
            let conf = export_manager_conf(&settings, disclosure);
            output::write_artifact(file.as_deref(), &conf, MANAGER_CONF_FILE_NAME, global.quiet)
        }

        SettingsCommand::AgiServer { file } => {
            let script = render_agi_server(&settings);
            output::write_artifact(file.as_deref(), &script, AGI_SERVER_FILE_NAME, global.quiet)
        }

        SettingsCommand::TestAmi => {
            let cancel = util::cancel_on_ctrl_c();
            let ok = probe::test_ami(&settings.asterisk, config::probe_timeout(global), &cancel)
                .await?;
            util::report_reachable(&ok, global.quiet);
            Ok(())
        }
    }
}
