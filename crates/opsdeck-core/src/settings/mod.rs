// ── PBX integration settings ──
//
// Flat settings groups edited on the IVR settings page, and the text
// artifacts rendered from them.

mod agi_server;
mod manager_conf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

pub use agi_server::{AGI_SERVER_FILE_NAME, render_agi_server};
pub use manager_conf::{MANAGER_CONF_FILE_NAME, REDACTED, export_manager_conf};

/// Whether secrets are written into rendered artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecretDisclosure {
    /// Emit a `<redacted>` placeholder.
    #[default]
    Redact,
    /// Emit the plaintext secret.
    Reveal,
}

/// Asterisk Manager Interface connection.
#[derive(Debug, Clone)]
pub struct AsteriskSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub secret: SecretString,
    /// Dialplan context the FastAGI extension is installed into.
    pub context: String,
}

impl Default for AsteriskSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5038,
            username: "admin".into(),
            secret: SecretString::from(String::new()),
            context: "from-internal".into(),
        }
    }
}

/// FastAGI server the generated handler runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgiSettings {
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Seconds.
    pub timeout: u32,
}

impl Default for AgiSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 4573,
            max_connections: 10,
            timeout: 30,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AudioFormat {
    #[default]
    Wav,
    Gsm,
    Ulaw,
    Alaw,
}

/// Sample rates the prompt pipeline accepts.
pub const SAMPLE_RATES: [u32; 3] = [8000, 16000, 44100];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u8,
    /// Percent, 0..=100.
    pub volume: u8,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            format: AudioFormat::Wav,
            sample_rate: 8000,
            channels: 1,
            volume: 80,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DatabaseKind {
    #[default]
    Sqlite,
    Mysql,
    Postgresql,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub kind: DatabaseKind,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: SecretString,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Sqlite,
            host: "localhost".into(),
            port: 3306,
            name: "ivr_data".into(),
            username: "root".into(),
            password: SecretString::from(String::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    pub call_recording: bool,
    pub dtmf_detection: bool,
    pub background_music: bool,
    pub voicemail: bool,
    pub call_queue: bool,
    pub callback: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            call_recording: true,
            dtmf_detection: true,
            background_music: false,
            voicemail: true,
            call_queue: true,
            callback: false,
        }
    }
}

/// Everything on the IVR settings page.
#[derive(Debug, Clone, Default)]
pub struct IvrSettings {
    pub asterisk: AsteriskSettings,
    pub agi: AgiSettings,
    pub audio: AudioSettings,
    pub database: DatabaseSettings,
    pub features: FeatureFlags,
}

impl IvrSettings {
    /// Range checks for values the form constrains with dropdowns.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.asterisk.username.trim().is_empty() {
            return Err(CoreError::validation(
                "asterisk.username",
                "the AMI user name cannot be empty",
            ));
        }
        if self.asterisk.context.trim().is_empty() {
            return Err(CoreError::validation(
                "asterisk.context",
                "the dialplan context cannot be empty",
            ));
        }
        if !SAMPLE_RATES.contains(&self.audio.sample_rate) {
            return Err(CoreError::validation(
                "audio.sample_rate",
                format!("{} is not one of 8000, 16000, 44100", self.audio.sample_rate),
            ));
        }
        if !matches!(self.audio.channels, 1 | 2) {
            return Err(CoreError::validation(
                "audio.channels",
                "channels must be 1 (mono) or 2 (stereo)",
            ));
        }
        if self.audio.volume > 100 {
            return Err(CoreError::validation(
                "audio.volume",
                format!("{} is above 100", self.audio.volume),
            ));
        }
        if self.agi.max_connections == 0 {
            return Err(CoreError::validation(
                "agi.max_connections",
                "at least one connection is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        IvrSettings::default().validate().unwrap();
    }

    #[test]
    fn odd_sample_rate_rejected() {
        let mut settings = IvrSettings::default();
        settings.audio.sample_rate = 22050;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("audio.sample_rate"));
    }

    #[test]
    fn loud_volume_rejected() {
        let mut settings = IvrSettings::default();
        settings.audio.volume = 101;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn audio_format_parses() {
        assert_eq!("ULAW".parse::<AudioFormat>().unwrap(), AudioFormat::Ulaw);
    }
}
