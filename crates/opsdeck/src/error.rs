//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use opsdeck_config::ConfigError;
use opsdeck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection probes ────────────────────────────────────────────

    #[error("Cannot connect to {target}: {reason}")]
    #[diagnostic(
        code(opsdeck::connection_failed),
        help("Check that the service is running and reachable from this host.")
    )]
    ConnectionFailed { target: String, reason: String },

    #[error("Connection to {target} timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(opsdeck::timeout),
        help("Increase the probe timeout with --timeout.")
    )]
    Timeout { target: String, timeout_ms: u64 },

    #[error("Connection attempt to {target} was cancelled")]
    #[diagnostic(code(opsdeck::cancelled))]
    Cancelled { target: String },

    // ── Credentials ──────────────────────────────────────────────────

    #[error("No AMI secret configured for profile '{profile}'")]
    #[diagnostic(
        code(opsdeck::no_credentials),
        help(
            "Store one with: opsdeck config set-secret\n\
             Or set secret_env on the profile to read it from an environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Keyring unavailable: {reason}")]
    #[diagnostic(
        code(opsdeck::keyring),
        help("Put the secret in the config file or an environment variable instead.")
    )]
    Keyring { reason: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(opsdeck::not_found),
        help("Run: opsdeck {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(opsdeck::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    #[error("No menu selected")]
    #[diagnostic(
        code(opsdeck::no_menu_selected),
        help("Run: opsdeck menus select <ID>")
    )]
    NoMenuSelected,

    #[error("No device selected")]
    #[diagnostic(
        code(opsdeck::no_device_selected),
        help("Run: opsdeck devices select <ID>, or pass --device")
    )]
    NoDeviceSelected,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(opsdeck::validation))]
    Validation { field: String, reason: String },

    #[error("Call flow has {count} error(s)")]
    #[diagnostic(
        code(opsdeck::invalid_call_flow),
        help("{details}\n\nFix the menus, or pass --allow-cycles if the loops are intended.")
    )]
    InvalidCallFlow { count: usize, details: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(opsdeck::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: opsdeck config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(opsdeck::config))]
    Config(Box<figment::Error>),

    #[error("Invalid workspace file {path}")]
    #[diagnostic(
        code(opsdeck::state),
        help("The file is not an opsdeck workspace. Move it aside to start from demo data.")
    )]
    State {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(opsdeck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(opsdeck::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Cancelled { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoCredentials { .. } | Self::Keyring { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidCallFlow { .. }
            | Self::NoMenuSelected
            | Self::NoDeviceSelected
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

/// Where to look for the ids of an entity kind.
fn list_command(entity_type: &str) -> String {
    match entity_type {
        "vpn server" => "vpn servers".into(),
        "vpn session" => "vpn sessions".into(),
        other => format!("{other}s list"),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            CoreError::DuplicateId {
                entity_type,
                identifier,
            } => CliError::Conflict {
                resource_type: entity_type,
                identifier,
            },

            CoreError::Validation { field, reason } => CliError::Validation { field, reason },

            CoreError::InvalidGraph { report } => CliError::InvalidCallFlow {
                count: report.errors().count(),
                details: report
                    .errors()
                    .map(|issue| format!("  - {issue}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::NoDeviceSelected => CliError::NoDeviceSelected,

            CoreError::Timeout { target, timeout_ms } => CliError::Timeout { target, timeout_ms },

            CoreError::Cancelled { target } => CliError::Cancelled { target },

            CoreError::ConnectionFailed { target, reason } => {
                CliError::ConnectionFailed { target, reason }
            }

            CoreError::Serialization(e) => CliError::Json(e),

            CoreError::Io(e) => CliError::Io(e),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Keyring(e) => CliError::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Json(e) => CliError::Json(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
