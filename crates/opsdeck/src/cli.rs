//! Clap derive structures for the `opsdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// opsdeck -- IVR call flows and MikroTik network administration
#[derive(Debug, Parser)]
#[command(
    name = "opsdeck",
    version,
    about = "Administer IVR call flows and MikroTik networks from the command line",
    long_about = "Edit Asterisk IVR call-flow menus and export them as an AGI handler,\n\
        render manager.conf, and inspect routers, VLANs, VPN sessions, alerts,\n\
        backups and users.\n\n\
        State lives in a JSON workspace file (--state); without one, commands\n\
        run against built-in demo data.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// PBX profile to use
    #[arg(long, short = 'p', env = "OPSDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Workspace file holding menus, calls and network records
    #[arg(long, env = "OPSDECK_STATE", global = true, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OPSDECK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Connection probe timeout in seconds
    #[arg(long, env = "OPSDECK_TIMEOUT", default_value = "5", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit IVR call-flow menus and export the AGI handler
    #[command(alias = "m")]
    Menus(MenusArgs),

    /// PBX integration settings and generated config files
    Settings(SettingsArgs),

    /// Monitor and control active calls
    Calls(CallsArgs),

    /// Call volume analytics and reports
    Analytics(AnalyticsArgs),

    /// Dashboard summary of both portals
    Overview,

    /// Manage MikroTik routers
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// View interface traffic
    #[command(alias = "if")]
    Interfaces(InterfacesArgs),

    /// Manage VLANs
    Vlans(VlansArgs),

    /// View VPN servers and sessions
    Vpn(VpnArgs),

    /// Review and triage network alerts
    Alerts(AlertsArgs),

    /// Manage configuration backups
    Backups(BackupsArgs),

    /// Manage console users
    Users(UsersArgs),

    /// E-mail alert notifications
    Email(EmailArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MENUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MenusArgs {
    #[command(subcommand)]
    pub command: MenusCommand,
}

#[derive(Debug, Subcommand)]
pub enum MenusCommand {
    /// List call-flow menus
    #[command(alias = "ls")]
    List,

    /// Show a menu and its options
    Get {
        /// Menu ID
        menu: String,
    },

    /// Append a new menu and select it
    Add(MenuFields),

    /// Select the menu subsequent option commands act on
    Select {
        /// Menu ID
        menu: String,
    },

    /// Edit the selected menu
    Edit(MenuFields),

    /// Remove a menu
    #[command(alias = "rm")]
    Remove {
        /// Menu ID
        menu: String,
    },

    /// Append an option to the selected menu
    AddOption(OptionFields),

    /// Edit an option of the selected menu
    EditOption {
        /// Option ID
        option: String,

        #[command(flatten)]
        fields: OptionFields,
    },

    /// Remove an option from the selected menu
    RemoveOption {
        /// Option ID
        option: String,
    },

    /// Check the call-flow graph for broken or looping menus
    Validate(FlowPolicyArgs),

    /// Validate, then write the AGI handler script
    Export {
        /// Write to FILE instead of stdout
        #[arg(long, short = 'f', value_name = "FILE")]
        file: Option<PathBuf>,

        #[command(flatten)]
        policy: FlowPolicyArgs,
    },
}

#[derive(Debug, Args)]
pub struct MenuFields {
    /// Menu name
    #[arg(long)]
    pub name: Option<String>,

    /// Greeting text
    #[arg(long)]
    pub greeting: Option<String>,

    /// Seconds to wait for a digit
    #[arg(long)]
    pub digit_timeout: Option<u32>,

    /// Invalid attempts before hanging up
    #[arg(long)]
    pub retries: Option<u32>,
}

#[derive(Debug, Args)]
pub struct OptionFields {
    /// Input digit
    #[arg(long)]
    pub key: Option<String>,

    /// Option label
    #[arg(long)]
    pub label: Option<String>,

    /// What pressing the digit does
    #[arg(long)]
    pub action: Option<MenuActionArg>,

    /// Menu ID, extension number or queue name
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Debug, Args)]
pub struct FlowPolicyArgs {
    /// Accept menus that loop back to each other
    #[arg(long)]
    pub allow_cycles: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MenuActionArg {
    /// Jump to another menu
    Menu,
    /// Dial an extension
    Extension,
    /// Hang up
    Hangup,
    /// Enqueue the caller
    Queue,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SETTINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the resolved settings of the active profile
    Show,

    /// Check the active profile's settings
    Validate,

    /// Render the Asterisk manager.conf
    ManagerConf {
        /// Write to FILE instead of stdout
        #[arg(long, short = 'f', value_name = "FILE")]
        file: Option<PathBuf>,

        /// Write the AMI secret in plaintext
        #[arg(long)]
        reveal_secrets: bool,
    },

    /// Render the FastAGI server script
    AgiServer {
        /// Write to FILE instead of stdout
        #[arg(long, short = 'f', value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Check that the AMI port accepts connections
    TestAmi,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CALLS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CallsArgs {
    #[command(subcommand)]
    pub command: CallsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CallsCommand {
    /// List active calls
    #[command(alias = "ls")]
    List,

    /// Counts by status and mean duration
    Summary,

    /// Hang up a call
    Hangup {
        /// Call ID
        call: String,
    },

    /// Transfer a call
    Transfer {
        /// Call ID
        call: String,
    },

    /// Redraw the call board as durations tick
    Watch {
        /// Seconds between duration updates
        #[arg(long, default_value = "1")]
        interval: u64,

        /// Stop after this many redraws (default: until Ctrl-C)
        #[arg(long, short = 'n')]
        updates: Option<u32>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ANALYTICS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub command: AnalyticsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// Headline figures
    Summary,

    /// Calls per hour
    Hourly,

    /// Calls per weekday
    Weekly,

    /// Share of selections per menu option
    MenuUsage,

    /// Daily CSV report
    Report {
        /// Write to FILE instead of stdout
        #[arg(long, short = 'f', value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List routers
    #[command(alias = "ls")]
    List,

    /// Show router details
    Get {
        /// Device ID or name
        device: String,
    },

    /// Add a router to the inventory
    Register {
        #[command(flatten)]
        form: DeviceForm,

        /// Probe the API port before saving
        #[arg(long)]
        test: bool,
    },

    /// Check credentials and probe a router's API port
    Test(DeviceForm),

    /// Focus a router for backups
    Select {
        /// Device ID or name
        device: String,
    },
}

#[derive(Debug, Args)]
pub struct DeviceForm {
    /// Display name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Management IP address
    #[arg(long)]
    pub ip: Option<String>,

    /// RouterOS user
    #[arg(long, default_value = "")]
    pub username: String,

    /// RouterOS password (prompted when omitted)
    #[arg(long, env = "OPSDECK_DEVICE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// RouterOS API port
    #[arg(long, default_value = "8728")]
    pub api_port: u16,

    /// Hardware model
    #[arg(long, default_value = "")]
    pub model: String,

    /// Physical location
    #[arg(long)]
    pub location: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INTERFACES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    #[command(subcommand)]
    pub command: InterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfacesCommand {
    /// List interfaces with counters
    #[command(alias = "ls")]
    List,

    /// Aggregate traffic across interfaces
    Traffic,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VLANS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VlansArgs {
    #[command(subcommand)]
    pub command: VlansCommand,
}

#[derive(Debug, Subcommand)]
pub enum VlansCommand {
    /// List VLANs
    #[command(alias = "ls")]
    List,

    /// Create a VLAN
    Create {
        /// VLAN tag (1-4094)
        #[arg(long)]
        vlan_id: Option<u16>,

        /// VLAN name
        #[arg(long, default_value = "")]
        name: String,

        /// Parent interface
        #[arg(long, default_value = "bridge")]
        interface: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VPN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VpnArgs {
    #[command(subcommand)]
    pub command: VpnCommand,
}

#[derive(Debug, Subcommand)]
pub enum VpnCommand {
    /// List VPN servers with utilisation
    Servers,

    /// List VPN sessions
    Sessions,

    /// Connected sessions and traffic totals
    Summary,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALERTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts
    #[command(alias = "ls")]
    List {
        /// Only alerts with this status
        #[arg(long)]
        status: Option<AlertStatusArg>,

        /// Only alerts with this severity
        #[arg(long)]
        severity: Option<AlertSeverityArg>,
    },

    /// Active alerts by severity
    Summary {
        /// How many recent active alerts to show
        #[arg(long, default_value = "3")]
        recent: usize,
    },

    /// Acknowledge an alert
    #[command(alias = "ack")]
    Acknowledge {
        /// Alert ID
        alert: String,
    },

    /// Resolve an alert
    Resolve {
        /// Alert ID
        alert: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlertStatusArg {
    Active,
    Acknowledged,
    Resolved,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlertSeverityArg {
    Critical,
    Warning,
    Info,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BACKUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BackupsArgs {
    #[command(subcommand)]
    pub command: BackupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BackupsCommand {
    /// List backups
    #[command(alias = "ls")]
    List,

    /// Back up the selected router
    Create {
        /// Backup name (default: backup_<unix millis>)
        #[arg(long)]
        name: Option<String>,

        /// Router to back up instead of the selected one
        #[arg(long)]
        device: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List,

    /// Create a user
    Create {
        /// Login name
        #[arg(long, default_value = "")]
        username: String,

        /// E-mail address
        #[arg(long, default_value = "")]
        email: String,

        /// Role
        #[arg(long, default_value = "viewer")]
        role: UserRoleArg,

        /// Initial password (prompted when omitted)
        #[arg(long, env = "OPSDECK_USER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UserRoleArg {
    Admin,
    Operator,
    Viewer,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EMAIL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EmailArgs {
    #[command(subcommand)]
    pub command: EmailCommand,
}

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Show the saved notification settings
    Show,

    /// Change notification settings
    Set {
        /// Send notifications
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: Option<bool>,

        /// SMTP server host
        #[arg(long)]
        smtp_server: Option<String>,

        /// SMTP server port
        #[arg(long)]
        smtp_port: Option<u16>,

        /// SMTP user
        #[arg(long)]
        username: Option<String>,

        /// Sender address
        #[arg(long)]
        from: Option<String>,

        /// Subject template
        #[arg(long)]
        subject: Option<String>,

        /// Body template
        #[arg(long)]
        template: Option<String>,

        /// Severities that trigger a notification
        #[arg(long, value_delimiter = ',')]
        alert_types: Option<Vec<AlertSeverityArg>>,
    },

    /// Add a recipient
    AddRecipient {
        /// E-mail address
        email: String,
    },

    /// Remove a recipient
    RemoveRecipient {
        /// E-mail address
        email: String,
    },

    /// Store the SMTP password in the system keyring
    SetPassword,

    /// Check that the SMTP server accepts connections
    Test,

    /// Render the notification an alert would produce
    Preview {
        /// Alert ID
        alert: String,
    },

    /// Forget the saved settings
    Reset,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. "host", "agi.port", "audio.format"
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's AMI secret in the system keyring
    SetSecret {
        /// Store the database password instead
        #[arg(long)]
        database: bool,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
