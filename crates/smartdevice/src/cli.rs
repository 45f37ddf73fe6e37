//! Clap derive structures for the `smartdevice` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smartdevice -- control cloud-connected fridges and freezers
#[derive(Debug, Parser)]
#[command(
    name = "smartdevice",
    version,
    about = "Monitor and control cloud-connected refrigeration appliances",
    long_about = "Talks to the vendor's Home API with a personal API key or\n\
        an account login. Reads appliances, controls and notifications,\n\
        and changes temperatures, modes and doors.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "SMARTDEVICE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Home API base URL (overrides profile)
    #[arg(long, env = "SMARTDEVICE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Home API key (overrides profile credentials)
    #[arg(long, env = "SMARTDEVICE_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SMARTDEVICE_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SMARTDEVICE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// List and inspect appliances
    #[command(alias = "app", alias = "a")]
    Appliances(AppliancesArgs),

    /// Inspect the controls of one appliance
    #[command(alias = "ctl")]
    Controls(ControlsArgs),

    /// Change a control on an appliance
    Set(SetArgs),

    /// List and acknowledge appliance notifications
    #[command(alias = "notif", alias = "n")]
    Notifications(NotificationsArgs),

    /// Test the configured credentials
    Login,

    /// Poll continuously and print changes
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Appliances ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AppliancesArgs {
    #[command(subcommand)]
    pub command: AppliancesCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppliancesCommand {
    /// List every appliance on the account
    #[command(alias = "ls")]
    List,

    /// Show one appliance in detail
    Get {
        /// Appliance device ID
        device_id: String,
    },
}

// ── Controls ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ControlsArgs {
    #[command(subcommand)]
    pub command: ControlsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ControlsCommand {
    /// List the controls reported by an appliance
    #[command(alias = "ls")]
    List {
        /// Appliance device ID
        device_id: String,
    },
}

// ── Set ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Wait for the change to show up in a fresh poll
    #[arg(long, global = true)]
    pub wait: bool,

    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Set a zone's target temperature
    #[command(alias = "temp")]
    Temperature {
        /// Appliance device ID
        device_id: String,
        /// Target temperature, whole degrees
        #[arg(allow_negative_numbers = true)]
        target: i64,
        /// Temperature zone
        #[arg(long, short = 'z', default_value_t = 0)]
        zone: i64,
        /// Unit (defaults to the zone's reported unit)
        #[arg(long)]
        unit: Option<String>,
    },

    /// Switch an on/off control (supercool, superfrost, party mode...)
    Toggle {
        /// Appliance device ID
        device_id: String,
        /// Control name as shown by `controls list`
        control: String,
        state: Switch,
        #[arg(long, short = 'z')]
        zone: Option<i64>,
    },

    /// Select the mode of a mode control
    Mode {
        /// Appliance device ID
        device_id: String,
        /// Control name as shown by `controls list`
        control: String,
        /// Mode value, e.g. ZERO_ZERO
        mode: String,
        #[arg(long, short = 'z')]
        zone: Option<i64>,
    },

    /// Open or close an automatic door
    Door {
        /// Appliance device ID
        device_id: String,
        action: DoorAction,
        /// Door control name (defaults to the appliance's first door)
        #[arg(long)]
        control: Option<String>,
        #[arg(long, short = 'z')]
        zone: Option<i64>,
    },

    /// Set the ice maker mode
    #[command(alias = "ice")]
    Icemaker {
        /// Appliance device ID
        device_id: String,
        mode: IceMakerMode,
        /// Ice maker control name (defaults to the appliance's first ice maker)
        #[arg(long)]
        control: Option<String>,
        #[arg(long, short = 'z')]
        zone: Option<i64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DoorAction {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IceMakerMode {
    On,
    Off,
    MaxIce,
}

impl IceMakerMode {
    /// Wire value expected by the Home API.
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::MaxIce => "MAX_ICE",
        }
    }
}

// ── Notifications ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List open notifications
    #[command(alias = "ls")]
    List {
        /// Only show notifications for this appliance
        #[arg(long, short = 'd')]
        device: Option<String>,
    },

    /// Acknowledge a notification
    Ack {
        /// Appliance device ID
        device_id: String,
        /// Notification ID
        notification_id: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval, e.g. "30s" or "2m" (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<String>,

    /// Only watch this appliance
    #[arg(long, short = 'd')]
    pub device: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Store an API key or password in the system keyring
    SetSecret {
        /// Which secret to store
        #[arg(value_enum, default_value = "api-key")]
        kind: SecretArg,
    },

    /// Print the configuration file location
    Path,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecretArg {
    ApiKey,
    Password,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
