//! Clap derive structures for the `apcups` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use apcups_snmp::{AuthAlgorithm, PrivacyAlgorithm};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// apcups -- monitor APC UPS devices over SNMP
#[derive(Debug, Parser)]
#[command(
    name = "apcups",
    version,
    about = "Monitor APC UPS devices from the command line",
    long_about = "Reads battery, input, output and self-test data from APC UPS\n\
        network management cards over SNMP v2c or v3.",
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
    /// UPS hostname or IP address
    #[arg(long, short = 'H', env = "APCUPS_HOST", global = true)]
    pub host: Option<String>,

    /// SNMP agent port
    #[arg(long, env = "APCUPS_PORT", default_value = "161", global = true)]
    pub port: u16,

    /// Request timeout in seconds
    #[arg(long, env = "APCUPS_TIMEOUT", default_value = "5", global = true)]
    pub timeout: u64,

    /// SNMPv2c community string (default: public)
    #[arg(long, short = 'c', env = "APCUPS_COMMUNITY", global = true, hide_env = true)]
    pub community: Option<String>,

    /// SNMPv3 username (switches to v3 when set)
    #[arg(long, short = 'u', env = "APCUPS_USERNAME", global = true)]
    pub username: Option<String>,

    /// SNMPv3 authentication digest
    #[arg(long, env = "APCUPS_AUTH_PROTOCOL", value_enum, global = true)]
    pub auth_protocol: Option<AuthProtocolArg>,

    /// SNMPv3 authentication passphrase
    #[arg(long, env = "APCUPS_AUTH_PASSPHRASE", global = true, hide_env = true)]
    pub auth_passphrase: Option<String>,

    /// SNMPv3 privacy cipher
    #[arg(long, env = "APCUPS_PRIV_PROTOCOL", value_enum, global = true)]
    pub priv_protocol: Option<PrivProtocolArg>,

    /// SNMPv3 privacy passphrase
    #[arg(long, env = "APCUPS_PRIV_PASSPHRASE", global = true, hide_env = true)]
    pub priv_passphrase: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "APCUPS_OUTPUT",
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

// ── Protocol Enums ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AuthProtocolArg {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl From<AuthProtocolArg> for AuthAlgorithm {
    fn from(arg: AuthProtocolArg) -> Self {
        match arg {
            AuthProtocolArg::Md5 => Self::Md5,
            AuthProtocolArg::Sha1 => Self::Sha1,
            AuthProtocolArg::Sha224 => Self::Sha224,
            AuthProtocolArg::Sha256 => Self::Sha256,
            AuthProtocolArg::Sha384 => Self::Sha384,
            AuthProtocolArg::Sha512 => Self::Sha512,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PrivProtocolArg {
    Des,
    Aes128,
    Aes192,
    Aes256,
}

impl From<PrivProtocolArg> for PrivacyAlgorithm {
    fn from(arg: PrivProtocolArg) -> Self {
        match arg {
            PrivProtocolArg::Des => Self::Des,
            PrivProtocolArg::Aes128 => Self::Aes128,
            PrivProtocolArg::Aes192 => Self::Aes192,
            PrivProtocolArg::Aes256 => Self::Aes256,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the UPS and report whether it answers
    Test,

    /// Show device identity (model, firmware, serial)
    #[command(alias = "id")]
    Identity,

    /// Read sensor values once
    Data(DataArgs),

    /// Poll sensor values on an interval
    Watch(WatchArgs),

    /// List available sensors
    Sensors,
}

// ── Shared Sensor Selection ──────────────────────────────────────────

/// Sensor filter shared by `data` and `watch`.
#[derive(Debug, Args)]
pub struct SensorSelection {
    /// Sensors to include (comma-separated keys; default: all)
    #[arg(long, short = 's', value_delimiter = ',')]
    pub sensors: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    #[command(flatten)]
    pub select: SensorSelection,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub select: SensorSelection,

    /// Seconds between polls (clamped to 10-300)
    #[arg(long, short = 'i', default_value = "60")]
    pub interval: u64,

    /// Stop after this many polls (default: until interrupted)
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}
