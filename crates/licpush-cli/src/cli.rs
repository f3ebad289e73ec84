//! Clap derive structures for the `licpush` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// licpush -- bulk smart-licensing provisioning for Cisco IOS devices
#[derive(Debug, Parser)]
#[command(
    name = "licpush",
    version,
    about = "Push smart-licensing configuration to a fleet of Cisco devices",
    long_about = "Reads a list of device IP addresses, opens an SSH session to each one,\n\
        replaces the default call-home profile with a Smart Software Manager\n\
        destination, and registers the device with a licensing token.\n\n\
        Devices are processed one at a time; a failure on one device never\n\
        stops the rest of the run.",
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
    /// Provisioning profile to use
    #[arg(long, short = 'p', env = "LICPUSH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device list file, one IP address per line (overrides profile)
    #[arg(long, short = 'd', env = "LICPUSH_DEVICE_LIST", global = true)]
    pub device_list: Option<PathBuf>,

    /// SSH username (overrides profile)
    #[arg(long, short = 'u', env = "LICPUSH_USERNAME", global = true)]
    pub username: Option<String>,

    /// Smart-licensing registration token
    #[arg(long, env = "LICPUSH_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// SSH port
    #[arg(long, env = "LICPUSH_PORT", global = true)]
    pub port: Option<u16>,

    /// Per-command timeout in seconds
    #[arg(long, env = "LICPUSH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

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
}

// ── Color Enum ───────────────────────────────────────────────────────

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
    /// Apply licensing configuration to every device in the list
    #[command(alias = "push")]
    Run(RunArgs),

    /// Parse and validate a device list without connecting
    Check(CheckArgs),

    /// Show the configuration a run would send (token redacted)
    Plan,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RUN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Always print the per-device report table, without asking
    #[arg(long)]
    pub details: bool,

    /// Never print the per-device report table
    #[arg(long, conflicts_with = "details")]
    pub no_details: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHECK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Device list to validate (defaults to --device-list / profile)
    pub file: Option<PathBuf>,
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

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (e.g., "ssm_url", "profile_name", "device_list")
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

    /// Store a secret in the system keyring
    SetPassword {
        /// Which secret to store
        #[arg(long, default_value = "password", value_enum)]
        kind: SecretKind,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum SecretKind {
    /// SSH login password
    Password,
    /// Privileged-exec (enable) secret
    Enable,
    /// Smart-licensing registration token
    Token,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
