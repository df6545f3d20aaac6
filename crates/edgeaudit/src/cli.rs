//! Clap derive structures for the `edgeaudit` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use edgeaudit_core::Check;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// edgeaudit -- SD-WAN edge router audit
#[derive(Debug, Parser)]
#[command(
    name = "edgeaudit",
    version,
    about = "Audit SD-WAN edge routers for provisioning ports and shaper rates",
    long_about = "Pulls the edge router inventory from the SD-WAN manager, logs into each\n\
        router over SSH, and reports which sites still have provisioning ports\n\
        enabled and which WAN shapers are below the policy threshold.\n\n\
        Requires management reachability to the routers (VPN).",
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
    /// Manager profile to use
    #[arg(long, short = 'p', env = "EDGEAUDIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Manager URL (overrides profile)
    #[arg(long, short = 'c', env = "EDGEAUDIT_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Manager username (overrides profile)
    #[arg(long, short = 'u', env = "EDGEAUDIT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Router SSH username (defaults to the manager username)
    #[arg(long, env = "EDGEAUDIT_SSH_USERNAME", global = true)]
    pub ssh_username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EDGEAUDIT_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "EDGEAUDIT_INSECURE", global = true)]
    pub insecure: bool,

    /// Manager request timeout in seconds [default: profile, then 30]
    #[arg(long, env = "EDGEAUDIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Shaper threshold in Mbps (overrides profile)
    #[arg(long, env = "EDGEAUDIT_THRESHOLD", global = true)]
    pub threshold: Option<u64>,

    /// Routers inspected in parallel (overrides profile)
    #[arg(long, env = "EDGEAUDIT_CONCURRENCY", global = true)]
    pub concurrency: Option<usize>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width report / pretty table (default, interactive)
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
    /// Find routers whose provisioning port should be disabled
    Ports,

    /// Report shapers below the threshold, with WAN, downstream and liveness
    #[command(alias = "qos")]
    Shaping,

    /// Run an arbitrary set of checks
    Run(RunArgs),

    /// Interactive menu (the classic operator workflow)
    Menu,

    /// List the edge router inventory
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Checks to run (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        required = true,
        value_parser = parse_check
    )]
    pub checks: Vec<Check>,

    /// Inspect every edge router, not only the configured model codes
    #[arg(long)]
    pub all_models: bool,
}

fn parse_check(raw: &str) -> Result<Check, String> {
    raw.parse()
        .map_err(|_| "expected one of: ports, shaping, wan-ip, downstream, liveness".to_string())
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Include controllers, validators and managers
    #[arg(long, short = 'a')]
    pub all: bool,
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

    /// Set a configuration value
    Set {
        /// Config key (e.g., "controller", "ssh.port", "audit.shaper_threshold_mbps")
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

    /// Store manager and router passwords in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
