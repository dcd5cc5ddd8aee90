//! Clap derive structures for the `kollect` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use kollect_core::{Platform, SnapshotMode};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// kollect -- connection dashboard for AWS, Azure, Kubernetes and Veeam
#[derive(Debug, Parser)]
#[command(
    name = "kollect",
    version,
    about = "Inspect and manage kollect platform connections from the command line",
    long_about = "Shows which platforms the kollect aggregator backend is connected to,\n\
        configures and disconnects them, and browses the collected inventory.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "KOLLECT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "KOLLECT_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Where connection state is read from (overrides profile)
    #[arg(long, env = "KOLLECT_SOURCE", global = true)]
    pub source: Option<SourceArg>,

    /// Output format [default: `defaults.output` from config, else table]
    #[arg(
        long = "output",
        short = 'o',
        env = "KOLLECT_OUTPUT",
        value_name = "FORMAT",
        global = true
    )]
    pub output_flag: Option<OutputFormat>,

    /// When to use color output [default: `defaults.color` from config, else auto]
    #[arg(long = "color", value_name = "WHEN", global = true)]
    pub color_flag: Option<ColorMode>,

    /// Effective output format, filled from the flag or config defaults.
    #[arg(skip)]
    pub output: OutputFormat,

    /// Effective color mode, filled from the flag or config defaults.
    #[arg(skip)]
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "KOLLECT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "KOLLECT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
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

#[derive(Debug, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    /// One bulk inventory read per pass
    Bulk,
    /// One status read per platform, in parallel
    PerPlatform,
}

impl From<SourceArg> for SnapshotMode {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Bulk => Self::Bulk,
            SourceArg::PerPlatform => Self::PerPlatform,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlatformArg {
    Aws,
    Azure,
    Kubernetes,
    Veeam,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Aws => Self::Aws,
            PlatformArg::Azure => Self::Azure,
            PlatformArg::Kubernetes => Self::Kubernetes,
            PlatformArg::Veeam => Self::Veeam,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the connection state of every platform
    #[command(alias = "st")]
    Status,

    /// Keep reconciling and print every state change until interrupted
    Watch(WatchArgs),

    /// Submit credentials for a platform
    #[command(alias = "conf")]
    Configure(ConfigureArgs),

    /// Disconnect a platform
    Disconnect(DisconnectArgs),

    /// Browse collected inventory
    #[command(alias = "inv")]
    Inventory(InventoryArgs),

    /// Send a message to the backend assistant
    Chat(ChatArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between passes (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIGURE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigureArgs {
    #[command(subcommand)]
    pub command: ConfigureCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigureCommand {
    /// AWS access key pair
    Aws {
        /// Access key ID (prompted when omitted)
        #[arg(long)]
        access_key: Option<String>,

        /// Secret access key (prompted when omitted)
        #[arg(long, env = "KOLLECT_AWS_SECRET_KEY", hide_env_values = true)]
        secret_key: Option<String>,
    },

    /// Azure service principal
    Azure {
        #[arg(long)]
        subscription_id: Option<String>,

        #[arg(long)]
        tenant_id: Option<String>,

        #[arg(long)]
        client_id: Option<String>,

        /// Client secret (prompted when omitted)
        #[arg(long, env = "KOLLECT_AZURE_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,
    },

    /// Reuse the Azure CLI login on the backend host
    AzureCli,

    /// Kubeconfig, uploaded or already on the backend host
    #[command(group(ArgGroup::new("kubeconfig_source").required(true).args(["kubeconfig", "path"])))]
    Kubernetes {
        /// Local kubeconfig file to upload
        #[arg(long, short = 'f')]
        kubeconfig: Option<PathBuf>,

        /// Kubeconfig path on the backend host
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Veeam Backup & Replication server
    Veeam {
        /// Server URL (e.g. https://vbr.local:9419)
        #[arg(long)]
        server_url: Option<String>,

        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long, env = "KOLLECT_VEEAM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DISCONNECT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DisconnectArgs {
    /// Platform to disconnect
    pub platform: PlatformArg,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INVENTORY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Category to list (summary of all categories when omitted)
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Nodes,
    Namespaces,
    Pods,
    Deployments,
    StatefulSets,
    Services,
    PersistentVolumes,
    PersistentVolumeClaims,
    StorageClasses,
    VolumeSnapshotClasses,
    Ec2,
    S3,
    AzureVms,
    AzureStorage,
    BackupJobs,
    ServerInfo,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHAT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Message text (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
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
    /// Print the config file location
    Path,

    /// Display current configuration
    Show,

    /// Create initial config file with guided setup
    Init,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
