//! Clap derive structures for the `proporter` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// proporter -- export Jamf Pro configuration as Terraform
#[derive(Debug, Parser)]
#[command(
    name = "proporter",
    version,
    about = "Browse Jamf Pro resources and export them as Terraform",
    long_about = "Browse the policies, groups, profiles, scripts and packages of a\n\
        Jamf Pro instance, preview their dependencies, and download them as\n\
        Terraform (HCL) archives rendered by the JamfTerraform backend.\n\n\
        Jamf Pro credentials are never stored. Supply them with --jamf-url,\n\
        --jamf-username and PROPORTER_JAMF_PASSWORD, or answer the prompts.",
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
    #[arg(long, short = 'p', env = "PROPORTER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Export backend URL (overrides profile)
    #[arg(long, env = "PROPORTER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Jamf Pro instance URL, e.g. https://acme.jamfcloud.com
    #[arg(long, env = "PROPORTER_JAMF_URL", global = true)]
    pub jamf_url: Option<String>,

    /// Jamf Pro username
    #[arg(long, short = 'u', env = "PROPORTER_JAMF_USERNAME", global = true)]
    pub jamf_username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PROPORTER_OUTPUT",
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

    /// Accept self-signed TLS certificates from the backend
    #[arg(long, short = 'k', env = "PROPORTER_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default 120)
    #[arg(long, env = "PROPORTER_TIMEOUT", global = true)]
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
    /// List the resource types that can be browsed and exported
    Types,

    /// List every resource of one type
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one resource's HCL and direct dependencies
    Show(ShowArgs),

    /// Export selected resources as a Terraform archive
    Export(ExportArgs),

    /// Inventory the whole instance, optionally exporting everything
    Scan(ScanArgs),

    /// Check Jamf Pro credentials without exporting anything
    Verify,

    /// Check whether the export backend is reachable
    Health(HealthArgs),

    /// Generate HCL from a natural-language prompt
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// List the backend's prompt recipes
    Cookbook(CookbookArgs),

    /// Interactive session: browse, select, preview, export
    Browse,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Resource type id (see `proporter types`)
    pub resource_type: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Resource type id
    pub resource_type: String,

    /// Numeric resource id
    pub id: u64,

    /// Also write the HCL (bundle when available) to a .tf file
    #[arg(long)]
    pub download: bool,

    /// Directory for --download (defaults to the profile's output_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Resources as <type>:<id>, e.g. policies:12 scripts:4
    #[arg(required = true, num_args = 1..)]
    pub resources: Vec<String>,

    /// Export only the listed resources, without their dependencies
    #[arg(long)]
    pub no_deps: bool,

    /// Directory for jamf_export.zip (defaults to the profile's output_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// After scanning, export every discovered resource
    #[arg(long)]
    pub export: bool,

    /// Directory for jamf_export.zip (defaults to the profile's output_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BACKEND
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HealthArgs {
    /// Keep polling and report status changes until interrupted
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Polling period in seconds for --watch
    #[arg(long, default_value = "30")]
    pub interval: u64,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// What the configuration should do
    pub prompt: String,

    /// Extra context passed along with the prompt
    #[arg(long)]
    pub context: Option<String>,

    /// Write the HCL to this file instead of stdout
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CookbookArgs {
    /// Only show recipes in this category
    #[arg(long)]
    pub category: Option<String>,
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

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: api_url, ca_cert, insecure, timeout, output_dir
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
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
