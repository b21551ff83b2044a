//! Clap derive structures for the `awning` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// awning -- control a Bond-bridged awning by hand or by the weather
#[derive(Debug, Parser)]
#[command(
    name = "awning",
    version,
    about = "Control a motorized awning through a Bond Bridge",
    long_about = "Control a motorized awning through a Bond Bridge.\n\n\
        Manual commands talk to the bridge directly. `awning auto` checks the\n\
        weather and the sun's position and opens or closes the awning to match.\n\
        Settings are read from the environment and from a .env file.",
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
    /// Load settings from this .env file instead of searching for one
    #[arg(long, value_name = "PATH", global = true)]
    pub env_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Directory for `auto` log files (default: `logs/` next to the .env file)
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

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
    /// Human-readable text and tables (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
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

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the awning
    Open,

    /// Close the awning
    Close,

    /// Stop awning movement
    Stop,

    /// Toggle between open and closed
    Toggle,

    /// Show the current awning state
    Status,

    /// Show device information reported by the bridge
    Info,

    /// Open or close the awning based on weather and sun position
    Auto(AutoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct AutoArgs {
    /// Evaluate conditions without moving the awning or sending notifications
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

impl Command {
    /// Automation runs log to a file as well as stderr.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto(_))
    }
}
