//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, FromArgMatches, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::catalogue::EntryFilter;
use crate::report::OutputFormat;

/// devtools - Install and check the tools a workspace needs.
#[derive(Debug, Parser)]
#[command(name = "devtools")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (highest-priority config layer)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output format of the selected command.
    pub fn format(&self) -> OutputFormat {
        match &self.command {
            Some(Commands::Install(args)) => args.format,
            Some(Commands::Check(args)) => args.format,
            Some(Commands::List(args)) => args.format,
            Some(Commands::Lint(args)) => args.format,
            Some(Commands::Completions(_)) | None => OutputFormat::Human,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install every missing tool (default if no command specified)
    Install(InstallArgs),

    /// Report tool status without installing anything
    Check(CheckArgs),

    /// List catalogue entries and their backends
    List(ListArgs),

    /// Validate catalogue files
    Lint(LintArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Which entries to work on, and from which catalogue.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SelectionArgs {
    /// Only entries in this category (repeatable)
    #[arg(long, value_name = "CATEGORY")]
    pub category: Vec<String>,

    /// Only entries whose name contains this text
    #[arg(long, value_name = "SUBSTR")]
    pub name: Option<String>,

    /// Catalogue file to use instead of the built-in one (repeatable)
    #[arg(long, value_name = "FILE")]
    pub catalogue: Vec<PathBuf>,
}

impl SelectionArgs {
    pub fn filter(&self) -> EntryFilter {
        EntryFilter {
            categories: self.category.clone(),
            name: self.name.clone(),
        }
    }
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Fail when a tool has no usable backend
    #[arg(long)]
    pub strict: bool,

    /// Number of parallel workers
    #[arg(short, long, env = "DEVTOOLS_JOBS")]
    pub jobs: Option<usize>,

    /// Per-install timeout in seconds
    #[arg(long, value_name = "SECS", env = "DEVTOOLS_TIMEOUT")]
    pub timeout: Option<u64>,
}

impl InstallArgs {
    /// Arguments for a bare `devtools` run: defaults plus `DEVTOOLS_*` env.
    pub fn from_env() -> Result<Self, clap::Error> {
        let matches = Self::augment_args(clap::Command::new("install"))
            .try_get_matches_from(["install"])?;
        Self::from_arg_matches(&matches)
    }
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Fail when a tool has no usable backend
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LintArgs {
    /// Catalogue file to lint instead of the built-in one (repeatable)
    #[arg(long, value_name = "FILE")]
    pub catalogue: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
