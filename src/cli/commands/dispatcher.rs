//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, InstallArgs};
use crate::error::Result;
use crate::ui::UserInterface;

use super::completions::CompletionsCommand;
use super::lint::LintCommand;
use super::list::ListCommand;
use super::reconcile::ReconcileCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// Per-entry problems are part of a successful execution and show up
    /// in the exit code; `Err` is reserved for run-level failures.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config: None,
        }
    }

    /// Add an explicit config file as the highest config layer.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// With no subcommand, runs `install` with default arguments and any
    /// `DEVTOOLS_*` environment overrides.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = &self.project_root;
        let config = self.config.as_deref();

        match &cli.command {
            Some(Commands::Install(args)) => {
                ReconcileCommand::install(root, config, args.clone()).execute(ui)
            }
            Some(Commands::Check(args)) => {
                ReconcileCommand::check(root, config, args.clone()).execute(ui)
            }
            Some(Commands::List(args)) => ListCommand::new(root, config, args.clone()).execute(ui),
            Some(Commands::Lint(args)) => LintCommand::new(root, config, args.clone()).execute(ui),
            Some(Commands::Completions(args)) => {
                CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => {
                let args = InstallArgs::from_env().map_err(anyhow::Error::from)?;
                ReconcileCommand::install(root, config, args).execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn dispatches_lint() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tools.yml");
        fs::write(&file, "- name: x\n  category: misc\n").unwrap();
        let cli = Cli::try_parse_from([
            "devtools",
            "lint",
            "--catalogue",
            file.to_str().unwrap(),
        ])
        .unwrap();
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.emitted().contains("declares no installers"));
    }

    #[test]
    fn explicit_config_is_loaded() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("broken.yml");
        fs::write(&config, "jobs: 0").unwrap();
        let cli = Cli::try_parse_from(["devtools", "list"]).unwrap();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .with_config(Some(config))
            .dispatch(&cli, &mut MockUI::new());

        assert!(result.is_err());
    }
}
