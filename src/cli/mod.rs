//! Command-line interface for devtools.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    CheckArgs, Cli, Commands, CompletionsArgs, InstallArgs, LintArgs, ListArgs, SelectionArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
