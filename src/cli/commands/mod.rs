//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. `install` is the default.

pub mod completions;
pub mod context;
pub mod dispatcher;
pub mod lint;
pub mod list;
pub mod reconcile;

pub use context::CommandContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
