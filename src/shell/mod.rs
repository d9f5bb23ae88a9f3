//! Shell command execution and environment helpers.

pub mod cancel;
pub mod command;
pub mod platform;

pub use cancel::CancelToken;
pub use command::{execute, execute_check, CommandOptions, CommandResult};
pub use platform::{is_ci, is_elevated};
