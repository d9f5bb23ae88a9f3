//! User interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] capturing output for tests
//! - Progress bars, status icons and the colour theme
//!
//! # Example
//!
//! ```
//! use devtools::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet, false);
//! ui.show_header("Tools");
//! ui.success("Everything installed");
//! ```

pub mod icons;
pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use icons::StatusKind;
pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::{format_duration, InstallProgress, LineProgress, ProgressHandle};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, Theme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show a header line.
    fn show_header(&mut self, title: &str);

    /// Write command output (reports, listings, completions).
    ///
    /// Unlike [`message`](Self::message), this is printed in every mode.
    fn emit(&mut self, text: &str);

    /// Start a progress display for installs.
    fn start_progress(&mut self) -> Box<dyn ProgressHandle>;

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;

    /// Whether styled output should carry colour.
    fn use_color(&self) -> bool;

    /// The theme matching [`use_color`](Self::use_color).
    fn theme(&self) -> Theme {
        Theme::for_color(self.use_color())
    }
}
