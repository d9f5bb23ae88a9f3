//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use super::{
    InstallProgress, LineProgress, NonInteractiveUI, OutputMode, ProgressHandle, Theme,
    UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: Theme,
    mode: OutputMode,
    use_color: bool,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode, use_color: bool) -> Self {
        Self {
            term: Term::stdout(),
            theme: Theme::for_color(use_color),
            mode,
            use_color,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        let mut err = Term::stderr();
        writeln!(err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn emit(&mut self, text: &str) {
        write!(self.term, "{}", text).ok();
        self.term.flush().ok();
    }

    fn start_progress(&mut self) -> Box<dyn ProgressHandle> {
        if self.mode.shows_progress() {
            Box::new(InstallProgress::new())
        } else {
            Box::new(LineProgress { quiet: true })
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    fn use_color(&self) -> bool {
        self.use_color
    }
}

/// Create the appropriate UI based on context.
///
/// The terminal UI is only used when stdout is a terminal and the caller
/// did not force non-interactive mode (CI, `--format json`).
pub fn create_ui(interactive: bool, mode: OutputMode, use_color: bool) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode, use_color))
    } else {
        Box::new(NonInteractiveUI::new(mode, use_color))
    }
}
