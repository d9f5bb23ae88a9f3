//! Non-interactive UI for CI/headless environments.

use std::io::Write;

use super::{LineProgress, OutputMode, ProgressHandle, Theme, UserInterface};

/// UI implementation for non-interactive mode.
///
/// No progress bar is drawn; each finished install is printed as a line
/// instead, which reads well in CI logs.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: Theme,
    use_color: bool,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode, use_color: bool) -> Self {
        Self {
            mode,
            theme: Theme::for_color(use_color),
            use_color,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn emit(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes()).ok();
        stdout.flush().ok();
    }

    fn start_progress(&mut self) -> Box<dyn ProgressHandle> {
        Box::new(LineProgress {
            quiet: !self.mode.shows_progress(),
        })
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn use_color(&self) -> bool {
        self.use_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal, false);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn keeps_output_mode() {
        let ui = NonInteractiveUI::new(OutputMode::Quiet, false);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn theme_follows_color_flag() {
        let ui = NonInteractiveUI::new(OutputMode::Normal, false);
        assert_eq!(ui.theme().format_error("x"), "✗ x");
    }
}
