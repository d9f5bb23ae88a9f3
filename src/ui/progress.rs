//! Install progress display.
//!
//! Installs finish on worker threads, so a [`ProgressHandle`] is shared
//! across threads and only takes `&self`.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Live progress of a reconciliation run.
pub trait ProgressHandle: Send + Sync {
    /// Set the number of installs expected.
    fn set_length(&self, total: u64);

    /// Show what is currently running.
    fn set_message(&self, msg: &str);

    /// Print a line without disturbing the bar.
    fn println(&self, line: &str);

    /// Count one install as done.
    fn inc(&self);

    /// Remove the bar.
    fn finish(&self);
}

/// An indicatif progress bar.
pub struct InstallProgress {
    bar: ProgressBar,
}

impl InstallProgress {
    /// A visible bar on stderr.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.magenta} [{bar:24.magenta/dim}] {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .progress_chars("█▓░");
        bar.set_style(style);
        Self { bar }
    }

    /// A bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for InstallProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressHandle for InstallProgress {
    /// Also starts drawing: nothing is shown while entries are surveyed,
    /// so a sudo prompt at that point is not overdrawn.
    fn set_length(&self, total: u64) {
        self.bar.set_length(total);
        if !self.bar.is_hidden() {
            self.bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(line);
        }
    }

    fn inc(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Plain line-per-event progress for logs and CI.
#[derive(Debug, Default)]
pub struct LineProgress {
    pub quiet: bool,
}

impl ProgressHandle for LineProgress {
    fn set_length(&self, _total: u64) {}

    fn set_message(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg);
        }
    }

    fn println(&self, line: &str) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    fn inc(&self) {}

    fn finish(&self) {}
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_secs_f64(5.3)), "5.3s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn hidden_progress_accepts_updates() {
        let progress = InstallProgress::hidden();
        progress.set_length(3);
        progress.set_message("installing just");
        progress.inc();
        progress.finish();
    }

    #[test]
    fn quiet_line_progress_is_silent() {
        let progress = LineProgress { quiet: true };
        progress.set_message("x");
        progress.println("y");
    }
}
