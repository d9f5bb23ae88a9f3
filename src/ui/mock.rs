//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use devtools::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Checking tools");
//! ui.success("Done!");
//!
//! assert!(ui.has_message("Checking tools"));
//! assert!(ui.successes().contains(&"Done!".to_string()));
//! ```

use std::sync::{Arc, Mutex};

use super::{OutputMode, ProgressHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    emitted: String,
    progress: Arc<Mutex<Vec<String>>>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Everything passed to [`UserInterface::emit`], concatenated.
    pub fn emitted(&self) -> &str {
        &self.emitted
    }

    /// Lines and messages sent to progress handles.
    pub fn progress_lines(&self) -> Vec<String> {
        self.progress
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn emit(&mut self, text: &str) {
        self.emitted.push_str(text);
    }

    fn start_progress(&mut self) -> Box<dyn ProgressHandle> {
        Box::new(MockProgress {
            lines: Arc::clone(&self.progress),
        })
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn use_color(&self) -> bool {
        false
    }
}

/// Progress handle recording into the owning [`MockUI`].
#[derive(Debug)]
pub struct MockProgress {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MockProgress {
    fn record(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl ProgressHandle for MockProgress {
    fn set_length(&self, total: u64) {
        self.record(format!("length {}", total));
    }

    fn set_message(&self, msg: &str) {
        self.record(format!("message {}", msg));
    }

    fn println(&self, line: &str) {
        self.record(line.to_string());
    }

    fn inc(&self) {}

    fn finish(&self) {
        self.record("finish".to_string());
    }
}
