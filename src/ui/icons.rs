//! Status icons for reconciliation outcomes.
//!
//! Every outcome maps to one [`StatusKind`], which owns the icon, its
//! colour and the bracketed text used when output is not a terminal.

use super::theme::Theme;
use crate::reconcile::Outcome;

/// Canonical status kinds used across all output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Tool in place.
    Success,
    /// Tool was installed during this run.
    Installed,
    /// Install or verification failed.
    Failed,
    /// No backend available.
    Skipped,
    /// Absent; would be installed.
    Missing,
    /// Never launched.
    Interrupted,
}

impl StatusKind {
    /// Unicode icon for TTY output.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Installed => "+",
            Self::Failed => "✗",
            Self::Skipped => "○",
            Self::Missing => "◌",
            Self::Interrupted => "⊘",
        }
    }

    /// Bracketed text for non-TTY output.
    pub fn bracketed(self) -> &'static str {
        match self {
            Self::Success => "[ok]",
            Self::Installed => "[new]",
            Self::Failed => "[FAIL]",
            Self::Skipped => "[skip]",
            Self::Missing => "[missing]",
            Self::Interrupted => "[interrupted]",
        }
    }

    /// Styled icon string using the given theme.
    pub fn styled(self, theme: &Theme) -> String {
        let icon = self.icon();
        match self {
            Self::Success | Self::Installed => theme.success.apply_to(icon).to_string(),
            Self::Failed => theme.error.apply_to(icon).to_string(),
            Self::Skipped => theme.dim.apply_to(icon).to_string(),
            Self::Missing | Self::Interrupted => theme.warning.apply_to(icon).to_string(),
        }
    }

    /// Status line for a terminal: styled icon + message.
    pub fn format(self, theme: &Theme, msg: &str) -> String {
        format!("{} {}", self.styled(theme), msg)
    }

    /// Status line for logs: bracketed + message.
    pub fn format_plain(self, msg: &str) -> String {
        format!("{} {}", self.bracketed(), msg)
    }
}

impl From<Outcome> for StatusKind {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::AlreadyPresent => Self::Success,
            Outcome::Installed => Self::Installed,
            Outcome::Failed => Self::Failed,
            Outcome::SkippedNoBackend => Self::Skipped,
            Outcome::Missing => Self::Missing,
            Outcome::Interrupted => Self::Interrupted,
        }
    }
}
