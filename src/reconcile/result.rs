//! Per-entry reconciliation results.

use crate::backend::Backend;
use crate::detect::Version;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Final state of one catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Detect passed before any action.
    AlreadyPresent,
    /// Installed and verified.
    Installed,
    /// Install or verification failed; see [`FailureKind`].
    Failed,
    /// No installer uses an available backend.
    SkippedNoBackend,
    /// Absent in check mode; nothing was installed.
    Missing,
    /// Never launched because the run was cancelled.
    Interrupted,
}

impl Outcome {
    /// Every outcome, in report order.
    pub const ALL: [Outcome; 6] = [
        Outcome::AlreadyPresent,
        Outcome::Installed,
        Outcome::Failed,
        Outcome::SkippedNoBackend,
        Outcome::Missing,
        Outcome::Interrupted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::AlreadyPresent => "already-present",
            Outcome::Installed => "installed",
            Outcome::Failed => "failed",
            Outcome::SkippedNoBackend => "skipped-no-backend",
            Outcome::Missing => "missing",
            Outcome::Interrupted => "interrupted",
        }
    }

    /// The tool is in place after this run.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Outcome::AlreadyPresent | Outcome::Installed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a `failed` entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Non-zero exit or spawn error.
    InstallFailed,
    /// Killed after exceeding the install timeout.
    TimedOut,
    /// Killed after the cancellation grace period.
    Cancelled,
    /// Install exited 0 but detect still fails.
    PostInstallVerificationFailed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InstallFailed => "install failed",
            FailureKind::TimedOut => "timed out",
            FailureKind::Cancelled => "cancelled",
            FailureKind::PostInstallVerificationFailed => "post-install verification failed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reconciling one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileResult {
    pub name: String,
    pub category: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Backend used, or the one that would be used in check mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    /// Version detected (after install when one ran).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    /// Diagnostic text: failure output, detect reason, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl ReconcileResult {
    pub fn new(name: impl Into<String>, category: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            outcome,
            failure: None,
            backend: None,
            version: None,
            detail: None,
            duration: Duration::ZERO,
        }
    }

    pub fn failed(name: impl Into<String>, category: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::new(name, category, Outcome::Failed)
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_version(mut self, version: Option<Version>) -> Self {
        self.version = version;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if !detail.is_empty() {
            self.detail = Some(detail);
        }
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
