//! Access to host state.
//!
//! Everything the reconciler learns about or does to the machine goes
//! through the [`HostProbe`] trait: finding executables, running detect
//! commands, checking paths and running installs. [`SystemHost`] talks to
//! the real system; [`MockHost`] is an in-memory host for tests.
//!
//! # Modules
//!
//! - [`probe`] - PATH augmentation for per-user install locations
//! - [`system`] - The real host
//! - [`mock`] - Scriptable in-memory host

pub mod mock;
pub mod probe;
pub mod system;

use crate::backend::Backend;
use crate::error::Result;
use crate::shell::CancelToken;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use mock::{MockHost, MockInstall};
pub use system::SystemHost;

/// Output of a detect or version command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutput {
    /// Whether the command exited 0.
    pub success: bool,
    /// Captured stdout followed by stderr.
    ///
    /// Some tools print their version on stderr, so both streams count.
    pub output: String,
}

impl CheckOutput {
    pub fn passed(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// One install to perform.
#[derive(Debug, Clone)]
pub struct InstallRequest<'a> {
    /// Catalogue entry being installed.
    pub entry: &'a str,
    /// Backend performing the install.
    pub backend: Backend,
    /// Fully rendered shell command.
    pub command: &'a str,
    /// Kill the install after this long.
    pub timeout: Option<Duration>,
    /// How long an in-flight install may keep running after cancellation.
    pub grace: Duration,
}

/// How an install ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Exited 0.
    Succeeded,
    /// Non-zero exit, or the command could not be spawned (`exit_code` is
    /// `None` then). `output` holds the diagnostic tail.
    Failed {
        exit_code: Option<i32>,
        output: String,
    },
    /// Killed after exceeding its timeout.
    TimedOut,
    /// Killed after the cancellation grace period.
    Cancelled,
}

/// The host capability the reconciler depends on.
pub trait HostProbe: Send + Sync {
    /// Locate an executable. Names containing `/` are checked as paths.
    fn find_binary(&self, name: &str) -> Option<PathBuf>;

    /// Run a detect or version command.
    ///
    /// `Err` means the check itself could not run, as opposed to running
    /// and failing.
    fn run_check(&self, command: &str) -> Result<CheckOutput>;

    /// Whether a path exists. `~` has already been expanded.
    fn path_exists(&self, path: &Path) -> bool;

    /// Run an install command to completion, timeout or cancellation.
    fn install(&self, request: &InstallRequest<'_>, cancel: &CancelToken) -> InstallOutcome;

    /// Re-read host state that an install may have changed (PATH entries).
    fn refresh(&self) {}

    /// Make sure `sudo -n` will succeed, prompting once if a terminal is
    /// available. Returns false when no credentials could be obtained.
    fn authorize_sudo(&self) -> bool {
        true
    }
}
