//! Configuration schema.
//!
//! Every config layer has the same flat shape:
//!
//! ```yaml
//! jobs: 8
//! timeout_secs: 600
//! grace_secs: 10
//! strict: false
//! sudo: auto
//! disabled_backends: [flatpak]
//! catalogues:
//!   - .devtools/extra-tools.yml
//! ```

use crate::backend::Backend;
use crate::shell::platform::expand_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// When system installs are prefixed with `sudo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SudoPolicy {
    /// Unless already running as root.
    #[default]
    Auto,
    Always,
    Never,
}

impl SudoPolicy {
    /// Whether to prefix, given whether the process is already root.
    pub fn applies(&self, elevated: bool) -> bool {
        match self {
            SudoPolicy::Auto => !elevated,
            SudoPolicy::Always => true,
            SudoPolicy::Never => false,
        }
    }
}

/// Merged settings from every config layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Worker threads for detection and installs.
    pub jobs: usize,

    /// Per-install timeout in seconds.
    pub timeout_secs: u64,

    /// Seconds an in-flight install may keep running after Ctrl-C.
    pub grace_secs: u64,

    /// Treat `skipped-no-backend` as a failure.
    pub strict: bool,

    /// Backends never to use, even when present.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_backends: Vec<Backend>,

    /// Extra catalogue files, relative to the project root.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalogues: Vec<PathBuf>,

    /// `sudo` prefix for system package managers.
    pub sudo: SudoPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jobs: 4,
            timeout_secs: 900,
            grace_secs: 10,
            strict: false,
            disabled_backends: Vec::new(),
            catalogues: Vec::new(),
            sudo: SudoPolicy::Auto,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    /// Configured catalogue files as absolute paths.
    pub fn catalogue_paths(&self, project_root: &Path) -> Vec<PathBuf> {
        self.catalogues
            .iter()
            .map(|p| {
                let expanded = expand_home(&p.to_string_lossy());
                if expanded.is_absolute() {
                    expanded
                } else {
                    project_root.join(expanded)
                }
            })
            .collect()
    }
}
