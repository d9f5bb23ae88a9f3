//! Catalogue entry types.

use crate::backend::Backend;
use crate::detect::version::Version;

/// One tool the workspace wants on the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolEntry {
    /// Unique identifier (e.g., "just", "libwayland-dev").
    pub name: String,
    /// Free-text grouping label.
    pub category: String,
    /// One-line description shown by `devtools list`.
    pub description: Option<String>,
    /// How to tell whether the tool is already present.
    pub detect: Detect,
    /// Install actions in preference order. Never empty.
    pub installers: Vec<Installer>,
}

impl ToolEntry {
    /// First installer whose backend passes the predicate.
    pub fn select_installer<F>(&self, available: F) -> Option<&Installer>
    where
        F: Fn(Backend) -> bool,
    {
        self.installers.iter().find(|i| available(i.backend))
    }

    /// Backends this entry can be installed with, in preference order.
    pub fn backends(&self) -> impl Iterator<Item = Backend> + '_ {
        self.installers.iter().map(|i| i.backend)
    }
}

/// A presence check.
#[derive(Debug, Clone, PartialEq)]
pub enum Detect {
    /// Executable on PATH, optionally at a minimum version.
    Binary {
        /// Executable name.
        name: String,
        /// Lowest acceptable version.
        min_version: Option<Version>,
        /// Command printing the version (default: `<name> --version`).
        version_command: Option<String>,
    },

    /// Shell command that must exit 0.
    Command(String),

    /// Path that must exist (`~` expands to home).
    File(String),

    /// First passing sub-check wins.
    Any(Vec<Detect>),
}

impl Detect {
    /// Binary check with no version constraint.
    pub fn binary(name: impl Into<String>) -> Self {
        Detect::Binary {
            name: name.into(),
            min_version: None,
            version_command: None,
        }
    }

    /// Short human description for listings.
    pub fn describe(&self) -> String {
        match self {
            Detect::Binary {
                name,
                min_version: Some(min),
                ..
            } => format!("{} >= {}", name, min),
            Detect::Binary { name, .. } => name.clone(),
            Detect::Command(cmd) => format!("`{}`", cmd),
            Detect::File(path) => path.clone(),
            Detect::Any(checks) => checks
                .iter()
                .map(Detect::describe)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// How one backend installs an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Installer {
    pub backend: Backend,
    pub action: InstallAction,
}

/// What to hand the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum InstallAction {
    /// Package names rendered into the backend's install command.
    Packages(Vec<String>),
    /// Explicit shell command, used as-is.
    Command(String),
}

impl Installer {
    /// The shell command this installer runs.
    pub fn command(&self, sudo: bool) -> String {
        match &self.action {
            InstallAction::Packages(packages) => self.backend.install_command(packages, sudo),
            InstallAction::Command(cmd) => cmd.clone(),
        }
    }

    /// Whether [`Installer::command`] adds `sudo` when asked to.
    pub fn uses_sudo(&self) -> bool {
        self.backend.is_system() && matches!(self.action, InstallAction::Packages(_))
    }
}
