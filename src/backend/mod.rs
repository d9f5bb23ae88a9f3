//! Package-manager backends.
//!
//! A [`Backend`] is one installation mechanism (apt, cargo, an ad-hoc shell
//! script, ...). Each backend knows which launcher binaries make it usable
//! and how to turn a package list into an install command.
//!
//! # Modules
//!
//! - [`detector`] - Discover which backends the host provides

pub mod detector;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub use detector::BackendDetector;

/// An installation mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    // System
    Apt,
    Dnf,
    Pacman,
    Zypper,

    // Independent
    Brew,
    Flatpak,
    Cargo,
    Npm,
    Pip,
    Pipx,
    Go,
    Script,
    CurlScript,
}

impl Backend {
    /// Every backend, in declaration order.
    pub const ALL: [Backend; 13] = [
        Backend::Apt,
        Backend::Dnf,
        Backend::Pacman,
        Backend::Zypper,
        Backend::Brew,
        Backend::Flatpak,
        Backend::Cargo,
        Backend::Npm,
        Backend::Pip,
        Backend::Pipx,
        Backend::Go,
        Backend::Script,
        Backend::CurlScript,
    ];

    /// Catalogue key for this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Apt => "apt",
            Backend::Dnf => "dnf",
            Backend::Pacman => "pacman",
            Backend::Zypper => "zypper",
            Backend::Brew => "brew",
            Backend::Flatpak => "flatpak",
            Backend::Cargo => "cargo",
            Backend::Npm => "npm",
            Backend::Pip => "pip",
            Backend::Pipx => "pipx",
            Backend::Go => "go",
            Backend::Script => "script",
            Backend::CurlScript => "curl-script",
        }
    }

    /// Binaries that must all be on PATH for this backend to be available.
    pub fn launchers(&self) -> &'static [&'static str] {
        match self {
            Backend::Apt => &["apt-get", "dpkg"],
            Backend::Dnf => &["dnf"],
            Backend::Pacman => &["pacman"],
            Backend::Zypper => &["zypper"],
            Backend::Brew => &["brew"],
            Backend::Flatpak => &["flatpak"],
            Backend::Cargo => &["cargo"],
            Backend::Npm => &["npm"],
            Backend::Pip => &["pip3"],
            Backend::Pipx => &["pipx"],
            Backend::Go => &["go"],
            Backend::Script => &["sh"],
            Backend::CurlScript => &["sh", "curl"],
        }
    }

    /// System package managers hold a host-wide lock, so installs through
    /// the same one must never overlap.
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            Backend::Apt | Backend::Dnf | Backend::Pacman | Backend::Zypper
        )
    }

    /// Whether install values for this backend are shell commands rather
    /// than package names.
    pub fn takes_script(&self) -> bool {
        matches!(self, Backend::Script | Backend::CurlScript)
    }

    /// Render the install command for a package list.
    ///
    /// `sudo` is only applied to system package managers, and never prompts
    /// (`-n`): installs have no terminal to answer on. Script backends
    /// receive the joined packages verbatim, which the catalogue loader
    /// guarantees is a single command.
    pub fn install_command(&self, packages: &[String], sudo: bool) -> String {
        let pkgs = packages.join(" ");
        let prefix = if sudo && self.is_system() {
            "sudo -n "
        } else {
            ""
        };
        match self {
            Backend::Apt => {
                format!("{prefix}env DEBIAN_FRONTEND=noninteractive apt-get install -y {pkgs}")
            }
            Backend::Dnf => format!("{prefix}dnf install -y {pkgs}"),
            Backend::Pacman => format!("{prefix}pacman -S --needed --noconfirm {pkgs}"),
            Backend::Zypper => format!("{prefix}zypper --non-interactive install {pkgs}"),
            Backend::Brew => format!("brew install {pkgs}"),
            Backend::Flatpak => format!("flatpak install -y --noninteractive flathub {pkgs}"),
            Backend::Cargo => format!("cargo install --locked {pkgs}"),
            Backend::Npm => format!("npm install -g {pkgs}"),
            Backend::Pip => format!("pip3 install --user {pkgs}"),
            Backend::Pipx => format!("pipx install {pkgs}"),
            Backend::Go => format!("go install {pkgs}"),
            Backend::Script | Backend::CurlScript => pkgs,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Backend::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == key)
            .ok_or_else(|| format!("unknown backend: {}", s))
    }
}

/// The backends available on this host for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSet {
    backends: BTreeSet<Backend>,
}

impl BackendSet {
    /// An empty set (nothing installable).
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a backend.
    pub fn insert(&mut self, backend: Backend) {
        self.backends.insert(backend);
    }

    /// Remove a backend.
    pub fn remove(&mut self, backend: Backend) {
        self.backends.remove(&backend);
    }

    /// Whether the backend is available.
    pub fn contains(&self, backend: Backend) -> bool {
        self.backends.contains(&backend)
    }

    /// Number of available backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend is available.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Iterate in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = Backend> + '_ {
        self.backends.iter().copied()
    }
}

impl FromIterator<Backend> for BackendSet {
    fn from_iter<I: IntoIterator<Item = Backend>>(iter: I) -> Self {
        Self {
            backends: iter.into_iter().collect(),
        }
    }
}
