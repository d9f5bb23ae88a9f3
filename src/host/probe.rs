//! PATH discovery for tools installed by language package managers.
//!
//! `cargo install`, `pipx`, `go install` and the rustup installer drop
//! binaries into per-user directories (`~/.cargo/bin`, `~/.local/bin`,
//! `~/go/bin`) that are often missing from the PATH of a non-login shell.
//! Without them, a tool that was just installed fails post-install
//! verification.
//!
//! The [`PathProbe`] finds those directories, honouring relocation variables
//! such as `CARGO_HOME`, and produces an augmented PATH used for every
//! lookup and subprocess.
//!
//! # Example
//!
//! ```no_run
//! use devtools::host::probe::PathProbe;
//!
//! let probe = PathProbe::run();
//! for path in probe.augmented_path() {
//!     println!("Additional PATH entry: {}", path.display());
//! }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Definition of a per-user install location to probe for.
struct LocationDef {
    env_var: Option<&'static str>,
    default_paths: &'static [&'static str],
    bin_subpath: &'static str,
}

/// Known per-user install locations.
const LOCATION_DEFS: &[LocationDef] = &[
    // cargo install, rustup
    LocationDef {
        env_var: Some("CARGO_HOME"),
        default_paths: &[".cargo"],
        bin_subpath: "bin",
    },
    // go install
    LocationDef {
        env_var: Some("GOBIN"),
        default_paths: &[],
        bin_subpath: "",
    },
    LocationDef {
        env_var: Some("GOPATH"),
        default_paths: &["go"],
        bin_subpath: "bin",
    },
    // pipx, pip --user, distrobox --prefix ~/.local
    LocationDef {
        env_var: None,
        default_paths: &[".local"],
        bin_subpath: "bin",
    },
    // npm with prefix=~/.npm-global
    LocationDef {
        env_var: Some("NPM_CONFIG_PREFIX"),
        default_paths: &[".npm-global"],
        bin_subpath: "bin",
    },
];

/// Result of probing for extra PATH entries.
#[derive(Debug, Clone, Default)]
pub struct PathProbe {
    augmented_path: Vec<PathBuf>,
    system_path: Vec<PathBuf>,
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command; `which` behavior varies across systems and
/// is sometimes a shell builtin with inconsistent error handling.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

impl PathProbe {
    /// Probe using actual environment variables and filesystem.
    pub fn run() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        Self::run_with_env(&home, parse_system_path(), |key: &str| std::env::var(key))
    }

    /// Probe with an explicit home, system PATH and env lookup.
    ///
    /// This allows testing without modifying actual environment variables.
    pub fn run_with_env<F>(home: &Path, system_path: Vec<PathBuf>, env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let mut augmented_path = Vec::new();

        for def in LOCATION_DEFS {
            if let Some(dir) = probe_location(home, def, &env_fn) {
                if !system_path.contains(&dir) && !augmented_path.contains(&dir) {
                    augmented_path.push(dir);
                }
            }
        }

        for prefix in homebrew_default_prefixes() {
            let bin = prefix.join("bin");
            let brew = bin.join("brew");
            if brew.is_file()
                && is_executable(&brew)
                && !system_path.contains(&bin)
                && !augmented_path.contains(&bin)
            {
                augmented_path.push(bin);
            }
        }

        Self {
            augmented_path,
            system_path,
        }
    }

    /// Build a probe from explicit parts.
    pub fn from_parts(augmented_path: Vec<PathBuf>, system_path: Vec<PathBuf>) -> Self {
        Self {
            augmented_path,
            system_path,
        }
    }

    /// Get the additional PATH entries discovered by the probe.
    pub fn augmented_path(&self) -> &[PathBuf] {
        &self.augmented_path
    }

    /// Combined PATH: system entries first, augmented entries appended.
    ///
    /// Appending keeps distro binaries authoritative while still finding
    /// tools that only exist in per-user locations.
    pub fn full_path(&self) -> Vec<PathBuf> {
        let mut result = self.system_path.clone();
        for p in &self.augmented_path {
            if !result.contains(p) {
                result.push(p.clone());
            }
        }
        result
    }

    /// The combined PATH as a value for a child's `PATH` variable.
    pub fn path_var(&self) -> OsString {
        std::env::join_paths(self.full_path()).unwrap_or_default()
    }
}

/// Probe one location, checking the env var first then default paths
/// relative to home. Only existing directories are returned.
fn probe_location<F>(home: &Path, def: &LocationDef, env_fn: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    if let Some(var) = def.env_var {
        if let Ok(val) = env_fn(var) {
            // GOPATH may be a list; the first element receives `go install`.
            let first = std::env::split_paths(&val).next()?;
            let dir = join_sub(&first, def.bin_subpath);
            if dir.is_dir() {
                return Some(dir);
            }
        }
    }

    def.default_paths
        .iter()
        .map(|default| join_sub(&home.join(default), def.bin_subpath))
        .find(|dir| dir.is_dir())
}

fn join_sub(base: &Path, sub: &str) -> PathBuf {
    if sub.is_empty() {
        base.to_path_buf()
    } else {
        base.join(sub)
    }
}

/// Default Homebrew prefix paths to check (absolute, not relative to home).
fn homebrew_default_prefixes() -> Vec<PathBuf> {
    let mut prefixes = Vec::new();
    if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            prefixes.push(PathBuf::from("/opt/homebrew"));
        } else {
            prefixes.push(PathBuf::from("/usr/local"));
        }
    } else if cfg!(target_os = "linux") {
        prefixes.push(PathBuf::from("/home/linuxbrew/.linuxbrew"));
    }
    prefixes
}
