//! Scriptable in-memory host for testing.
//!
//! A [`MockHost`] holds a set of "installed" binaries, passing commands and
//! existing files. Installs are scripted per entry with [`MockInstall`]; a
//! successful install can add binaries, commands or files so the
//! post-install re-detect sees them.
//!
//! ```
//! use devtools::host::{HostProbe, MockHost, MockInstall};
//!
//! let host = MockHost::new()
//!     .with_binary("apt-get", None)
//!     .with_binary("dpkg", None)
//!     .on_install("just", MockInstall::provides_binary("just", "just 1.36.0"));
//!
//! assert!(host.find_binary("dpkg").is_some());
//! assert!(host.find_binary("just").is_none());
//! ```

use super::{CheckOutput, HostProbe, InstallOutcome, InstallRequest};
use crate::backend::Backend;
use crate::error::{DevtoolsError, Result};
use crate::shell::CancelToken;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Host state an install can create.
#[derive(Debug, Clone)]
pub enum MockEffect {
    /// Binary on PATH; the string is what its version command prints.
    Binary(String, String),
    /// Check command that now passes.
    Command(String),
    /// Path that now exists.
    File(PathBuf),
}

/// Scripted behaviour of one entry's install.
#[derive(Debug, Clone)]
pub enum MockInstall {
    /// Exit 0 and apply the effects.
    Succeeds(Vec<MockEffect>),
    /// Exit non-zero with the given output.
    Fails { exit_code: i32, output: String },
    /// Never finish on its own; ends by timeout or cancellation.
    Hangs,
}

impl MockInstall {
    /// Succeed and make a binary available.
    pub fn provides_binary(name: &str, version_output: &str) -> Self {
        MockInstall::Succeeds(vec![MockEffect::Binary(
            name.to_string(),
            version_output.to_string(),
        )])
    }

    /// Exit 0 without changing anything.
    pub fn succeeds_without_effect() -> Self {
        MockInstall::Succeeds(Vec::new())
    }

    /// Exit 1 with the given stderr.
    pub fn fails(output: &str) -> Self {
        MockInstall::Fails {
            exit_code: 1,
            output: output.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    binaries: HashMap<String, String>,
    passing: HashSet<String>,
    crashing: HashSet<String>,
    files: HashSet<PathBuf>,
    installs: HashMap<String, MockInstall>,
    calls: Vec<(String, Backend, String)>,
    active: HashMap<Backend, usize>,
    max_active: HashMap<Backend, usize>,
    active_total: usize,
    max_active_total: usize,
    refreshes: usize,
    sudo_denied: bool,
    sudo_requests: usize,
}

/// In-memory [`HostProbe`].
#[derive(Debug, Default)]
pub struct MockHost {
    state: Mutex<MockState>,
    install_delay: Duration,
}

impl MockHost {
    /// An empty host: no binaries, nothing passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binary. `version_output` is what any version command prints.
    pub fn with_binary(self, name: &str, version_output: Option<&str>) -> Self {
        self.lock()
            .binaries
            .insert(name.to_string(), version_output.unwrap_or_default().to_string());
        self
    }

    /// Make a check command pass.
    pub fn with_passing_command(self, command: &str) -> Self {
        self.lock().passing.insert(command.to_string());
        self
    }

    /// Make a check command fail to run at all.
    pub fn with_crashing_command(self, command: &str) -> Self {
        self.lock().crashing.insert(command.to_string());
        self
    }

    /// Add an existing path.
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.lock().files.insert(path.into());
        self
    }

    /// Script the install of an entry. Unscripted installs fail.
    pub fn on_install(self, entry: &str, behaviour: MockInstall) -> Self {
        self.lock().installs.insert(entry.to_string(), behaviour);
        self
    }

    /// Make every install take at least this long.
    pub fn with_install_delay(mut self, delay: Duration) -> Self {
        self.install_delay = delay;
        self
    }

    /// Make [`HostProbe::authorize_sudo`] fail.
    pub fn without_sudo(self) -> Self {
        self.lock().sudo_denied = true;
        self
    }

    /// Number of [`HostProbe::authorize_sudo`] calls.
    pub fn sudo_requests(&self) -> usize {
        self.lock().sudo_requests
    }

    /// Entries installed so far, in call order.
    pub fn installed_entries(&self) -> Vec<String> {
        self.lock().calls.iter().map(|(e, _, _)| e.clone()).collect()
    }

    /// Commands run for installs so far, in call order.
    pub fn install_commands(&self) -> Vec<String> {
        self.lock().calls.iter().map(|(_, _, c)| c.clone()).collect()
    }

    /// Number of install calls for one entry.
    pub fn install_count(&self, entry: &str) -> usize {
        self.lock().calls.iter().filter(|(e, _, _)| e == entry).count()
    }

    /// Highest number of simultaneous installs through one backend.
    pub fn max_concurrent(&self, backend: Backend) -> usize {
        self.lock().max_active.get(&backend).copied().unwrap_or(0)
    }

    /// Highest number of simultaneous installs overall.
    pub fn max_concurrent_total(&self) -> usize {
        self.lock().max_active_total
    }

    /// Number of [`HostProbe::refresh`] calls.
    pub fn refresh_count(&self) -> usize {
        self.lock().refreshes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, request: &InstallRequest<'_>) -> MockInstall {
        let mut state = self.lock();
        state.calls.push((
            request.entry.to_string(),
            request.backend,
            request.command.to_string(),
        ));

        let active = state.active.entry(request.backend).or_insert(0);
        *active += 1;
        let active = *active;
        let max = state.max_active.entry(request.backend).or_insert(0);
        *max = (*max).max(active);
        state.active_total += 1;
        state.max_active_total = state.max_active_total.max(state.active_total);

        state
            .installs
            .get(request.entry)
            .cloned()
            .unwrap_or_else(|| MockInstall::fails("no install scripted"))
    }

    fn end(&self, backend: Backend) {
        let mut state = self.lock();
        if let Some(active) = state.active.get_mut(&backend) {
            *active = active.saturating_sub(1);
        }
        state.active_total = state.active_total.saturating_sub(1);
    }

    fn apply(&self, effects: Vec<MockEffect>) {
        let mut state = self.lock();
        for effect in effects {
            match effect {
                MockEffect::Binary(name, version) => {
                    state.binaries.insert(name, version);
                }
                MockEffect::Command(cmd) => {
                    state.passing.insert(cmd);
                }
                MockEffect::File(path) => {
                    state.files.insert(path);
                }
            }
        }
    }

    /// Wait like a hung process: until timeout, or cancellation plus grace.
    fn hang(request: &InstallRequest<'_>, cancel: &CancelToken) -> InstallOutcome {
        let start = Instant::now();
        let mut cancel_seen: Option<Instant> = None;
        loop {
            if request.timeout.is_some_and(|t| start.elapsed() >= t) {
                return InstallOutcome::TimedOut;
            }
            if cancel.is_cancelled() {
                let seen = *cancel_seen.get_or_insert_with(Instant::now);
                if seen.elapsed() >= request.grace {
                    return InstallOutcome::Cancelled;
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl HostProbe for MockHost {
    fn find_binary(&self, name: &str) -> Option<PathBuf> {
        self.lock()
            .binaries
            .contains_key(name)
            .then(|| PathBuf::from("/mock/bin").join(name))
    }

    fn run_check(&self, command: &str) -> Result<CheckOutput> {
        let state = self.lock();
        if state.crashing.contains(command) {
            return Err(DevtoolsError::CommandFailed {
                command: command.to_string(),
                code: None,
            });
        }
        if state.passing.contains(command) {
            return Ok(CheckOutput::passed(""));
        }

        // Version commands: `<binary> ...` prints that binary's version.
        let program = command.split_whitespace().next().unwrap_or_default();
        match state.binaries.get(program) {
            Some(version) => Ok(CheckOutput::passed(version.clone())),
            None => Ok(CheckOutput::failed(format!("{}: not found", program))),
        }
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.lock().files.contains(path)
    }

    fn install(&self, request: &InstallRequest<'_>, cancel: &CancelToken) -> InstallOutcome {
        let behaviour = self.begin(request);
        if !self.install_delay.is_zero() {
            thread::sleep(self.install_delay);
        }

        let outcome = match behaviour {
            MockInstall::Succeeds(effects) => {
                self.apply(effects);
                InstallOutcome::Succeeded
            }
            MockInstall::Fails { exit_code, output } => InstallOutcome::Failed {
                exit_code: Some(exit_code),
                output,
            },
            MockInstall::Hangs => Self::hang(request, cancel),
        };

        self.end(request.backend);
        outcome
    }

    fn refresh(&self) {
        self.lock().refreshes += 1;
    }

    fn authorize_sudo(&self) -> bool {
        let mut state = self.lock();
        state.sudo_requests += 1;
        !state.sudo_denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(entry: &'a str, backend: Backend) -> InstallRequest<'a> {
        InstallRequest {
            entry,
            backend,
            command: "mock install",
            timeout: Some(Duration::from_millis(100)),
            grace: Duration::from_millis(10),
        }
    }

    #[test]
    fn binaries_are_found_and_report_versions() {
        let host = MockHost::new().with_binary("just", Some("just 1.36.0"));
        assert!(host.find_binary("just").is_some());
        assert_eq!(host.run_check("just --version").unwrap().output, "just 1.36.0");
        assert!(!host.run_check("meson --version").unwrap().success);
    }

    #[test]
    fn crashing_command_is_error() {
        let host = MockHost::new().with_crashing_command("boom");
        assert!(host.run_check("boom").is_err());
    }

    #[test]
    fn successful_install_applies_effects() {
        let host = MockHost::new().on_install("just", MockInstall::provides_binary("just", "1.0"));
        let outcome = host.install(&request("just", Backend::Apt), &CancelToken::new());
        assert_eq!(outcome, InstallOutcome::Succeeded);
        assert!(host.find_binary("just").is_some());
        assert_eq!(host.install_count("just"), 1);
    }

    #[test]
    fn unscripted_install_fails() {
        let host = MockHost::new();
        let outcome = host.install(&request("x", Backend::Cargo), &CancelToken::new());
        assert!(matches!(outcome, InstallOutcome::Failed { .. }));
    }

    #[test]
    fn hanging_install_times_out() {
        let host = MockHost::new().on_install("x", MockInstall::Hangs);
        let outcome = host.install(&request("x", Backend::Cargo), &CancelToken::new());
        assert_eq!(outcome, InstallOutcome::TimedOut);
    }

    #[test]
    fn hanging_install_is_cancelled() {
        let host = MockHost::new().on_install("x", MockInstall::Hangs);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut req = request("x", Backend::Cargo);
        req.timeout = None;
        assert_eq!(host.install(&req, &cancel), InstallOutcome::Cancelled);
    }
}
