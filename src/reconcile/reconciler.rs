//! Reconciliation of a single entry.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::BackendSet;
use crate::catalogue::{Installer, ToolEntry};
use crate::detect::{self, Detection};
use crate::host::{HostProbe, InstallOutcome, InstallRequest};
use crate::shell::CancelToken;

use super::result::{FailureKind, Outcome, ReconcileResult};

/// Whether pending entries are installed or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Install,
    Check,
}

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub mode: Mode,
    /// Worker threads for detection and installs.
    pub jobs: usize,
    /// Per-install timeout.
    pub timeout: Option<Duration>,
    /// Time an in-flight install gets to finish after cancellation.
    pub grace: Duration,
    /// Prefix system package manager commands with `sudo`.
    pub sudo: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Install,
            jobs: 4,
            timeout: Some(Duration::from_secs(900)),
            grace: Duration::from_secs(10),
            sudo: false,
        }
    }
}

/// Where an entry stands after detection and backend selection.
#[derive(Debug)]
pub enum Survey<'e> {
    /// Nothing left to do: already present, skipped, or missing in check mode.
    Settled(ReconcileResult),
    /// Needs an install through this installer.
    Pending {
        installer: &'e Installer,
        elapsed: Duration,
    },
}

/// Runs detect, backend selection and install for single entries.
pub struct Reconciler<'a> {
    host: &'a dyn HostProbe,
    backends: &'a BackendSet,
    options: &'a ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        host: &'a dyn HostProbe,
        backends: &'a BackendSet,
        options: &'a ReconcileOptions,
    ) -> Self {
        Self {
            host,
            backends,
            options,
        }
    }

    pub fn options(&self) -> &ReconcileOptions {
        self.options
    }

    /// Obtain sudo credentials up front when any of `pending` will run
    /// under `sudo`. Returns false if they are needed and unavailable.
    pub fn authorize<'e>(&self, mut pending: impl Iterator<Item = &'e Installer>) -> bool {
        if !self.options.sudo || !pending.any(Installer::uses_sudo) {
            return true;
        }
        debug!("requesting sudo credentials");
        self.host.authorize_sudo()
    }

    /// Run an entry's detect check. A check that crashes counts as absent.
    pub fn detect(&self, entry: &ToolEntry) -> Detection {
        match detect::evaluate(&entry.detect, self.host) {
            Ok(detection) => detection,
            Err(e) => {
                warn!("{}: {}", entry.name, e);
                Detection::absent(e.to_string())
            }
        }
    }

    /// Detect and select a backend, without installing anything.
    pub fn survey<'e>(&self, entry: &'e ToolEntry) -> Survey<'e> {
        let start = Instant::now();
        let detection = self.detect(entry);

        if detection.present {
            debug!("{}: already present", entry.name);
            return Survey::Settled(
                ReconcileResult::new(&entry.name, &entry.category, Outcome::AlreadyPresent)
                    .with_version(detection.version)
                    .with_duration(start.elapsed()),
            );
        }

        let Some(installer) = entry.select_installer(|b| self.backends.contains(b)) else {
            debug!("{}: no available backend", entry.name);
            let wanted = entry
                .backends()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Survey::Settled(
                ReconcileResult::new(&entry.name, &entry.category, Outcome::SkippedNoBackend)
                    .with_version(detection.version)
                    .with_detail(format!("none of [{}] available", wanted))
                    .with_duration(start.elapsed()),
            );
        };

        debug!(
            "{}: absent ({}), would use {}",
            entry.name,
            detection.reason.as_deref().unwrap_or("not detected"),
            installer.backend
        );

        if self.options.mode == Mode::Check {
            return Survey::Settled(
                ReconcileResult::new(&entry.name, &entry.category, Outcome::Missing)
                    .with_backend(installer.backend)
                    .with_version(detection.version)
                    .with_detail(detection.reason.unwrap_or_default())
                    .with_duration(start.elapsed()),
            );
        }

        Survey::Pending {
            installer,
            elapsed: start.elapsed(),
        }
    }

    /// Install an entry through an installer and verify the result.
    pub fn install(
        &self,
        entry: &ToolEntry,
        installer: &Installer,
        cancel: &CancelToken,
    ) -> ReconcileResult {
        let start = Instant::now();
        let backend = installer.backend;
        let command = installer.command(self.options.sudo);

        info!("installing {} via {}", entry.name, backend);

        let request = InstallRequest {
            entry: &entry.name,
            backend,
            command: &command,
            timeout: self.options.timeout,
            grace: self.options.grace,
        };

        let result = match self.host.install(&request, cancel) {
            InstallOutcome::Succeeded => {
                self.host.refresh();
                let detection = self.detect(entry);
                if detection.present {
                    info!("{} installed", entry.name);
                    ReconcileResult::new(&entry.name, &entry.category, Outcome::Installed)
                        .with_version(detection.version)
                } else {
                    warn!("{}: install exited 0 but detect still fails", entry.name);
                    ReconcileResult::failed(
                        &entry.name,
                        &entry.category,
                        FailureKind::PostInstallVerificationFailed,
                    )
                    .with_version(detection.version)
                    .with_detail(detection.reason.unwrap_or_default())
                }
            }
            InstallOutcome::Failed { exit_code, output } => {
                warn!("{}: install failed", entry.name);
                let status = match exit_code {
                    Some(code) => format!("exited with status {}", code),
                    None => "could not be started".to_string(),
                };
                let detail = if output.trim().is_empty() {
                    status
                } else {
                    format!("{}\n{}", status, output.trim_end())
                };
                ReconcileResult::failed(&entry.name, &entry.category, FailureKind::InstallFailed)
                    .with_detail(detail)
            }
            InstallOutcome::TimedOut => {
                warn!("{}: install timed out", entry.name);
                let detail = match self.options.timeout {
                    Some(limit) => format!("timed out after {}s", limit.as_secs()),
                    None => "timed out".to_string(),
                };
                ReconcileResult::failed(&entry.name, &entry.category, FailureKind::TimedOut)
                    .with_detail(detail)
            }
            InstallOutcome::Cancelled => {
                ReconcileResult::failed(&entry.name, &entry.category, FailureKind::Cancelled)
                    .with_detail("cancelled")
            }
        };

        result.with_backend(backend).with_duration(start.elapsed())
    }

    /// Survey and, if needed, install one entry.
    pub fn reconcile(&self, entry: &ToolEntry, cancel: &CancelToken) -> ReconcileResult {
        match self.survey(entry) {
            Survey::Settled(result) => result,
            Survey::Pending { installer, elapsed } => {
                if cancel.is_cancelled() {
                    return interrupted(entry);
                }
                let result = self.install(entry, installer, cancel);
                let total = result.duration + elapsed;
                result.with_duration(total)
            }
        }
    }
}

/// Result for an entry that never ran because of cancellation.
pub fn interrupted(entry: &ToolEntry) -> ReconcileResult {
    ReconcileResult::new(&entry.name, &entry.category, Outcome::Interrupted)
}
