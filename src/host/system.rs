//! The real host.

use super::probe::{is_executable, resolve_tool_path, PathProbe};
use super::{CheckOutput, HostProbe, InstallOutcome, InstallRequest};
use crate::error::Result;
use crate::shell::{execute, CancelToken, CommandOptions};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::RwLock;
use std::time::Duration;

/// Detect commands should be quick; anything slower is treated as hung.
const CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Lines of install output kept for failure reports.
const TAIL_LINES: usize = 20;

/// Host backed by the running system.
#[derive(Debug)]
pub struct SystemHost {
    probe: RwLock<PathProbe>,
    cwd: Option<PathBuf>,
}

impl SystemHost {
    /// Probe the environment. Commands run in `cwd` when given.
    pub fn new(cwd: Option<PathBuf>) -> Self {
        Self {
            probe: RwLock::new(PathProbe::run()),
            cwd,
        }
    }

    fn path_entries(&self) -> Vec<PathBuf> {
        self.probe
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .full_path()
    }

    fn options(&self, timeout: Option<Duration>, grace: Duration) -> CommandOptions {
        let path = self
            .probe
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .path_var();

        let mut env = HashMap::new();
        env.insert("PATH".to_string(), path.to_string_lossy().into_owned());

        CommandOptions {
            cwd: self.cwd.clone(),
            env,
            timeout,
            grace,
        }
    }
}

impl HostProbe for SystemHost {
    fn find_binary(&self, name: &str) -> Option<PathBuf> {
        if name.contains('/') {
            let path = PathBuf::from(name);
            return (path.is_file() && is_executable(&path)).then_some(path);
        }
        resolve_tool_path(name, &self.path_entries())
    }

    fn run_check(&self, command: &str) -> Result<CheckOutput> {
        let result = execute(
            command,
            &self.options(Some(CHECK_TIMEOUT), Duration::ZERO),
            None,
        )?;

        if result.timed_out {
            tracing::warn!("check '{}' timed out after {:?}", command, CHECK_TIMEOUT);
        }

        let mut output = result.stdout;
        if !result.stderr.is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&result.stderr);
        }

        Ok(CheckOutput {
            success: result.success,
            output,
        })
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn install(&self, request: &InstallRequest<'_>, cancel: &CancelToken) -> InstallOutcome {
        tracing::debug!("running '{}' for {}", request.command, request.entry);

        let options = self.options(request.timeout, request.grace);
        match execute(request.command, &options, Some(cancel)) {
            Ok(result) if result.timed_out => InstallOutcome::TimedOut,
            Ok(result) if result.cancelled => InstallOutcome::Cancelled,
            Ok(result) if result.success => InstallOutcome::Succeeded,
            Ok(result) => InstallOutcome::Failed {
                exit_code: result.exit_code,
                output: result.output_tail(TAIL_LINES),
            },
            Err(e) => InstallOutcome::Failed {
                exit_code: None,
                output: e.to_string(),
            },
        }
    }

    fn refresh(&self) {
        let fresh = PathProbe::run();
        let mut probe = self.probe.write().unwrap_or_else(|e| e.into_inner());
        *probe = fresh;
    }

    fn authorize_sudo(&self) -> bool {
        let cached = Command::new("sudo")
            .args(["-n", "true"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if cached.is_ok_and(|s| s.success()) {
            return true;
        }

        if !std::io::stdin().is_terminal() {
            tracing::debug!("no terminal to ask for sudo credentials");
            return false;
        }

        // Foreground, inherited stdio: sudo reads the password from the tty.
        match Command::new("sudo").arg("-v").status() {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!("failed to run sudo: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_sh() {
        let host = SystemHost::new(None);
        assert!(host.find_binary("sh").is_some());
    }

    #[test]
    fn missing_binary_is_none() {
        let host = SystemHost::new(None);
        assert!(host.find_binary("definitely-not-a-real-tool-xyz").is_none());
    }

    #[test]
    fn absolute_binary_path() {
        let host = SystemHost::new(None);
        assert!(host.find_binary("/bin/sh").is_some());
        assert!(host.find_binary("/nonexistent/tool").is_none());
    }

    #[test]
    fn run_check_reports_exit_status() {
        let host = SystemHost::new(None);
        assert!(host.run_check("true").unwrap().success);
        assert!(!host.run_check("false").unwrap().success);
    }

    #[test]
    fn run_check_captures_stderr() {
        let host = SystemHost::new(None);
        let out = host.run_check("echo out; echo version 2.3.4 >&2").unwrap();
        assert!(out.output.contains("out"));
        assert!(out.output.contains("2.3.4"));
    }

    #[test]
    fn install_success_and_failure() {
        let temp = TempDir::new().unwrap();
        let host = SystemHost::new(Some(temp.path().to_path_buf()));
        let cancel = CancelToken::new();

        let ok = InstallRequest {
            entry: "marker",
            backend: crate::backend::Backend::Script,
            command: "touch marker",
            timeout: Some(Duration::from_secs(10)),
            grace: Duration::ZERO,
        };
        assert_eq!(host.install(&ok, &cancel), InstallOutcome::Succeeded);
        assert!(temp.path().join("marker").exists());

        let bad = InstallRequest {
            command: "echo boom >&2; exit 3",
            ..ok
        };
        match host.install(&bad, &cancel) {
            InstallOutcome::Failed { exit_code, output } => {
                assert_eq!(exit_code, Some(3));
                assert!(output.contains("boom"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn install_times_out() {
        let host = SystemHost::new(None);
        let request = InstallRequest {
            entry: "slow",
            backend: crate::backend::Backend::Script,
            command: "sleep 30",
            timeout: Some(Duration::from_millis(200)),
            grace: Duration::ZERO,
        };
        assert_eq!(
            host.install(&request, &CancelToken::new()),
            InstallOutcome::TimedOut
        );
    }

    #[test]
    fn install_cancelled_after_grace() {
        let host = SystemHost::new(None);
        let cancel = CancelToken::new();
        cancel.cancel();
        let request = InstallRequest {
            entry: "slow",
            backend: crate::backend::Backend::Script,
            command: "sleep 30",
            timeout: None,
            grace: Duration::from_millis(100),
        };
        assert_eq!(host.install(&request, &cancel), InstallOutcome::Cancelled);
    }
}
