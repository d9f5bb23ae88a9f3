//! Shell command execution.
//!
//! Every command runs under `sh -c` in its own process group so that a
//! timeout or cancellation can take down the whole pipeline
//! (`curl ... | sh` spawns grandchildren that a plain `kill` would orphan).

use crate::error::{DevtoolsError, Result};
use std::collections::HashMap;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::cancel::CancelToken;

/// How often a running child is polled for exit, timeout and cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long output pipes may stay open after the child is gone. A
/// grandchild that left the process group (`setsid`, a daemon) can hold
/// them indefinitely.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// The command was killed after exceeding its timeout.
    pub timed_out: bool,

    /// The command was killed because the run was cancelled.
    pub cancelled: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
            timed_out: false,
            cancelled: false,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
            timed_out: false,
            cancelled: false,
        }
    }

    /// The last `max_lines` lines of combined output, stderr first.
    ///
    /// Used as the diagnostic attached to a failed install.
    pub fn output_tail(&self, max_lines: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let lines: Vec<&str> = source.trim_end().lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<std::path::PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Kill the command after this long (None = no timeout).
    pub timeout: Option<Duration>,

    /// How long an in-flight command may keep running after cancellation.
    pub grace: Duration,
}

/// Execute a shell command, capturing its output.
///
/// Returns `Err` only when the shell itself cannot be spawned. A non-zero
/// exit, a timeout and a cancellation are all reported through the
/// returned [`CommandResult`].
pub fn execute(
    command: &str,
    options: &CommandOptions,
    cancel: Option<&CancelToken>,
) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(shell_program());
    cmd.arg(shell_flag());
    cmd.arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("failed to spawn '{}': {}", command, e);
        DevtoolsError::CommandFailed {
            command: command.to_string(),
            code: None,
        }
    })?;

    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let mut timed_out = false;
    let mut cancelled = false;
    let mut cancel_seen: Option<Instant> = None;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("failed waiting on '{}': {}", command, e);
                kill_tree(&mut child);
                break child.wait().ok();
            }
        }

        if let Some(limit) = options.timeout {
            if start.elapsed() >= limit {
                tracing::debug!("'{}' exceeded timeout of {:?}", command, limit);
                timed_out = true;
                kill_tree(&mut child);
                break child.wait().ok();
            }
        }

        if let Some(token) = cancel {
            if token.is_cancelled() {
                let seen = *cancel_seen.get_or_insert_with(Instant::now);
                if seen.elapsed() >= options.grace {
                    tracing::debug!("'{}' killed after cancellation grace period", command);
                    cancelled = true;
                    kill_tree(&mut child);
                    break child.wait().ok();
                }
            }
        }

        thread::sleep(POLL_INTERVAL);
    };

    let drain_deadline = Instant::now() + DRAIN_TIMEOUT;
    let stdout = stdout_handle
        .map(|r| r.finish(drain_deadline))
        .unwrap_or_default();
    let stderr = stderr_handle
        .map(|r| r.finish(drain_deadline))
        .unwrap_or_default();

    let duration = start.elapsed();

    match status {
        Some(status) if status.success() && !timed_out && !cancelled => {
            Ok(CommandResult::success(stdout, stderr, duration))
        }
        status => {
            let mut result =
                CommandResult::failure(status.and_then(|s| s.code()), stdout, stderr, duration);
            result.timed_out = timed_out;
            result.cancelled = cancelled;
            Ok(result)
        }
    }
}

/// Execute a command and return success/failure.
pub fn execute_check(command: &str, cwd: Option<&Path>) -> bool {
    let options = CommandOptions {
        cwd: cwd.map(|p| p.to_path_buf()),
        ..Default::default()
    };

    execute(command, &options, None)
        .map(|r| r.success)
        .unwrap_or(false)
}

/// Output captured by a background thread, readable before the pipe closes.
struct PipeReader {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl PipeReader {
    /// Wait for the pipe to close, at most until `deadline`, and return
    /// whatever was read by then.
    fn finish(self, deadline: Instant) -> String {
        let wait = deadline.saturating_duration_since(Instant::now());
        if self.done.recv_timeout(wait).is_err() {
            tracing::debug!("output pipe still held open; keeping partial output");
        }
        let bytes = self.buf.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> PipeReader {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::channel();
    let shared = Arc::clone(&buf);

    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if let Ok(mut out) = shared.lock() {
                        out.extend_from_slice(&chunk[..n]);
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
        let _ = tx.send(());
    });

    PipeReader { buf, done }
}

/// Kill the child and, on unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = i32::try_from(child.id()) {
            // SAFETY: kill(2) with a negative pid signals the process group
            // created for this child by `process_group(0)`.
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

fn shell_program() -> &'static str {
    if cfg!(target_os = "windows") {
        "cmd.exe"
    } else {
        "/bin/sh"
    }
}

/// Get the flag to pass commands to the shell.
///
/// Plain `-c` rather than a login/interactive shell: installs run in
/// parallel without a TTY, and PATH is supplied explicitly by the host
/// probe.
fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}
