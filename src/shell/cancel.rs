//! Cooperative cancellation.
//!
//! A [`CancelToken`] is shared by the scheduler and every running command.
//! Once cancelled, no new installs are launched and in-flight commands are
//! killed after their grace period.
//!
//! [`CancelToken::with_signals`] additionally trips the token on SIGINT or
//! SIGTERM. The first signal only requests cancellation; the handler then
//! restores the default disposition so a second Ctrl-C terminates at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set from the signal handler. Only atomics are touched there.
static SIGNALLED: AtomicBool = AtomicBool::new(false);

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    signal_aware: bool,
}

impl CancelToken {
    /// A token that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is also cancelled by SIGINT/SIGTERM.
    pub fn with_signals() -> Self {
        install_handlers();
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            signal_aware: true,
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || (self.signal_aware && SIGNALLED.load(Ordering::SeqCst))
    }
}

#[cfg(unix)]
extern "C" fn on_signal(sig: libc::c_int) {
    SIGNALLED.store(true, Ordering::SeqCst);
    // SAFETY: signal(2) is async-signal-safe.
    unsafe {
        libc::signal(sig, libc::SIG_DFL);
    }
}

#[cfg(unix)]
fn install_handlers() {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only stores to an atomic and resets its own
    // disposition, both of which are async-signal-safe.
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

#[cfg(not(unix))]
fn install_handlers() {}
