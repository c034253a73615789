//! Asking the hosting process to reload its configuration.

/// Something that can tell the host to reread its configuration.
///
/// Called after every successful mutation. Implementations must not block;
/// the request does not wait for the reload to happen.
pub trait ReloadNotifier: Send + Sync {
    fn notify_reload(&self);
}

impl<F> ReloadNotifier for F
where
    F: Fn() + Send + Sync,
{
    fn notify_reload(&self) {
        self()
    }
}

/// Sends `SIGUSR1` to the current process.
///
/// The host must have a handler installed for the signal; without one the
/// default disposition terminates the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalReloader;

impl ReloadNotifier for SignalReloader {
    #[cfg(unix)]
    fn notify_reload(&self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        tracing::info!("Requesting configuration reload (SIGUSR1)");
        if let Err(e) = kill(Pid::this(), Signal::SIGUSR1) {
            tracing::error!("Failed to signal own process: {}", e);
        }
    }

    #[cfg(not(unix))]
    fn notify_reload(&self) {
        tracing::warn!("Reload signal is not supported on this platform");
    }
}

/// Does nothing. For hosts that watch the files themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReloader;

impl ReloadNotifier for NoopReloader {
    fn notify_reload(&self) {}
}
