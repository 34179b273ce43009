use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Child;

/// Why a follow process ended, from the supervisor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Killed by SIGINT; the operator is stopping us. Do not retry.
    Interrupted,
    /// Anything else. Retry after the backoff.
    Unexpected {
        code: Option<i32>,
        signal: Option<i32>,
    },
}

pub fn classify_exit(status: ExitStatus) -> ExitKind {
    match status.signal() {
        Some(sig) if sig == Signal::SIGINT as i32 => ExitKind::Interrupted,
        signal => ExitKind::Unexpected {
            code: status.code(),
            signal,
        },
    }
}

/// SIGTERM the child, give it `grace` to exit, then SIGKILL. Always reaps.
pub(crate) async fn terminate(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    if let Some(pid) = child.id() {
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            tracing::debug!(pid, error = %e, "failed to send SIGTERM to follow process");
        }
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status,
        Err(_) => {
            tracing::warn!(pid = ?child.id(), "follow process ignored SIGTERM, killing");
            child.start_kill()?;
            child.wait().await
        }
    }
}
