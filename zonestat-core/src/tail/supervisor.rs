use crate::server::ShutdownSignal;
use crate::tail::command::FollowCommand;
use crate::tail::process::{ExitKind, classify_exit, terminate};
use crate::zone::ZoneCommand;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Time a follow process gets between SIGTERM and SIGKILL.
pub const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// Longest line accepted from a follow process, newline included.
pub(crate) const MAX_LINE_BYTES: usize = 64 * 1024;

/// Upper bound on waiting for the stderr drain after the child is gone.
const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of a single follow-process attempt.
#[derive(Debug)]
enum Attempt {
    Shutdown,
    AggregatorGone,
    Exited(ExitKind),
    WaitFailed(std::io::Error),
    SpawnFailed(std::io::Error),
}

/// Result of pumping stdout into the zone channel.
enum Forward {
    Eof,
    Shutdown,
    AggregatorGone,
}

/// Keeps one log file's new lines flowing into its zone channel.
///
/// Never returns an error: failures are logged and retried until shutdown.
pub struct TailSupervisor {
    zone: String,
    path: PathBuf,
    follow: FollowCommand,
    backoff: Duration,
    lines: mpsc::Sender<ZoneCommand>,
    shutdown: ShutdownSignal,
}

impl TailSupervisor {
    pub fn new(
        zone: impl Into<String>,
        path: impl Into<PathBuf>,
        follow: FollowCommand,
        backoff: Duration,
        lines: mpsc::Sender<ZoneCommand>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            zone: zone.into(),
            path: path.into(),
            follow,
            backoff,
            lines,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        info!(zone = %self.zone, path = %self.path.display(), "tail supervisor started");

        loop {
            match self.attempt().await {
                Attempt::Shutdown => break,
                Attempt::Exited(ExitKind::Interrupted) => {
                    info!(zone = %self.zone, "follow process interrupted; not restarting");
                    break;
                }
                Attempt::AggregatorGone => {
                    debug!(zone = %self.zone, "zone channel closed; not restarting");
                    break;
                }
                Attempt::Exited(ExitKind::Unexpected { code, signal }) => {
                    warn!(
                        zone = %self.zone,
                        path = %self.path.display(),
                        returncode = ?code,
                        signal = ?signal,
                        "unexpected follow process exit"
                    );
                }
                Attempt::WaitFailed(e) => {
                    warn!(zone = %self.zone, error = %e, "failed to wait on follow process");
                }
                Attempt::SpawnFailed(e) => {
                    warn!(
                        zone = %self.zone,
                        program = self.follow.program(),
                        error = %e,
                        "failed to start follow process"
                    );
                }
            }

            let backoff = self.backoff;
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = self.shutdown.triggered() => break,
            }
        }

        info!(zone = %self.zone, "tail supervisor stopped");
    }

    async fn attempt(&mut self) -> Attempt {
        if self.shutdown.is_triggered() {
            return Attempt::Shutdown;
        }

        let mut child = match self.follow.command(&self.path).spawn() {
            Ok(child) => child,
            Err(e) => return Attempt::SpawnFailed(e),
        };

        debug!(
            zone = %self.zone,
            pid = ?child.id(),
            program = self.follow.program(),
            args = ?self.follow.args_for(&self.path),
            "follow process started"
        );

        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(drain_stderr(self.zone.clone(), stderr)));

        let forwarded = match child.stdout.take() {
            Some(stdout) => self.forward_stdout(stdout).await,
            None => Forward::Eof,
        };

        let outcome = match forwarded {
            Forward::Eof => self.wait_or_stop(&mut child).await,
            Forward::Shutdown => {
                self.stop_child(&mut child).await;
                Attempt::Shutdown
            }
            Forward::AggregatorGone => {
                self.stop_child(&mut child).await;
                Attempt::AggregatorGone
            }
        };

        if let Some(task) = stderr_task {
            finish_stderr(task).await;
        }

        outcome
    }

    async fn forward_stdout(&mut self, stdout: ChildStdout) -> Forward {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::with_capacity(1024);

        loop {
            buf.clear();

            let read = tokio::select! {
                read = read_bounded_line(&mut reader, &mut buf, MAX_LINE_BYTES) => read,
                _ = self.shutdown.triggered() => return Forward::Shutdown,
            };

            match read {
                Ok(LineRead::Eof) => return Forward::Eof,
                Ok(LineRead::Line) => {}
                Ok(LineRead::TooLong(len)) => {
                    warn!(
                        zone = %self.zone,
                        len,
                        max = MAX_LINE_BYTES,
                        "skipping overlong line"
                    );
                    continue;
                }
                Err(e) => {
                    warn!(zone = %self.zone, error = %e, "failed to read follow process stdout");
                    return Forward::Eof;
                }
            }

            let Some(line) = decode_line(&self.zone, &buf) else {
                continue;
            };

            tokio::select! {
                sent = self.lines.send(ZoneCommand::Line(line)) => {
                    if sent.is_err() {
                        return Forward::AggregatorGone;
                    }
                }
                _ = self.shutdown.triggered() => return Forward::Shutdown,
            }
        }
    }

    /// Stdout is closed; wait for the child unless shutdown arrives first.
    async fn wait_or_stop(&mut self, child: &mut Child) -> Attempt {
        tokio::select! {
            status = child.wait() => match status {
                Ok(status) => Attempt::Exited(classify_exit(status)),
                Err(e) => Attempt::WaitFailed(e),
            },
            _ = self.shutdown.triggered() => {
                self.stop_child(child).await;
                Attempt::Shutdown
            }
        }
    }

    async fn stop_child(&self, child: &mut Child) {
        match terminate(child, TERMINATE_GRACE).await {
            Ok(status) => debug!(zone = %self.zone, %status, "follow process stopped"),
            Err(e) => warn!(zone = %self.zone, error = %e, "failed to stop follow process"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LineRead {
    /// `buf` holds one line (the last one may lack a newline).
    Line,
    /// The line exceeded the limit and was consumed up to its newline; `buf` is empty.
    TooLong(usize),
    Eof,
}

/// Read one line into `buf`, never buffering more than `max + 1` bytes.
pub(crate) async fn read_bounded_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max as u64 + 1;

    buf.clear();
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(LineRead::Eof);
    }
    if (n as u64) < limit || buf.last() == Some(&b'\n') {
        return Ok(LineRead::Line);
    }

    let mut skipped = n;
    loop {
        buf.clear();
        let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
        skipped += n;
        if n == 0 || buf.last() == Some(&b'\n') {
            break;
        }
    }
    buf.clear();
    Ok(LineRead::TooLong(skipped))
}

/// UTF-8 decode and trim one raw line. Undecodable lines are logged and dropped.
pub(crate) fn decode_line(zone: &str, raw: &[u8]) -> Option<String> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim_end(),
        Err(e) => {
            warn!(zone, error = %e, "skipping line that is not valid UTF-8");
            return None;
        }
    };

    if line.is_empty() {
        return None;
    }
    Some(line.to_string())
}

async fn drain_stderr<R>(zone: String, stderr: R)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();

    loop {
        match read_bounded_line(&mut reader, &mut buf, MAX_LINE_BYTES).await {
            Ok(LineRead::Eof) => break,
            Ok(LineRead::TooLong(len)) => {
                debug!(zone = %zone, len, "skipping overlong stderr line");
            }
            Ok(LineRead::Line) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if !line.is_empty() {
                    info!(zone = %zone, stderr = line, "read from follow process stderr");
                }
            }
            Err(e) => {
                debug!(zone = %zone, error = %e, "stderr drain stopped");
                break;
            }
        }
    }
}

// A grandchild may inherit stderr and keep it open after the follow process
// is gone; do not let that hold up the retry loop.
async fn finish_stderr(mut task: JoinHandle<()>) {
    if tokio::time::timeout(STDERR_DRAIN_TIMEOUT, &mut task)
        .await
        .is_err()
    {
        task.abort();
    }
}
