//! Subprocess management for recognition runs.
//!
//! [`run_command`] spawns a prepared [`tokio::process::Command`], captures
//! stdout and stderr in background tasks, and waits for the child to exit
//! while watching the [`ExecutionContext`] deadline and cancellation. On
//! every path out of this module the child (and its process group on unix)
//! has been killed or has exited and been reaped.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::context::ExecutionContext;

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Anything beyond the limit is read and discarded so the child never
/// blocks on a full pipe.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// How long to wait for the output readers after the child is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Everything a finished command produced.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Ways a command can fail to run to completion.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The process could not be started at all.
    #[error("failed to start command: {0}")]
    Spawn(#[source] io::Error),

    /// Waiting on the child failed after it started.
    #[error("failed to wait for command: {source}")]
    Wait {
        #[source]
        source: io::Error,
        stdout: String,
    },

    /// The execution deadline passed; the child was killed.
    #[error("command exceeded its deadline after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64, stdout: String },

    /// The execution context was cancelled; the child was killed.
    #[error("command cancelled after {elapsed_ms}ms")]
    Cancelled { elapsed_ms: u64, stdout: String },
}

impl CommandError {
    /// Stdout captured before the failure (empty if the command never ran).
    pub fn stdout(&self) -> &str {
        match self {
            Self::Spawn(_) => "",
            Self::Wait { stdout, .. }
            | Self::DeadlineExceeded { stdout, .. }
            | Self::Cancelled { stdout, .. } => stdout,
        }
    }
}

enum Interrupt {
    Deadline,
    Cancelled,
    Wait(io::Error),
}

/// Spawn `cmd`, capture its output, and wait under `ctx`.
///
/// The caller sets program and arguments; pipes, stdin and process-group
/// placement are configured here.
pub async fn run_command(
    cmd: &mut Command,
    ctx: &ExecutionContext,
) -> Result<CommandOutput, CommandError> {
    // `kill_on_drop(true)` covers the direct child if this future is dropped
    // mid-wait; the group guard below covers anything it spawned.
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(CommandError::Spawn)?;
    let mut group = GroupGuard::new(child.id());

    let mut stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let mut stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    let interrupt = tokio::select! {
        biased;
        waited = child.wait() => match waited {
            Ok(status) => {
                // Stragglers left behind by the script would otherwise hold
                // the pipes open.
                group.kill();
                let stdout = collect(&mut stdout_task).await;
                let stderr = collect(&mut stderr_task).await;
                return Ok(CommandOutput {
                    status,
                    stdout,
                    stderr,
                });
            }
            Err(e) => Interrupt::Wait(e),
        },
        () = ctx.expired() => Interrupt::Deadline,
        () = ctx.cancelled() => Interrupt::Cancelled,
    };

    group.kill();
    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "Child already exited before kill");
    }
    if tokio::time::timeout(DRAIN_GRACE, child.wait()).await.is_err() {
        tracing::warn!(pid = ?child.id(), "Killed child did not exit within grace period");
    }

    let stdout = collect(&mut stdout_task).await;
    stderr_task.abort();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    Err(match interrupt {
        Interrupt::Deadline => CommandError::DeadlineExceeded { elapsed_ms, stdout },
        Interrupt::Cancelled => CommandError::Cancelled { elapsed_ms, stdout },
        Interrupt::Wait(source) => CommandError::Wait { source, stdout },
    })
}

/// Read an entire output stream, keeping at most [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
        let _ = tokio::io::copy(&mut h, &mut tokio::io::sink()).await;
    }
    buf
}

/// Await a reader task for at most [`DRAIN_GRACE`], decoding lossily.
async fn collect(task: &mut JoinHandle<Vec<u8>>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, &mut *task).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Output reader task failed");
            String::new()
        }
        Err(_elapsed) => {
            task.abort();
            tracing::warn!("Output stream still open after grace period, discarding");
            String::new()
        }
    }
}

/// Sends SIGKILL to the child's process group when killed or dropped.
///
/// The child is spawned as the leader of its own group, so the group id is
/// its pid.
struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: killpg has no memory-safety preconditions; ESRCH for an
    // already-empty group is expected and ignored.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
