//! The process runner: one input in, one [`Outcome`] out.

use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;

use super::config::RunnerConfig;
use super::context::{ExecutionContext, ParentScope};
use super::extract::extract_result;
use super::outcome::{ErrorKind, InvocationFailure, Outcome, Recognition, CANCELLED_MESSAGE};
use super::subprocess::{self, CommandError, CommandOutput};
use crate::input::OcrInput;

/// Upper bound on a single recognition run, whatever the caller allows.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the configured recognition script against one input at a time.
///
/// Cheap to clone; the configuration is shared read-only.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: Arc<RunnerConfig>,
    timeout_cap: Duration,
}

impl ProcessRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config: Arc::new(config),
            timeout_cap: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Override the per-run upper bound.
    pub fn with_timeout_cap(mut self, cap: Duration) -> Self {
        self.timeout_cap = cap;
        self
    }

    pub fn timeout_cap(&self) -> Duration {
        self.timeout_cap
    }

    /// Run `<interpreter> <script> <input>` and classify what happened.
    ///
    /// The run is bounded by the earlier of the parent's deadline and the
    /// runner's cap, and is interrupted if the parent is cancelled.
    pub async fn run(&self, input: &OcrInput, parent: &ParentScope) -> Outcome {
        let ctx = ExecutionContext::derive(parent, self.timeout_cap);

        let mut cmd = Command::new(self.config.interpreter());
        cmd.arg(self.config.script_path()).arg(input);

        tracing::debug!(
            interpreter = %self.config.interpreter().display(),
            script = %self.config.script_path().display(),
            "Starting recognition script"
        );

        let result = subprocess::run_command(&mut cmd, &ctx).await;
        let outcome = classify(result, &ctx);

        match &outcome {
            Ok(recognition) => tracing::debug!(
                result_len = recognition.result.len(),
                "Recognition script succeeded"
            ),
            Err(failure) => tracing::warn!(
                kind = %failure.kind,
                detail = %failure.detail,
                "Recognition script failed"
            ),
        }

        outcome
    }
}

/// Reduce a command result to an [`Outcome`].
///
/// Deadline expiry takes priority over every other failure cause.
fn classify(result: Result<CommandOutput, CommandError>, ctx: &ExecutionContext) -> Outcome {
    let output = match result {
        Ok(output) => output,
        Err(CommandError::DeadlineExceeded { elapsed_ms, stdout }) => {
            tracing::warn!(elapsed_ms, "Recognition script hit its deadline");
            return Err(InvocationFailure::timeout(stdout));
        }
        Err(err) if ctx.is_expired() => return Err(InvocationFailure::timeout(err.stdout())),
        Err(CommandError::Cancelled { elapsed_ms, stdout }) => {
            tracing::warn!(elapsed_ms, "Recognition script cancelled by caller");
            return Err(InvocationFailure::new(
                ErrorKind::LaunchError,
                CANCELLED_MESSAGE,
                stdout,
            ));
        }
        Err(err) => {
            let stdout = err.stdout().to_string();
            return Err(InvocationFailure::new(
                ErrorKind::LaunchError,
                err.to_string(),
                stdout,
            ));
        }
    };

    if !output.status.success() {
        if ctx.is_expired() {
            return Err(InvocationFailure::timeout(output.stdout));
        }
        // Any stderr at all means the script reported its own reason.
        if !output.stderr.is_empty() {
            return Err(InvocationFailure::new(
                ErrorKind::ScriptError,
                output.stderr.trim(),
                output.stdout,
            ));
        }
        return Err(InvocationFailure::new(
            ErrorKind::LaunchError,
            output.status.to_string(),
            output.stdout,
        ));
    }

    match extract_result(&output.stdout) {
        Some(line) => Ok(Recognition {
            result: line.to_string(),
            raw_output: output.stdout,
        }),
        None => Err(InvocationFailure::empty_result(output.stdout)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
