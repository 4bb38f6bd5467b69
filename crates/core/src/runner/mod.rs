//! Recognition script invocation.
//!
//! [`ProcessRunner`] launches `<interpreter> <script> <input>` under an
//! [`ExecutionContext`], captures both output streams through
//! [`subprocess::run_command`], and reduces the result to an [`Outcome`].

pub mod config;
pub mod context;
pub mod extract;
pub mod outcome;
pub mod process;
pub mod subprocess;

pub use config::{ConfigError, RunnerConfig};
pub use context::{ExecutionContext, ParentScope};
pub use extract::extract_result;
pub use outcome::{ErrorKind, InvocationFailure, Outcome, Recognition};
pub use process::{ProcessRunner, DEFAULT_COMMAND_TIMEOUT};

/// Shared test helpers for runner tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use super::config::RunnerConfig;

    /// Write `body` to a temporary `sh` script.
    ///
    /// The returned handle must stay alive for as long as the script is run.
    pub fn write_temp_script(body: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut f = tempfile::Builder::new()
            .suffix(".sh")
            .tempfile()
            .expect("create temp file");
        write!(f, "{body}").expect("write body");
        f.flush().expect("flush script");
        f
    }

    /// A [`RunnerConfig`] that runs `script` with `sh`.
    pub fn sh_config(script: &tempfile::NamedTempFile) -> RunnerConfig {
        RunnerConfig::new("sh", script.path())
    }
}
