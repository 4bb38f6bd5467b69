use std::time::Duration;

use ocr_gateway_core::runner::config::DEFAULT_INTERPRETER;
use ocr_gateway_core::runner::DEFAULT_COMMAND_TIMEOUT;

/// Port the gateway listens on.
pub const DEFAULT_PORT: u16 = 3844;

/// Server configuration.
///
/// Only the interpreter is read from the environment; the bind address and
/// timeouts are fixed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (`0.0.0.0`).
    pub host: String,
    /// Bind port (`3844`).
    pub port: u16,
    /// HTTP request timeout in seconds. Sits above the command cap so a
    /// hung script is reported as a script timeout, not a 408.
    pub request_timeout_secs: u64,
    /// Upper bound on one recognition run, in seconds.
    pub command_timeout_secs: u64,
    /// Interpreter used to run the recognition script.
    pub python_bin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs() + 5,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            python_bin: DEFAULT_INTERPRETER.into(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// | Env Var      | Default   |
    /// |--------------|-----------|
    /// | `PYTHON_BIN` | `python3` |
    pub fn from_env() -> Self {
        let python_bin = std::env::var("PYTHON_BIN")
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_INTERPRETER.into());

        Self {
            python_bin,
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
