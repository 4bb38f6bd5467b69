//! Startup resolution of the recognition interpreter and script.
//!
//! Both are resolved once, before the server accepts traffic, and never
//! change afterwards. A missing script or interpreter is a fatal
//! [`ConfigError`].

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// File name of the recognition script.
pub const SCRIPT_FILE_NAME: &str = "ocr.py";

/// Interpreter used when no override is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Errors that prevent the runner from being configured.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ocr.py not found at {}", .path.display())]
    ScriptNotFound { path: PathBuf },

    #[error("interpreter '{name}' not found in PATH (override with PYTHON_BIN)")]
    InterpreterNotFound { name: String },

    #[error("failed to locate the running executable: {0}")]
    ExecutableDir(#[source] std::io::Error),
}

/// Immutable description of the command every invocation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    interpreter: PathBuf,
    script_path: PathBuf,
}

impl RunnerConfig {
    /// Build a config without touching the filesystem.
    pub fn new(interpreter: impl Into<PathBuf>, script_path: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script_path: script_path.into(),
        }
    }

    /// Resolve the script inside `script_dir` and the interpreter on `PATH`.
    ///
    /// An empty `interpreter` falls back to [`DEFAULT_INTERPRETER`].
    pub fn resolve(interpreter: &str, script_dir: &Path) -> Result<Self, ConfigError> {
        let script_path = script_dir.join(SCRIPT_FILE_NAME);
        if !script_path.is_file() {
            return Err(ConfigError::ScriptNotFound { path: script_path });
        }

        let name = match interpreter.trim() {
            "" => DEFAULT_INTERPRETER,
            other => other,
        };
        let interpreter = find_executable(name).ok_or_else(|| ConfigError::InterpreterNotFound {
            name: name.to_string(),
        })?;

        Ok(Self {
            interpreter,
            script_path,
        })
    }

    /// Resolve against the directory of the running executable, falling
    /// back to the current working directory when the script is not there.
    pub fn resolve_near_executable(interpreter: &str) -> Result<Self, ConfigError> {
        let exe = env::current_exe().map_err(ConfigError::ExecutableDir)?;
        let exe_dir = exe.parent().unwrap_or_else(|| Path::new("."));
        if exe_dir.join(SCRIPT_FILE_NAME).is_file() {
            return Self::resolve(interpreter, exe_dir);
        }
        let cwd = env::current_dir().map_err(ConfigError::ExecutableDir)?;
        Self::resolve(interpreter, &cwd)
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

/// Locate `name` the way a shell would.
///
/// Names containing a path separator are checked directly; bare names are
/// searched for in every `PATH` entry.
fn find_executable(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(OsStr::new(name)))
        .find(|full| is_executable(full))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fails_without_script() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = RunnerConfig::resolve("sh", dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ScriptNotFound { .. }));
        assert!(err.to_string().starts_with("ocr.py not found at"));
    }

    #[test]
    fn resolve_fails_for_unknown_interpreter() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join(SCRIPT_FILE_NAME), "print('x')\n").expect("write script");

        let err = RunnerConfig::resolve("definitely-not-an-interpreter-7f3a", dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InterpreterNotFound { ref name } if name == "definitely-not-an-interpreter-7f3a"
        ));
    }

    #[test]
    fn resolve_finds_interpreter_on_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join(SCRIPT_FILE_NAME), "print('x')\n").expect("write script");

        let config = RunnerConfig::resolve(" sh ", dir.path()).expect("resolve");
        assert!(config.interpreter().is_absolute());
        assert!(config.interpreter().ends_with("sh"));
        assert_eq!(config.script_path(), dir.path().join(SCRIPT_FILE_NAME));
    }

    #[test]
    fn resolve_accepts_explicit_interpreter_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join(SCRIPT_FILE_NAME), "").expect("write script");

        let config = RunnerConfig::resolve("/bin/sh", dir.path()).expect("resolve");
        assert_eq!(config.interpreter(), Path::new("/bin/sh"));
    }

    #[test]
    fn script_directory_is_not_a_script() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(dir.path().join(SCRIPT_FILE_NAME)).expect("mkdir");
        assert!(matches!(
            RunnerConfig::resolve("sh", dir.path()),
            Err(ConfigError::ScriptNotFound { .. })
        ));
    }
}
