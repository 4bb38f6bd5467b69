//! Invocation outcome types.

use std::fmt;

/// Detail reported when the execution deadline fires.
pub const TIMEOUT_MESSAGE: &str = "ocr script timed out";

/// Detail reported when the script exits cleanly without an answer.
pub const EMPTY_RESULT_MESSAGE: &str = "ocr script returned empty result";

/// Detail reported when the caller's scope is cancelled mid-run.
pub const CANCELLED_MESSAGE: &str = "ocr script cancelled";

/// The single result of one invocation.
pub type Outcome = Result<Recognition, InvocationFailure>;

/// A successful run: the extracted answer plus everything the script printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Last non-blank stdout line.
    pub result: String,
    /// Complete captured stdout.
    pub raw_output: String,
}

/// Why an invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The execution deadline passed before the command exited.
    Timeout,
    /// Non-zero exit with a message on stderr.
    ScriptError,
    /// Non-zero exit without stderr, or the command never started.
    LaunchError,
    /// Zero exit but no non-blank stdout line.
    EmptyResult,
}

impl ErrorKind {
    /// Stable machine-readable code for API responses.
    pub fn code(self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::ScriptError => "SCRIPT_ERROR",
            Self::LaunchError => "LAUNCH_ERROR",
            Self::EmptyResult => "EMPTY_RESULT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified failure together with whatever stdout was captured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct InvocationFailure {
    pub kind: ErrorKind,
    /// Captured stdout (possibly partial or empty).
    pub raw_output: String,
    /// Human-readable reason.
    pub detail: String,
}

impl InvocationFailure {
    pub fn new(kind: ErrorKind, detail: impl Into<String>, raw_output: impl Into<String>) -> Self {
        Self {
            kind,
            raw_output: raw_output.into(),
            detail: detail.into(),
        }
    }

    pub fn timeout(raw_output: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, TIMEOUT_MESSAGE, raw_output)
    }

    pub fn empty_result(raw_output: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyResult, EMPTY_RESULT_MESSAGE, raw_output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_detail() {
        let failure = InvocationFailure::new(ErrorKind::ScriptError, "bad image", "Debug: x\n");
        assert_eq!(failure.to_string(), "bad image");
    }

    #[test]
    fn timeout_message() {
        let failure = InvocationFailure::timeout("partial");
        assert_eq!(failure.kind, ErrorKind::Timeout);
        assert_eq!(failure.to_string(), "ocr script timed out");
        assert_eq!(failure.raw_output, "partial");
    }

    #[test]
    fn codes_are_unique() {
        let mut codes = [
            ErrorKind::Timeout,
            ErrorKind::ScriptError,
            ErrorKind::LaunchError,
            ErrorKind::EmptyResult,
        ]
        .map(ErrorKind::code)
        .to_vec();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 4, "all error codes must be unique");
    }
}
