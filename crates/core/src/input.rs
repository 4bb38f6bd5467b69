//! Validated recognition input.

use std::fmt;

use crate::error::CoreError;

/// Message returned when no input survives trimming.
pub const MISSING_INPUT_MESSAGE: &str = "missing url parameter";

/// A URL (or opaque identifier) handed to the recognition script.
///
/// Always non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrInput(String);

impl OcrInput {
    /// Trim `raw` and reject it if nothing is left.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(MISSING_INPUT_MESSAGE.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OcrInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<std::ffi::OsStr> for OcrInput {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
