//! Result-line extraction.

/// Return the last non-blank line of `output`, trimmed.
///
/// The recognition script may print any amount of diagnostics before its
/// answer, so only the final meaningful line counts. `None` when every line
/// is blank.
pub fn extract_result(output: &str) -> Option<&str> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
