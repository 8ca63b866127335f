//! Error types for cstore invocations.

use std::path::PathBuf;

/// Result type alias for cstore client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cstore client operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The cstore process exited with a non-zero status.
    ///
    /// The display text is the captured stderr, unmodified, so the tool's
    /// own diagnostic reaches the operator instead of a generic message.
    #[error("{stderr}")]
    CommandFailed {
        stderr: String,
        exit_code: Option<i32>,
    },

    /// The cstore process exited cleanly but its stdout was not valid JSON.
    #[error("malformed cstore output: {detail}")]
    MalformedOutput {
        detail: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cstore process could not be started at all.
    #[error("failed to run '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a command failure error from captured stderr
    #[must_use]
    pub fn command_failed(stderr: impl Into<String>, exit_code: Option<i32>) -> Self {
        Error::CommandFailed {
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Create a malformed output error from a JSON parse failure
    #[must_use]
    pub fn malformed_output(detail: impl Into<String>, source: serde_json::Error) -> Self {
        Error::MalformedOutput {
            detail: detail.into(),
            source,
        }
    }

    /// Create a spawn error for a program that could not be started
    #[must_use]
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Spawn {
            program: program.into(),
            source,
        }
    }
}
