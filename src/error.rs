//! Error type shared by the generator, the runners and the CLI.
//!
//! Every failure falls in one of four categories: the request was malformed
//! (caught before any process is spawned), the device is not ready, the
//! external tool failed or produced output that does not match the request,
//! or a file could not be read/written. The CLI maps each category to its own
//! exit code via [`QuantisError::exit_code`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the `quantis` library.
#[derive(Debug, Error)]
pub enum QuantisError {
    /// The request was rejected before invoking the tool.
    #[error("{0}")]
    Validation(String),

    /// The readiness probe failed.
    #[error("device not ready: {0}")]
    DeviceNotReady(String),

    /// The executable could not be found in PATH.
    #[error("easyquantis executable not found: {program}")]
    NotFound { program: String },

    /// The tool exited with a non-zero status.
    #[error("command failed: {command} (exit code {}): {}", fmt_code(.code), .stderr.trim())]
    Execution {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The tool exited cleanly but its output does not match the request.
    #[error("unexpected output in {}: {reason}", .path.display())]
    UnexpectedOutput { path: PathBuf, reason: String },

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn fmt_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl QuantisError {
    /// Process exit code the CLI uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            QuantisError::Validation(_) => 2,
            QuantisError::DeviceNotReady(_) => 3,
            QuantisError::NotFound { .. } => 4,
            QuantisError::Execution { .. } | QuantisError::UnexpectedOutput { .. } => 5,
            QuantisError::Io { .. } => 6,
        }
    }

    /// Short label printed before the message on stderr.
    pub fn kind(&self) -> &'static str {
        match self {
            QuantisError::Validation(_) => "Validation error",
            QuantisError::DeviceNotReady(_) => "Device error",
            QuantisError::NotFound { .. } => "Error",
            QuantisError::Execution { .. } | QuantisError::UnexpectedOutput { .. } => {
                "Invocation error"
            }
            QuantisError::Io { .. } => "I/O error",
        }
    }

    /// A one-line suggestion for the user, if there is a useful one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            QuantisError::NotFound { .. } => {
                Some("Make sure 'easyquantis' is installed and available in your PATH.")
            }
            QuantisError::DeviceNotReady(_) => Some(
                "Make sure 'easyquantis' is installed, in your PATH, and a Quantis device is connected.",
            ),
            QuantisError::Validation(msg) => {
                let msg = msg.to_lowercase();
                if msg.contains("minimum") && msg.contains("maximum") {
                    Some("Make sure --min is not greater than --max.")
                } else if msg.contains("count") || msg.contains("finite") {
                    None
                } else {
                    Some(
                        "Make sure the output path is a valid file (not a directory) and the parent directory exists.",
                    )
                }
            }
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuantisError::Io {
            path: path.into(),
            source,
        }
    }
}
