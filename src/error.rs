//! Error types for waiting and handing off.

use thiserror::Error;

/// Exit code for every failure that happens before the handoff.
pub const EXIT_FAILURE: i32 = 1;
/// The follow-up command exists but could not be executed.
pub const EXIT_CANNOT_EXECUTE: i32 = 126;
/// The follow-up command was not found.
pub const EXIT_NOT_FOUND: i32 = 127;

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("unknown mode '{0}' (expected wait-for-up or wait-for-down)")]
    UnknownMode(String),

    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(u64),

    #[error("{tool} is not installed")]
    ToolMissing { tool: String },

    #[error("failed to run {tool}: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("operation timed out after {seconds} seconds waiting for {target}")]
    Timeout { target: String, seconds: u64 },

    #[error("failed to execute {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl WaitError {
    /// Process exit code the top-level handler should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            WaitError::Launch { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => EXIT_NOT_FOUND,
                _ => EXIT_CANNOT_EXECUTE,
            },
            _ => EXIT_FAILURE,
        }
    }
}
