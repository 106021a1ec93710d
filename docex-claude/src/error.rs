use docex::extraction::GatewayError;
use thiserror::Error;

/// Errors raised while running the Claude CLI.
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// No usable executable was found.
    #[error("Claude executable not found (tried: {})", .tried.join(", "))]
    ExecutableNotFound {
        /// Each location checked, in order.
        tried: Vec<String>,
    },

    /// The process could not be spawned or awaited.
    #[error("Failed to spawn process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// The process outlived its timeout and was killed.
    #[error("Process timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The process exited unsuccessfully.
    #[error(
        "Process exited with non-zero status: {exit_code}\nSTDOUT: {stdout}\nSTDERR: {stderr}"
    )]
    NonZeroExit {
        /// Exit code (`-1` when killed by a signal).
        exit_code: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// Any other failure.
    #[error("Other error: {0}")]
    Other(String),
}

impl From<ClaudeError> for GatewayError {
    fn from(err: ClaudeError) -> Self {
        match err {
            ClaudeError::Timeout(_) => Self::Transport(err.to_string()),
            _ => Self::Process(err.to_string()),
        }
    }
}
