//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while running the test command.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Test command is empty")]
    EmptyCommand,

    #[error("Failed to spawn test command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Test command timed out after {0} seconds")]
    Timeout(u64),

    #[error("Test execution failed: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
