//! Error types for the agents module.

use thiserror::Error;

use rgm_core::AgentId;

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent not registered: {0}")]
    NotFound(AgentId),

    #[error("Agent {agent} received unexpected input: expected {expected}, got {actual}")]
    UnexpectedMessage {
        agent: AgentId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Run exceeded {0} steps")]
    StepLimitExceeded(u32),

    #[error("Terminal agent produced no outcome")]
    MissingOutcome,

    #[error("Core error: {0}")]
    Core(#[from] rgm_core::CoreError),

    #[error("Test runner error: {0}")]
    Runner(#[from] rgm_runner::RunnerError),

    #[error("Generation error: {0}")]
    Llm(#[from] rgm_llm::LlmError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Create an unexpected-input error.
    pub fn unexpected(agent: AgentId, expected: &'static str, actual: &'static str) -> Self {
        Self::UnexpectedMessage {
            agent,
            expected,
            actual,
        }
    }
}
