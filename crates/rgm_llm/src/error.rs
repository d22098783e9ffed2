//! Error types for generation requests.

use thiserror::Error;

/// Result type alias for generation operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors raised by generation providers and response parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Generation provider not configured: {0}")]
    NotConfigured(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request rejected {status}: {message}")]
    ClientError { status: u16, message: String },

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response does not match schema: {0}")]
    SchemaMismatch(String),
}

impl LlmError {
    /// Whether the request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_)
            | LlmError::Timeout
            | LlmError::RateLimited(_)
            | LlmError::StreamInterrupted(_) => true,
            LlmError::ServerError { status, .. } => (500..600).contains(status),
            LlmError::NotConfigured(_)
            | LlmError::UnknownProvider(_)
            | LlmError::AuthenticationFailed(_)
            | LlmError::ClientError { .. }
            | LlmError::InvalidResponse(_)
            | LlmError::SchemaMismatch(_) => false,
        }
    }

    /// Map a non-success HTTP status and body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LlmError::AuthenticationFailed(body),
            429 => LlmError::RateLimited(body),
            500..=599 => LlmError::ServerError {
                status,
                message: body,
            },
            _ => LlmError::ClientError {
                status,
                message: body,
            },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if let Some(status) = e.status() {
            LlmError::from_status(status.as_u16(), e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }
}
