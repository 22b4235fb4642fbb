//! Error types for agent escalation.

use crate::budget::TimeoutScope;
use std::time::Duration;
use thiserror::Error;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors raised while running the browsing agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// HTTP request to the agent failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// One of the nested budgets ran out.
    #[error("{scope} timeout exceeded after {after:?}")]
    Timeout { scope: TimeoutScope, after: Duration },

    /// The browser session could not be created or was lost.
    #[error("Session error: {0}")]
    SessionError(String),

    /// The agent ran but reported a failure.
    #[error("Agent error: {0}")]
    AgentFailed(String),

    /// The agent answered with something we could not decode.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// Whether this error came from a budget running out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AgentError::Timeout { .. })
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::InvalidResponse(err.to_string())
    }
}
