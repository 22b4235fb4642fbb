//! Error types for treatment resolution.

use thiserror::Error;

/// Result type for resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Why a request could not be answered.
///
/// A rejected candidate is not an error; it is handled by fallback and at
/// most surfaces as a warning on the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The disease was missing or blank.
    #[error("{0}")]
    InputError(String),

    /// No generator and nothing else to answer from.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// The browsing agent failed for this request.
    #[error("Proxy AI failed: {0}")]
    EscalationFailure(String),
}

impl ResolveError {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ResolveError::InputError(_))
    }
}

impl From<browser_agent::AgentError> for ResolveError {
    fn from(err: browser_agent::AgentError) -> Self {
        ResolveError::EscalationFailure(err.to_string())
    }
}
