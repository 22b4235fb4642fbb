//! Error types for text-generation back ends.

use thiserror::Error;

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when talking to a generation back end.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Model not found on the back end.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Back end unavailable (e.g., Ollama not running, model failed to load).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Invalid generation parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response from the back end.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Non-success status returned by the back end.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether this error means the back end cannot serve requests at all,
    /// as opposed to a single malformed exchange.
    pub fn is_unavailable(&self) -> bool {
        match self {
            LlmError::ServiceUnavailable(_)
            | LlmError::ModelNotFound(_)
            | LlmError::Timeout(_) => true,
            LlmError::HttpError(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(LlmError::ServiceUnavailable("down".into()).is_unavailable());
        assert!(LlmError::ModelNotFound("biogpt".into()).is_unavailable());
        assert!(!LlmError::InvalidResponse("garbage".into()).is_unavailable());
        assert!(!LlmError::InvalidRequest("top_p".into()).is_unavailable());
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: LlmError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, LlmError::SerializationError(_)));
    }
}
