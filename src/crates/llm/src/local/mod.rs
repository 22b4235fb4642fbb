//! Local completion back ends.
//!
//! - **Ollama** - raw completions through `/api/generate`
//! - **llama.cpp** - the server's native `/completion` endpoint

pub mod llama_cpp;
pub mod ollama;

pub use llama_cpp::LlamaCppClient;
pub use ollama::OllamaClient;

use crate::error::LlmError;
use reqwest::StatusCode;

/// Map a non-success HTTP status from a back end onto an error.
pub(crate) fn map_status(
    backend: &str,
    model: &str,
    status: StatusCode,
    body: String,
) -> LlmError {
    match status {
        StatusCode::NOT_FOUND => LlmError::ModelNotFound(format!("{} ({}): {}", model, backend, body)),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            LlmError::ServiceUnavailable(format!("{} returned {}: {}", backend, status, body))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            LlmError::InvalidRequest(format!("{} rejected request: {}", backend, body))
        }
        _ => LlmError::ProviderError(format!("{} API error {}: {}", backend, status, body)),
    }
}
