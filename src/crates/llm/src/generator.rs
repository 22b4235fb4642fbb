//! The text-completion contract every back end implements.

use crate::config::GenerationConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Stateless text completion.
///
/// Given a prompt and sampling parameters, returns one decoded string. The
/// string may repeat the prompt verbatim as a prefix; callers strip it.
/// Sampling is stochastic, so two calls with the same prompt may differ.
///
/// Implementations are shared across request handlers behind an `Arc` and
/// must not mutate model state while generating.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate one completion for `prompt`.
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;

    /// Identifier of the model serving completions.
    fn model_name(&self) -> &str;
}
