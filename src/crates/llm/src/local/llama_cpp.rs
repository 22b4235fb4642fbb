//! llama.cpp server client implementation.
//!
//! Talks to the native `/completion` endpoint of llama.cpp's built-in HTTP
//! server, which serves exactly one model per process.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::local::LlamaCppClient;
//! use llm::{Backend, GenerationConfig, LocalLlmConfig, TextGenerator};
//!
//! let config = LocalLlmConfig::new("http://localhost:8080", "biogpt")
//!     .with_backend(Backend::LlamaCpp);
//! let client = LlamaCppClient::new(config)?;
//! let text = client.generate("Treatment for gout:", &GenerationConfig::default()).await?;
//! ```

use crate::config::{GenerationConfig, LocalLlmConfig};
use crate::error::{LlmError, Result};
use crate::generator::TextGenerator;
use crate::local::map_status;
use crate::provider_utils::{ModelInfo, ProviderUtils};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// llama.cpp server client for local inference.
#[derive(Clone)]
pub struct LlamaCppClient {
    config: LocalLlmConfig,
    client: Client,
}

impl LlamaCppClient {
    /// Create a new llama.cpp client with the given configuration.
    pub fn new(config: LocalLlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check if the llama.cpp server is running and has its model loaded.
    pub async fn check_health(&self) -> Result<bool> {
        let url = format!("{}/health", self.config.endpoint());
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn build_request(&self, prompt: &str, config: &GenerationConfig) -> CompletionRequest {
        CompletionRequest {
            prompt: prompt.to_string(),
            n_predict: config.max_length,
            temperature: if config.do_sample { None } else { Some(0.0) },
            top_k: config.top_k,
            top_p: config.top_p,
            repeat_last_n: config.repeat_window,
            repeat_penalty: config.effective_repeat_penalty(),
            stop: config.stop_sequences(),
            cache_prompt: false,
            stream: false,
        }
    }
}

#[async_trait]
impl TextGenerator for LlamaCppClient {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let url = format!("{}/completion", self.config.endpoint());
        let req_body = self.build_request(prompt, config);

        let response = self
            .client
            .post(&url)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(format!(
                        "llama.cpp did not answer within {:?}",
                        self.config.timeout()
                    ))
                } else {
                    LlmError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status("llama.cpp", &self.config.model, status, error_text));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        debug!(
            tokens_predicted = ?completion.tokens_predicted,
            stopped_eos = ?completion.stopped_eos,
            "llama.cpp completion finished"
        );

        Ok(completion.content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// llama.cpp API types
#[derive(Debug, Serialize)]
struct CompletionRequest {
    prompt: String,
    n_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    top_k: u32,
    top_p: f32,
    repeat_last_n: u32,
    repeat_penalty: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    cache_prompt: bool,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
    #[serde(default)]
    tokens_predicted: Option<usize>,
    #[serde(default)]
    stopped_eos: Option<bool>,
}

#[async_trait]
impl ProviderUtils for LlamaCppClient {
    async fn ping(&self) -> Result<bool> {
        self.check_health().await
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        // One model per server process.
        Ok(vec![ModelInfo::new(&self.config.model)])
    }

    fn current_model(&self) -> &str {
        &self.config.model
    }
}
