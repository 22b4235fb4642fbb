//! Ollama client implementation.
//!
//! Uses the raw completion endpoint (`/api/generate` with `raw: true`) so the
//! prompt reaches the model untouched by any chat template.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::local::OllamaClient;
//! use llm::{GenerationConfig, LocalLlmConfig, TextGenerator};
//!
//! let config = LocalLlmConfig::new("http://localhost:11434", "biogpt");
//! let client = OllamaClient::new(config)?;
//!
//! let text = client
//!     .generate("Treatment for asthma:", &GenerationConfig::default())
//!     .await?;
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

/// Ollama client for local inference.
#[derive(Clone)]
pub struct OllamaClient {
    config: LocalLlmConfig,
    client: Client,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: LocalLlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check if the Ollama server is running.
    pub async fn check_health(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.endpoint());
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Build the request body for a completion.
    fn build_request(&self, prompt: &str, config: &GenerationConfig) -> OllamaRequest {
        let stop = config.stop_sequences();
        OllamaRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            raw: true,
            stream: false,
            options: OllamaOptions {
                temperature: if config.do_sample { None } else { Some(0.0) },
                top_k: config.top_k,
                top_p: config.top_p,
                num_predict: config.max_length,
                repeat_last_n: config.repeat_window,
                repeat_penalty: config.effective_repeat_penalty(),
                num_ctx: config.max_input_tokens + config.max_length,
                stop: if stop.is_empty() { None } else { Some(stop) },
            },
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let url = format!("{}/api/generate", self.config.endpoint());
        let req_body = self.build_request(prompt, config);

        let response = self
            .client
            .post(&url)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(format!("Ollama did not answer within {:?}", self.config.timeout()))
                } else {
                    LlmError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status("Ollama", &self.config.model, status, error_text));
        }

        let ollama_resp: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        debug!(
            model = %ollama_resp.model,
            eval_count = ?ollama_resp.eval_count,
            done_reason = ?ollama_resp.done_reason,
            "Ollama completion finished"
        );

        Ok(ollama_resp.response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    raw: bool,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    top_k: u32,
    top_p: f32,
    num_predict: u32,
    repeat_last_n: u32,
    repeat_penalty: f32,
    num_ctx: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    eval_count: Option<usize>,
}

#[async_trait]
impl ProviderUtils for OllamaClient {
    async fn ping(&self) -> Result<bool> {
        self.check_health().await
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.config.endpoint());

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(LlmError::ProviderError(
                "Failed to fetch models from Ollama".to_string(),
            ));
        }

        #[derive(Deserialize)]
        struct OllamaModelsResponse {
            models: Vec<OllamaModelInfo>,
        }

        #[derive(Deserialize)]
        struct OllamaModelInfo {
            name: String,
            #[serde(default)]
            size: Option<u64>,
        }

        let models_response: OllamaModelsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(models_response
            .models
            .into_iter()
            .map(|m| {
                let info = ModelInfo::new(m.name);
                match m.size {
                    Some(size) => info.with_size(size),
                    None => info,
                }
            })
            .collect())
    }

    fn current_model(&self) -> &str {
        &self.config.model
    }
}
