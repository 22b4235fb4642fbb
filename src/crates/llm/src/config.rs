//! Configuration structures for generation back ends.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which local completion server hosts the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Ollama (`/api/generate`).
    #[default]
    Ollama,
    /// llama.cpp server (`/completion`).
    LlamaCpp,
}

/// Connection settings for a local completion server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalLlmConfig {
    /// Back end flavour.
    #[serde(default)]
    pub backend: Backend,

    /// Base URL for the local server.
    ///
    /// Examples:
    /// - Ollama: "http://localhost:11434"
    /// - llama.cpp: "http://localhost:8080"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name/identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LocalLlmConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LocalLlmConfig {
    /// Create a new local configuration.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the back end flavour.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub fn endpoint(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Sampling parameters passed with every completion request.
///
/// Defaults reproduce the settings the service was tuned with: nucleus
/// sampling at 0.9 over the top 50 tokens, 10..=160 tokens of output and
/// bigram repeat suppression, sent as a repeat penalty over the last 64
/// tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sample instead of greedy decoding.
    pub do_sample: bool,
    /// Top-k cutoff.
    pub top_k: u32,
    /// Nucleus threshold, exclusive on both ends.
    pub top_p: f32,
    /// Maximum output length in tokens.
    pub max_length: u32,
    /// Minimum output length in tokens.
    pub min_length: u32,
    /// N-gram size that must not repeat; 0 disables repeat suppression.
    ///
    /// Completion servers have no n-gram blocking, so this only switches
    /// the repeat penalty on or off.
    pub no_repeat_ngram_size: u32,
    /// Penalty applied to recently generated tokens.
    pub repeat_penalty: f32,
    /// How many recent tokens the repeat penalty looks at.
    pub repeat_window: u32,
    /// End-of-sequence token.
    pub eos_token: Option<String>,
    /// Padding token; falls back to the EOS token.
    pub pad_token: Option<String>,
    /// Stop as soon as the EOS token is produced.
    pub early_stopping: bool,
    /// Prompts are truncated to this many tokens by the back end.
    pub max_input_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            do_sample: true,
            top_k: 50,
            top_p: 0.9,
            max_length: 160,
            min_length: 10,
            no_repeat_ngram_size: 2,
            repeat_penalty: 1.3,
            repeat_window: 64,
            eos_token: Some("</s>".to_string()),
            pad_token: None,
            early_stopping: true,
            max_input_tokens: 512,
        }
    }
}

impl GenerationConfig {
    /// Create a configuration with default sampling parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the top-k cutoff.
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the nucleus threshold.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the output length bounds.
    pub fn with_length(mut self, min_length: u32, max_length: u32) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// Set the repeat suppression window.
    pub fn with_no_repeat_ngram_size(mut self, size: u32) -> Self {
        self.no_repeat_ngram_size = size;
        self
    }

    /// Set the repeat penalty and its look-back window.
    pub fn with_repeat_penalty(mut self, penalty: f32, window: u32) -> Self {
        self.repeat_penalty = penalty;
        self.repeat_window = window;
        self
    }

    /// Penalty actually sent to the back end; neutral when suppression is off.
    pub fn effective_repeat_penalty(&self) -> f32 {
        if self.no_repeat_ngram_size == 0 {
            1.0
        } else {
            self.repeat_penalty
        }
    }

    /// Enable or disable sampling.
    pub fn with_sampling(mut self, do_sample: bool) -> Self {
        self.do_sample = do_sample;
        self
    }

    /// Set the end-of-sequence token.
    pub fn with_eos_token(mut self, token: impl Into<String>) -> Self {
        self.eos_token = Some(token.into());
        self
    }

    /// Effective padding token.
    pub fn pad_token(&self) -> Option<&str> {
        self.pad_token.as_deref().or(self.eos_token.as_deref())
    }

    /// Stop sequences derived from the EOS token.
    pub fn stop_sequences(&self) -> Vec<String> {
        if !self.early_stopping {
            return Vec::new();
        }
        self.eos_token.iter().cloned().collect()
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.top_p > 0.0 && self.top_p < 1.0) {
            return Err(LlmError::InvalidRequest(format!(
                "top_p must be in (0, 1), got {}",
                self.top_p
            )));
        }
        if self.top_k == 0 {
            return Err(LlmError::InvalidRequest(
                "top_k must be greater than 0".to_string(),
            ));
        }
        if self.repeat_penalty < 1.0 {
            return Err(LlmError::InvalidRequest(format!(
                "repeat_penalty must be at least 1.0, got {}",
                self.repeat_penalty
            )));
        }
        if self.min_length > self.max_length {
            return Err(LlmError::InvalidRequest(format!(
                "min_length ({}) exceeds max_length ({})",
                self.min_length, self.max_length
            )));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "biogpt".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}
