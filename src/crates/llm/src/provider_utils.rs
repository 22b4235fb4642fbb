//! Provider utility functions for connection testing and model discovery.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Information about a model hosted by a back end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier/name.
    pub id: String,

    /// Size on disk in bytes, when the back end reports it.
    pub size_bytes: Option<u64>,
}

impl ModelInfo {
    /// Create a new ModelInfo with just an ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size_bytes: None,
        }
    }

    /// Set the reported size.
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Whether this entry names `model`.
    ///
    /// Ollama reports tagged names (`biogpt:latest`), so an untagged
    /// configured name matches any tag of the same model.
    pub fn matches(&self, model: &str) -> bool {
        if self.id == model {
            return true;
        }
        !model.contains(':')
            && self
                .id
                .split_once(':')
                .map(|(name, _)| name == model)
                .unwrap_or(false)
    }
}

/// Connection testing and model discovery used while loading the model.
#[async_trait]
pub trait ProviderUtils: Send + Sync {
    /// Ping the back end.
    ///
    /// Returns `Ok(true)` if it answers, `Ok(false)` if unreachable.
    async fn ping(&self) -> Result<bool>;

    /// List the models the back end can serve.
    ///
    /// Back ends that host a single model return just that one.
    async fn fetch_models(&self) -> Result<Vec<ModelInfo>>;

    /// Get the configured model.
    fn current_model(&self) -> &str;
}
