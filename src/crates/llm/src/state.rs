//! Process-wide model lifecycle.
//!
//! The model is loaded at most once per process. A failed load is permanent:
//! request handlers observe `Failed` and degrade instead of retrying.

use crate::config::{Backend, LocalLlmConfig};
use crate::error::{LlmError, Result};
use crate::generator::TextGenerator;
use crate::local::{LlamaCppClient, OllamaClient};
use crate::provider_utils::ProviderUtils;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Lifecycle of the shared generator.
#[derive(Clone)]
pub enum ModelState {
    /// Loading has not been attempted yet.
    Uninitialized,
    /// The generator is loaded and serving.
    Ready(Arc<dyn TextGenerator>),
    /// Loading failed; the reason is kept for diagnostics.
    Failed(String),
}

impl ModelState {
    /// Short label used in health output and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ModelState::Uninitialized => "uninitialized",
            ModelState::Ready(_) => "ready",
            ModelState::Failed(_) => "failed",
        }
    }

    /// The generator, when ready.
    pub fn generator(&self) -> Option<Arc<dyn TextGenerator>> {
        match self {
            ModelState::Ready(generator) => Some(Arc::clone(generator)),
            _ => None,
        }
    }
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Uninitialized => write!(f, "Uninitialized"),
            ModelState::Ready(generator) => write!(f, "Ready({})", generator.model_name()),
            ModelState::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Shared, write-once handle to the model state.
#[derive(Clone, Default)]
pub struct ModelHandle {
    cell: Arc<OnceCell<ModelState>>,
}

impl ModelHandle {
    /// A handle whose model has not been loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is already serving `generator`.
    pub fn ready(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(ModelState::Ready(generator)))),
        }
    }

    /// A handle whose load already failed.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(ModelState::Failed(reason.into())))),
        }
    }

    /// Run `loader` unless a load was already attempted, and return the
    /// resulting state. Concurrent callers wait for the single attempt.
    pub async fn initialize<F, Fut>(&self, loader: F) -> ModelState
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn TextGenerator>>>,
    {
        self.cell
            .get_or_init(|| async move {
                match loader().await {
                    Ok(generator) => {
                        info!(model = generator.model_name(), "Model loaded successfully");
                        ModelState::Ready(generator)
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load model, serving from knowledge base only");
                        ModelState::Failed(e.to_string())
                    }
                }
            })
            .await
            .clone()
    }

    /// Current state without triggering a load.
    pub fn state(&self) -> ModelState {
        self.cell.get().cloned().unwrap_or(ModelState::Uninitialized)
    }
}

/// Build the configured back end and verify it can serve the model.
pub async fn load_local(config: &LocalLlmConfig) -> Result<Arc<dyn TextGenerator>> {
    info!(
        backend = ?config.backend,
        base_url = %config.base_url,
        model = %config.model,
        "Loading generation back end"
    );
    match config.backend {
        Backend::Ollama => verify(OllamaClient::new(config.clone())?).await,
        Backend::LlamaCpp => verify(LlamaCppClient::new(config.clone())?).await,
    }
}

async fn verify<C>(client: C) -> Result<Arc<dyn TextGenerator>>
where
    C: TextGenerator + ProviderUtils + 'static,
{
    if !client.ping().await? {
        return Err(LlmError::ServiceUnavailable(format!(
            "back end for {} is not reachable",
            ProviderUtils::current_model(&client)
        )));
    }

    let model = ProviderUtils::current_model(&client).to_string();
    let models = client.fetch_models().await?;
    if !models.iter().any(|m| m.matches(&model)) {
        return Err(LlmError::ModelNotFound(model));
    }

    Ok(Arc::new(client))
}
