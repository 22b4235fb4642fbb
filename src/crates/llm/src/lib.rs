//! Text-generation back ends for remedy.
//!
//! This crate provides the [`TextGenerator`] contract used by the treatment
//! pipeline, the sampling parameters sent with every completion, concrete
//! clients for local completion servers, and the process-wide
//! [`ModelHandle`] that records whether the model loaded.
//!
//! # Local Providers
//!
//! - **Ollama** - raw completions via `/api/generate`
//! - **llama.cpp** - native `/completion` endpoint
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::{load_local, GenerationConfig, LocalLlmConfig, ModelHandle};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = LocalLlmConfig::new("http://localhost:11434", "biogpt");
//!     let handle = ModelHandle::new();
//!     let state = handle.initialize(|| load_local(&config)).await;
//!
//!     if let Some(generator) = state.generator() {
//!         let text = generator
//!             .generate("Treatment for asthma:", &GenerationConfig::default())
//!             .await
//!             .unwrap_or_default();
//!         println!("{}", text);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod local;
pub mod provider_utils;
pub mod state;

// Re-export commonly used types
pub use config::{Backend, GenerationConfig, LocalLlmConfig};
pub use error::{LlmError, Result};
pub use generator::TextGenerator;
pub use provider_utils::{ModelInfo, ProviderUtils};
pub use state::{load_local, ModelHandle, ModelState};
