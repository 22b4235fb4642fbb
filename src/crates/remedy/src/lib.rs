//! Treatment recommendation service.
//!
//! A disease name goes through a generative model; the candidate is checked
//! by a lexical [`classifier`], and rejected candidates fall back to a curated
//! [`knowledge`] base or, depending on the [`EscalationPolicy`], to a browsing
//! agent that searches a trusted site.
//!
//! # Example
//!
//! ```rust,ignore
//! use remedy::{KnowledgeBase, Resolver};
//! use llm::ModelHandle;
//!
//! let resolver = Resolver::new(ModelHandle::new(), KnowledgeBase::seeded());
//! let result = resolver.resolve("Asthma").await?;
//! println!("{}", result.treatment);
//! ```

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod pipeline;
pub mod prompt;

pub use classifier::{Classification, Rule, RuleEngine, Verdict};
pub use config::{ConfigError, RemedyConfig};
pub use error::{ResolveError, Result};
pub use knowledge::KnowledgeBase;
pub use pipeline::{
    normalize_disease, EscalationPolicy, Outcome, ResolutionResult, Resolver, TreatmentSource,
};
pub use prompt::{build_prompt, strip_prompt_echo};
