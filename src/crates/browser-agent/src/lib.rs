//! Web-agent escalation for remedy.
//!
//! When the generated treatment cannot be trusted, an autonomous browsing
//! agent can look the disease up on a trusted site instead. This crate owns
//! everything about that call except the agent itself: the task wording, the
//! nested action/session/task timeouts, the HTTP protocol to the agent
//! sidecar, and reading a treatment sentence out of whatever comes back.
//!
//! # Example
//!
//! ```rust,ignore
//! use browser_agent::{escalate, AgentConfig, HttpBrowserAgent};
//!
//! let config = AgentConfig::new("http://localhost:7788");
//! let agent = HttpBrowserAgent::new(&config)?;
//! let sentence = escalate(&agent, &config, "gout").await?;
//! ```

pub mod budget;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod task;

pub use budget::{EscalationBudget, TimeoutScope, Timeouts};
pub use client::HttpBrowserAgent;
pub use config::{AgentConfig, EnvironmentConfig};
pub use error::{AgentError, Result};
pub use output::{
    extract_treatment, AgentOutput, ANSWER_PLACEHOLDER, COMPLETION_MARKER, NO_TREATMENT_FOUND,
};
pub use task::{build_task, AgentTask};

use async_trait::async_trait;
use tracing::{info, warn};

/// An autonomous browsing agent.
#[async_trait]
pub trait BrowserAgent: Send + Sync {
    /// Run `task`, honouring the session and action limits in `budget`.
    async fn run(&self, task: &AgentTask, budget: &EscalationBudget) -> Result<AgentOutput>;
}

/// Ask the agent for a treatment for `disease`.
///
/// The whole call is bounded by the task timeout. Returns the extracted
/// sentence, or [`NO_TREATMENT_FOUND`] when the agent finished without one.
pub async fn escalate(
    agent: &dyn BrowserAgent,
    config: &AgentConfig,
    disease: &str,
) -> Result<String> {
    let task = AgentTask::for_disease(disease, config);
    let budget = EscalationBudget::start(config.timeouts());

    info!(disease, domain = %config.trusted_domain, "Escalating to browsing agent");
    let output = budget
        .run(TimeoutScope::Task, agent.run(&task, &budget))
        .await
        .map_err(|e| {
            warn!(disease, error = %e, timed_out = e.is_timeout(), "Browsing agent failed");
            e
        })?;

    let treatment = extract_treatment(&output);
    if treatment == NO_TREATMENT_FOUND {
        warn!(disease, ?output, "Browsing agent returned no treatment");
    }
    Ok(treatment)
}
