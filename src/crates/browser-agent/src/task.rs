//! Natural-language task handed to the browsing agent.

use crate::config::AgentConfig;
use crate::output::{ANSWER_PLACEHOLDER, COMPLETION_MARKER};
use serde::Serialize;

/// One escalation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentTask {
    /// Instructions for the agent.
    pub description: String,
    /// Solving strategy.
    pub strategy: String,
    /// Step budget.
    pub max_steps: u32,
    /// Per-action budget the agent enforces on itself, in seconds.
    pub action_timeout_secs: u64,
}

impl AgentTask {
    /// Task looking up treatments for `disease` on the configured domain.
    pub fn for_disease(disease: &str, config: &AgentConfig) -> Self {
        Self {
            description: build_task(disease, &config.trusted_domain),
            strategy: config.strategy.clone(),
            max_steps: config.max_steps,
            action_timeout_secs: config.action_timeout_secs,
        }
    }
}

/// Build the step-by-step instructions for one disease.
pub fn build_task(disease: &str, trusted_domain: &str) -> String {
    format!(
        "1. Wait until the page has finished loading.\n\
         2. If a cookie consent or privacy dialog is shown, find the button that accepts it \
         (for example \"Accept\", \"Accept all\" or \"I agree\") and click it. \
         The dialog may live inside an embedded iframe, so check frames too.\n\
         3. Search {domain} for \"treatments for {disease}\", for example with the query \
         \"site:{domain} treatments for {disease}\", and open the most relevant {domain} page.\n\
         4. Read the page and pick one concise sentence that recommends a treatment for {disease}.\n\
         5. Reply with a single line of the form \"{marker} {placeholder}\".",
        domain = trusted_domain,
        disease = disease,
        marker = COMPLETION_MARKER,
        placeholder = ANSWER_PLACEHOLDER,
    )
}
