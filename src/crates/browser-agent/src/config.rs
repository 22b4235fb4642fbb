//! Agent configuration: target environment, strategy and budgets.

use crate::budget::Timeouts;
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser environment the agent drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Page loaded when the session starts.
    pub home_page: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            headless: true,
            home_page: "https://www.google.com".to_string(),
        }
    }
}

/// Settings for the web-agent escalation.
///
/// Durations are whole seconds so the struct reads naturally from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL of the agent sidecar.
    pub endpoint: String,
    /// Browser environment.
    pub environment: EnvironmentConfig,
    /// Solving strategy the agent should use.
    pub strategy: String,
    /// Site the agent is told to search.
    pub trusted_domain: String,
    /// Maximum number of agent steps.
    pub max_steps: u32,
    /// Budget for a single browser action.
    pub action_timeout_secs: u64,
    /// Budget for one browser session.
    pub session_timeout_secs: u64,
    /// Budget for the whole escalation.
    pub task_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7788".to_string(),
            environment: EnvironmentConfig::default(),
            strategy: "react".to_string(),
            trusted_domain: "mayoclinic.org".to_string(),
            max_steps: 20,
            action_timeout_secs: 30,
            session_timeout_secs: 120,
            task_timeout_secs: 180,
        }
    }
}

impl AgentConfig {
    /// Create a configuration pointing at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the trusted search domain.
    pub fn with_trusted_domain(mut self, domain: impl Into<String>) -> Self {
        self.trusted_domain = domain.into();
        self
    }

    /// Set the step budget.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set all three timeouts, in seconds.
    pub fn with_timeouts(mut self, action_secs: u64, session_secs: u64, task_secs: u64) -> Self {
        self.action_timeout_secs = action_secs;
        self.session_timeout_secs = session_secs;
        self.task_timeout_secs = task_secs;
        self
    }

    /// The nested timeouts as durations.
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            action: Duration::from_secs(self.action_timeout_secs),
            session: Duration::from_secs(self.session_timeout_secs),
            task: Duration::from_secs(self.task_timeout_secs),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Check that the budgets nest and the step budget is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(AgentError::ConfigError(
                "max_steps must be greater than 0".to_string(),
            ));
        }
        if self.action_timeout_secs == 0 {
            return Err(AgentError::ConfigError(
                "action_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.action_timeout_secs > self.session_timeout_secs
            || self.session_timeout_secs > self.task_timeout_secs
        {
            return Err(AgentError::ConfigError(format!(
                "timeouts must nest (action {}s <= session {}s <= task {}s)",
                self.action_timeout_secs, self.session_timeout_secs, self.task_timeout_secs
            )));
        }
        if self.trusted_domain.trim().is_empty() {
            return Err(AgentError::ConfigError(
                "trusted_domain cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
