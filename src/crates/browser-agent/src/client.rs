//! HTTP client for a browsing-agent sidecar.
//!
//! The sidecar owns the headless browser. One escalation is three calls:
//!
//! 1. `POST /sessions` with the environment → `{"session_id": "..."}`
//! 2. `POST /sessions/{id}/run` with the task → `{"output"?, "transcript"?, "error"?}`
//! 3. `DELETE /sessions/{id}` to release the browser
//!
//! Session creation is a single action and the run is bounded by the session
//! budget. Teardown gets its own action-length window outside the task
//! deadline; if the escalation is cancelled mid-run the session is closed
//! from a background task.

use crate::budget::{EscalationBudget, TimeoutScope};
use crate::config::{AgentConfig, EnvironmentConfig};
use crate::error::{AgentError, Result};
use crate::output::AgentOutput;
use crate::task::AgentTask;
use crate::BrowserAgent;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Browsing agent reached over HTTP.
#[derive(Clone)]
pub struct HttpBrowserAgent {
    base_url: String,
    environment: EnvironmentConfig,
    client: Client,
}

impl HttpBrowserAgent {
    /// Create a client for the sidecar named in `config`.
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("remedy-browser-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AgentError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            environment: config.environment.clone(),
            client,
        })
    }

    async fn open_session(&self) -> Result<String> {
        let url = format!("{}/sessions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SessionRequest {
                headless: self.environment.headless,
                home_page: &self.environment.home_page,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::SessionError(format!(
                "session creation returned {}: {}",
                status, body
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        Ok(session.session_id)
    }

    async fn run_session(&self, session_id: &str, task: &AgentTask) -> Result<AgentOutput> {
        let url = format!("{}/sessions/{}/run", self.base_url, session_id);
        let response = self.client.post(&url).json(task).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::AgentFailed(format!(
                "run returned {}: {}",
                status, body
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;

        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Err(AgentError::AgentFailed(error.to_string()));
        }
        if let Some(steps) = value.get("steps").and_then(Value::as_u64) {
            debug!(session_id, steps, "Agent run finished");
        }

        Ok(AgentOutput::from_json(&value))
    }

    async fn close_session(&self, session_id: &str) -> Result<()> {
        let url = format!("{}/sessions/{}", self.base_url, session_id);
        self.client.delete(&url).send().await?.error_for_status()?;
        Ok(())
    }

    /// Close the session, giving up after `limit`. Failures are only logged.
    async fn release(&self, session_id: &str, limit: Duration) {
        match tokio::time::timeout(limit, self.close_session(session_id)).await {
            Ok(Ok(())) => debug!(session_id, "Browser session closed"),
            Ok(Err(e)) => warn!(session_id, error = %e, "Failed to close browser session"),
            Err(_) => warn!(session_id, ?limit, "Timed out closing browser session"),
        }
    }
}

/// Closes an open session even when the run future is dropped.
struct OpenSession {
    agent: HttpBrowserAgent,
    session_id: String,
    limit: Duration,
    armed: bool,
}

impl OpenSession {
    fn new(agent: &HttpBrowserAgent, session_id: &str, limit: Duration) -> Self {
        Self {
            agent: agent.clone(),
            session_id: session_id.to_string(),
            limit,
            armed: true,
        }
    }

    async fn close(mut self) {
        self.agent.release(&self.session_id, self.limit).await;
        self.armed = false;
    }
}

impl Drop for OpenSession {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(session_id = %self.session_id, "No runtime left to close browser session");
            return;
        };
        let agent = self.agent.clone();
        let session_id = std::mem::take(&mut self.session_id);
        let limit = self.limit;
        handle.spawn(async move {
            agent.release(&session_id, limit).await;
        });
    }
}

#[async_trait]
impl BrowserAgent for HttpBrowserAgent {
    async fn run(&self, task: &AgentTask, budget: &EscalationBudget) -> Result<AgentOutput> {
        let session_id = budget.run(TimeoutScope::Action, self.open_session()).await?;
        info!(session_id = %session_id, max_steps = task.max_steps, "Browser session opened");
        let session = OpenSession::new(self, &session_id, budget.timeouts().action);

        let outcome = budget
            .run(TimeoutScope::Session, self.run_session(&session_id, task))
            .await;

        session.close().await;
        outcome
    }
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    headless: bool,
    home_page: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_id: String,
}
