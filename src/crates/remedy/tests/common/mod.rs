//! Mock generator and browsing agent shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use browser_agent::{AgentConfig, AgentError, AgentOutput, AgentTask, BrowserAgent, EscalationBudget};
use llm::{GenerationConfig, LlmError, ModelHandle, TextGenerator};
use remedy::{EscalationPolicy, KnowledgeBase, Resolver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Generator returning a fixed reply, or failing when there is none.
pub struct MockGenerator {
    reply: Option<String>,
    echo_prompt: bool,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::with(Some(reply.into()), false, Duration::ZERO))
    }

    /// Replies with the prompt followed by `reply`.
    pub fn echoing(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::with(Some(reply.into()), true, Duration::ZERO))
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::with(None, false, Duration::ZERO))
    }

    pub fn slow(reply: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self::with(Some(reply.into()), false, delay))
    }

    fn with(reply: Option<String>, echo_prompt: bool, delay: Duration) -> Self {
        Self {
            reply,
            echo_prompt,
            delay,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> llm::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        tokio::time::sleep(self.delay).await;

        match &self.reply {
            Some(reply) if self.echo_prompt => Ok(format!("{}{}", prompt, reply)),
            Some(reply) => Ok(reply.clone()),
            None => Err(LlmError::ServiceUnavailable("generator crashed".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-biogpt"
    }
}

/// Browsing agent with a scripted answer.
pub struct MockAgent {
    output: Option<AgentOutput>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockAgent {
    /// Answers with a transcript ending in the completion marker.
    pub fn answering(sentence: &str) -> Arc<Self> {
        Arc::new(Self::with(
            Some(AgentOutput::RawTranscript(format!(
                "opened mayoclinic.org\naccepted cookies\nFINAL ANSWER: {}\n",
                sentence
            ))),
            Duration::ZERO,
        ))
    }

    /// Finishes without anything readable.
    pub fn empty_handed() -> Arc<Self> {
        Arc::new(Self::with(Some(AgentOutput::Unrecognized), Duration::ZERO))
    }

    /// Fails with a session error.
    pub fn crashing() -> Arc<Self> {
        Arc::new(Self::with(None, Duration::ZERO))
    }

    pub fn slow(sentence: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self::with(Some(AgentOutput::Structured(sentence.to_string())), delay))
    }

    fn with(output: Option<AgentOutput>, delay: Duration) -> Self {
        Self {
            output,
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserAgent for MockAgent {
    async fn run(
        &self,
        _task: &AgentTask,
        _budget: &EscalationBudget,
    ) -> browser_agent::Result<AgentOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        self.output
            .clone()
            .ok_or_else(|| AgentError::SessionError("browser process exited".to_string()))
    }
}

/// Short budgets so timeout tests finish quickly under paused time.
pub fn quick_agent_config() -> AgentConfig {
    AgentConfig::default().with_timeouts(1, 2, 3)
}

pub fn resolver_with(generator: Arc<MockGenerator>) -> Resolver {
    Resolver::new(ModelHandle::ready(generator), KnowledgeBase::seeded())
}

pub fn resolver_with_agent(
    generator: Arc<MockGenerator>,
    agent: Arc<MockAgent>,
    policy: EscalationPolicy,
) -> Resolver {
    resolver_with(generator)
        .with_agent(agent, quick_agent_config())
        .with_policy(policy)
}

pub fn resolver_without_model(agent: Option<Arc<MockAgent>>, policy: EscalationPolicy) -> Resolver {
    let resolver = Resolver::new(ModelHandle::failed("model files missing"), KnowledgeBase::seeded())
        .with_policy(policy);
    match agent {
        Some(agent) => resolver.with_agent(agent, quick_agent_config()),
        None => resolver,
    }
}
