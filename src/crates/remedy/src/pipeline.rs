//! Treatment resolution.
//!
//! One request moves through `Init -> Generated -> Validated`, lands in one
//! of the [`Outcome`]s and is then answered. Nothing is retried: the
//! generator and the browsing agent are each called at most once.
//!
//! Precedence when the candidate is rejected: the knowledge base first, then
//! the browsing agent (when the policy allows it), then the flagged candidate.

use crate::classifier::{RuleEngine, Verdict};
use crate::error::{ResolveError, Result};
use crate::knowledge::KnowledgeBase;
use crate::prompt::{build_prompt, strip_prompt_echo};
use browser_agent::{AgentConfig, BrowserAgent, NO_TREATMENT_FOUND};
use llm::{GenerationConfig, ModelHandle, ModelState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Attached to results that carry an unvalidated candidate.
pub const UNRELIABLE_WARNING: &str = "Generated treatment may not be accurate";

/// Reported for a missing or blank disease.
pub const MISSING_DISEASE: &str = "Please provide a disease in the request body";

/// Reported when there is neither a generator nor a fallback.
pub const MODEL_UNAVAILABLE: &str = "Model not loaded and disease not found in database";

/// When the browsing agent is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPolicy {
    /// Never.
    Disabled,
    /// Only when the candidate is rejected and the knowledge base has no entry.
    #[default]
    OnReject,
    /// On every request, alongside generation.
    Always,
}

impl EscalationPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            EscalationPolicy::Disabled => "disabled",
            EscalationPolicy::OnReject => "on_reject",
            EscalationPolicy::Always => "always",
        }
    }
}

/// Where the returned treatment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentSource {
    Model,
    KnowledgeBase,
    Agent,
}

/// Terminal state of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The candidate passed the classifier.
    Accepted,
    /// Rejected candidate replaced by the knowledge base.
    FallbackDb,
    /// Rejected candidate returned with a warning.
    FallbackWarn,
    /// Answer taken from the browsing agent.
    Escalated,
}

/// Response payload for one disease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub disease: String,
    pub treatment: String,
    /// Raw candidate, reported when the agent runs on every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biogpt_treatment: Option<String>,
    /// Sentence extracted from the browsing agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub source: TreatmentSource,
    #[serde(skip)]
    pub outcome: Outcome,
}

impl ResolutionResult {
    fn new(
        disease: &str,
        treatment: impl Into<String>,
        source: TreatmentSource,
        outcome: Outcome,
    ) -> Self {
        Self {
            disease: disease.to_string(),
            treatment: treatment.into(),
            biogpt_treatment: None,
            proxy_treatment: None,
            warning: None,
            source,
            outcome,
        }
    }

    fn escalated(disease: &str, sentence: String) -> Self {
        let mut result = Self::new(disease, sentence.clone(), TreatmentSource::Agent, Outcome::Escalated);
        result.proxy_treatment = Some(sentence);
        result
    }

    fn unreliable(disease: &str, candidate: String) -> Self {
        let mut result = Self::new(disease, candidate, TreatmentSource::Model, Outcome::FallbackWarn);
        result.warning = Some(UNRELIABLE_WARNING.to_string());
        result
    }
}

/// Trim and lower-case a disease name; blank names are invalid.
pub fn normalize_disease(raw: &str) -> Result<String> {
    let disease = raw.trim().to_lowercase();
    if disease.is_empty() {
        return Err(ResolveError::InputError(MISSING_DISEASE.to_string()));
    }
    Ok(disease)
}

/// Resolves diseases to treatments.
///
/// Shared across requests; holds no per-request state.
pub struct Resolver {
    model: ModelHandle,
    generation: GenerationConfig,
    rules: RuleEngine,
    knowledge: KnowledgeBase,
    agent: Option<Arc<dyn BrowserAgent>>,
    agent_config: AgentConfig,
    policy: EscalationPolicy,
}

impl Resolver {
    /// Create a resolver with default sampling, rules and policy and no agent.
    pub fn new(model: ModelHandle, knowledge: KnowledgeBase) -> Self {
        Self {
            model,
            generation: GenerationConfig::default(),
            rules: RuleEngine::default(),
            knowledge,
            agent: None,
            agent_config: AgentConfig::default(),
            policy: EscalationPolicy::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Attach a browsing agent and the limits it runs under.
    pub fn with_agent(mut self, agent: Arc<dyn BrowserAgent>, config: AgentConfig) -> Self {
        self.agent = Some(agent);
        self.agent_config = config;
        self
    }

    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Policy in effect. Without an agent this is always `Disabled`.
    pub fn policy(&self) -> EscalationPolicy {
        if self.agent.is_some() {
            self.policy
        } else {
            EscalationPolicy::Disabled
        }
    }

    pub fn model_state(&self) -> ModelState {
        self.model.state()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Produce a treatment for `disease`.
    pub async fn resolve(&self, disease: &str) -> Result<ResolutionResult> {
        let disease = normalize_disease(disease)?;
        let policy = self.policy();

        let (candidate, corroboration) = match policy {
            EscalationPolicy::Always => {
                let (candidate, proxy) =
                    tokio::join!(self.generate(&disease), self.escalate(&disease));
                (candidate, Some(proxy?))
            }
            _ => (self.generate(&disease).await, None),
        };

        let raw_candidate = match policy {
            EscalationPolicy::Always => candidate.clone(),
            _ => None,
        };

        let mut result = match candidate {
            Some(candidate) => {
                self.settle_candidate(&disease, candidate, corroboration.as_deref())
                    .await?
            }
            None => {
                self.settle_without_model(&disease, corroboration.as_deref())
                    .await?
            }
        };

        if policy == EscalationPolicy::Always {
            result.biogpt_treatment = raw_candidate;
            result.proxy_treatment = corroboration;
        }

        info!(
            disease = %disease,
            outcome = ?result.outcome,
            source = ?result.source,
            "Resolved treatment"
        );
        Ok(result)
    }

    /// Generate and clean a candidate. `None` when the generator is not
    /// ready or the call failed.
    async fn generate(&self, disease: &str) -> Option<String> {
        let generator = match self.model.state() {
            ModelState::Ready(generator) => generator,
            state => {
                warn!(disease, state = state.label(), "Generator unavailable");
                return None;
            }
        };

        let prompt = build_prompt(disease);
        match generator.generate(&prompt, &self.generation).await {
            Ok(output) => {
                let candidate = strip_prompt_echo(&prompt, &output);
                debug!(disease, candidate = %candidate, "Generated candidate");
                Some(candidate)
            }
            Err(e) => {
                warn!(
                    disease,
                    error = %e,
                    backend_down = e.is_unavailable(),
                    "Generation failed, using fallbacks"
                );
                None
            }
        }
    }

    async fn settle_candidate(
        &self,
        disease: &str,
        candidate: String,
        corroboration: Option<&str>,
    ) -> Result<ResolutionResult> {
        let classification = self.rules.classify(&candidate);
        debug!(
            disease,
            verdict = ?classification.verdict,
            rule = classification.rule.unwrap_or("default"),
            phrase = classification.phrase,
            "Classified candidate"
        );

        if classification.verdict == Verdict::Accept {
            return Ok(ResolutionResult::new(
                disease,
                candidate,
                TreatmentSource::Model,
                Outcome::Accepted,
            ));
        }

        warn!(disease, candidate = %candidate, "Generated treatment is not sensible");
        if let Some(treatment) = self.knowledge.lookup(disease) {
            return Ok(ResolutionResult::new(
                disease,
                treatment,
                TreatmentSource::KnowledgeBase,
                Outcome::FallbackDb,
            ));
        }

        match self.agent_answer(disease, corroboration).await? {
            Some(sentence) => Ok(ResolutionResult::escalated(disease, sentence)),
            None => Ok(ResolutionResult::unreliable(disease, candidate)),
        }
    }

    async fn settle_without_model(
        &self,
        disease: &str,
        corroboration: Option<&str>,
    ) -> Result<ResolutionResult> {
        if let Some(treatment) = self.knowledge.lookup(disease) {
            info!(disease, "Answering from knowledge base");
            return Ok(ResolutionResult::new(
                disease,
                treatment,
                TreatmentSource::KnowledgeBase,
                Outcome::FallbackDb,
            ));
        }

        match self.agent_answer(disease, corroboration).await? {
            Some(sentence) => Ok(ResolutionResult::escalated(disease, sentence)),
            None => Err(ResolveError::ServiceUnavailable(MODEL_UNAVAILABLE.to_string())),
        }
    }

    /// Agent sentence usable as the treatment, escalating now unless the
    /// agent already ran alongside generation.
    async fn agent_answer(
        &self,
        disease: &str,
        corroboration: Option<&str>,
    ) -> Result<Option<String>> {
        let sentence = match (self.policy(), corroboration) {
            (EscalationPolicy::Disabled, _) => return Ok(None),
            (_, Some(sentence)) => sentence.to_string(),
            (_, None) => self.escalate(disease).await?,
        };
        Ok((sentence != NO_TREATMENT_FOUND).then_some(sentence))
    }

    async fn escalate(&self, disease: &str) -> Result<String> {
        let Some(agent) = &self.agent else {
            return Ok(NO_TREATMENT_FOUND.to_string());
        };

        browser_agent::escalate(agent.as_ref(), &self.agent_config, disease)
            .await
            .map_err(|e| {
                error!(disease, error = %e, "Escalation failed");
                ResolveError::from(e)
            })
    }
}
