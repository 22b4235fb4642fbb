//! Lexical sensibility check for generated treatments.
//!
//! Rules are scanned in order and the first one whose phrase occurs in the
//! candidate decides. Reject rules come first so that a description of the
//! disease wins over any treatment wording inside it. A candidate matching
//! nothing is rejected.

use serde::Serialize;

/// Outcome of classifying a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

/// Phrases that signal a definition or a literature summary.
pub const DEFINITIONAL_PHRASES: &[&str] = &[
    "is a disease",
    "is a condition",
    "i am",
    "refers to",
    "is characterized by",
    "systematic review",
    "meta-analysis",
    "recent advances",
    "update from",
    "et al",
];

/// Phrases that signal an actual recommendation.
pub const ACTIONABLE_PHRASES: &[&str] = &[
    "use ",
    "treat with",
    "manage with",
    "consider ",
    "recommend ",
    "prescribe ",
    "therapy",
    "medication",
    "lifestyle",
    "surgery",
    "diet",
    "exercise",
];

/// A named phrase set and the verdict it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    phrases: Vec<String>,
    pub verdict: Verdict,
}

impl Rule {
    /// Create a rule. Phrases are matched case-insensitively.
    pub fn new<I, S>(name: impl Into<String>, phrases: I, verdict: Verdict) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
            verdict,
        }
    }

    /// First phrase of this rule contained in `text`, which must already be
    /// lower-cased.
    fn find(&self, text: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|phrase| text.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

/// Result of running the engine on one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub verdict: Verdict,
    /// Name of the deciding rule; `None` when the default applied.
    pub rule: Option<&'a str>,
    /// Phrase that triggered the rule.
    pub phrase: Option<&'a str>,
}

/// Ordered rule list with a default verdict.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
    default: Verdict,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
            .with_rule(Rule::new("definitional", DEFINITIONAL_PHRASES, Verdict::Reject))
            .with_rule(Rule::new("actionable", ACTIONABLE_PHRASES, Verdict::Accept))
    }
}

impl RuleEngine {
    /// An engine with no rules that rejects everything.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default: Verdict::Reject,
        }
    }

    /// Append a rule after the existing ones.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify `candidate`, reporting which rule decided.
    pub fn classify<'a>(&'a self, candidate: &str) -> Classification<'a> {
        let text = candidate.trim_matches('"').to_lowercase();

        for rule in &self.rules {
            if let Some(phrase) = rule.find(&text) {
                return Classification {
                    verdict: rule.verdict,
                    rule: Some(&rule.name),
                    phrase: Some(phrase),
                };
            }
        }

        Classification {
            verdict: self.default,
            rule: None,
            phrase: None,
        }
    }

    /// Whether `candidate` reads like a treatment recommendation.
    pub fn is_sensible(&self, candidate: &str) -> bool {
        self.classify(candidate).verdict == Verdict::Accept
    }
}
