//! Agent results and treatment extraction.

use serde_json::Value;

/// Marker the agent is told to put in front of its answer.
pub const COMPLETION_MARKER: &str = "FINAL ANSWER:";

/// Stands in for the answer in the task's reply template.
pub const ANSWER_PLACEHOLDER: &str = "<treatment sentence>";

/// Returned when the agent finished without a usable answer.
pub const NO_TREATMENT_FOUND: &str = "No treatment found";

/// What the agent handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutput {
    /// A dedicated result field.
    Structured(String),
    /// Only the free-form transcript of the run.
    RawTranscript(String),
    /// Nothing we know how to read.
    Unrecognized,
}

impl AgentOutput {
    /// Classify a sidecar reply.
    ///
    /// A non-empty `output` field wins over `transcript`; a bare JSON string
    /// is treated as a transcript.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                if let Some(output) = map.get("output").and_then(Value::as_str) {
                    if !output.trim().is_empty() {
                        return AgentOutput::Structured(output.to_string());
                    }
                }
                match map.get("transcript").and_then(Value::as_str) {
                    Some(transcript) => AgentOutput::RawTranscript(transcript.to_string()),
                    None => AgentOutput::Unrecognized,
                }
            }
            Value::String(text) => AgentOutput::RawTranscript(text.clone()),
            _ => AgentOutput::Unrecognized,
        }
    }
}

/// Pull a treatment sentence out of the agent's output.
///
/// Never fails: anything unreadable yields [`NO_TREATMENT_FOUND`].
pub fn extract_treatment(output: &AgentOutput) -> String {
    let extracted = match output {
        AgentOutput::Structured(text) => {
            // Structured results sometimes still carry the marker.
            Some(after_marker(text).unwrap_or_else(|| text.trim()))
        }
        AgentOutput::RawTranscript(text) => after_marker(text),
        AgentOutput::Unrecognized => None,
    };

    match extracted {
        Some(sentence) if !sentence.is_empty() => sentence.to_string(),
        _ => NO_TREATMENT_FOUND.to_string(),
    }
}

/// Text following the last real marker, up to the first line break.
///
/// Transcripts often repeat the task, whose reply template also contains the
/// marker; markers followed by the placeholder are skipped.
fn after_marker(text: &str) -> Option<&str> {
    text.rmatch_indices(COMPLETION_MARKER)
        .map(|(start, marker)| {
            let rest = &text[start + marker.len()..];
            rest.split(['\n', '\r']).next().unwrap_or("").trim()
        })
        .find(|line| !line.starts_with(ANSWER_PLACEHOLDER))
}
