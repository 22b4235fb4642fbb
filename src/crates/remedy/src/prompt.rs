//! Instruction text sent to the generator.

/// Build the one-shot prompt for `disease`.
///
/// `disease` is expected to be normalized already. The same input always
/// yields the same prompt.
pub fn build_prompt(disease: &str) -> String {
    format!(
        "As a medical professional, recommend a specific treatment (e.g., medication, therapy, or lifestyle change) \
         for a patient diagnosed with the following disease in one concise sentence. \
         For example, for hypertension, you might say: 'Use ACE inhibitors like lisinopril and maintain a low-sodium diet.' \
         Now, recommend a treatment for {}: ",
        disease
    )
}

/// Remove the prompt when the generator echoed it back verbatim.
///
/// Only an exact prefix is stripped; the rest is trimmed either way.
pub fn strip_prompt_echo(prompt: &str, output: &str) -> String {
    output
        .strip_prefix(prompt)
        .unwrap_or(output)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_ends_with_disease() {
        let prompt = build_prompt("gout");
        assert!(prompt.starts_with("As a medical professional"));
        assert!(prompt.contains("'Use ACE inhibitors like lisinopril and maintain a low-sodium diet.'"));
        assert!(prompt.ends_with("Now, recommend a treatment for gout: "));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt("lung cancer"), build_prompt("lung cancer"));
    }

    #[test]
    fn test_echo_stripped() {
        let prompt = build_prompt("gout");
        let output = format!("{}Use colchicine for flares. ", prompt);
        assert_eq!(strip_prompt_echo(&prompt, &output), "Use colchicine for flares.");
    }

    #[test]
    fn test_partial_echo_kept() {
        let prompt = build_prompt("gout");
        let output = "As a medical professional, I suggest rest.";
        assert_eq!(strip_prompt_echo(&prompt, output), output);
    }
}
