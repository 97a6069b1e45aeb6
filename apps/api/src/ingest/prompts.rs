// Prompt constants for résumé extraction.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{
    labelled_block, GROUNDING_INSTRUCTION, JSON_ONLY_INSTRUCTION, RESUME_SCHEMA,
};

/// Character budget for each rewritten achievement bullet.
pub const BULLET_CHAR_BUDGET: usize = 160;

const EXTRACTOR_ROLE: &str = "You are a resume-to-portfolio transformer. \
    Given the user's RESUME TEXT, output a SINGLE JSON object exactly matching this schema:";

/// Builds the extraction prompt: fixed instruction block followed by the raw text.
pub fn extraction_prompt(resume_text: &str) -> String {
    format!(
        "{EXTRACTOR_ROLE}\n\n{RESUME_SCHEMA}\n\nRules:\n\
        - {GROUNDING_INSTRUCTION}\n\
        - Rewrite responsibilities into 3-5 achievement bullets per role \
        (at most {BULLET_CHAR_BUDGET} characters each, active verbs).\n\
        - If a value is unknown, use null or an empty array.\n\
        - {JSON_ONLY_INSTRUCTION}\n\n{}",
        labelled_block("RESUME_TEXT", resume_text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_ends_with_resume_text() {
        let prompt = extraction_prompt("Ada Lovelace\nAnalyst, 1843");
        assert!(prompt.contains("3-5 achievement bullets"));
        assert!(prompt.contains("160 characters"));
        assert!(prompt.trim_end().ends_with("Ada Lovelace\nAnalyst, 1843"));
    }
}
