// Shared prompt fragments and prompt-building utilities.
// Each stage that calls the model defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Appended to every prompt that expects a JSON reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction shared by every stage that rewrites résumé content.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Do NOT invent facts. Only transform what is present in the input. \
    Keep every number, percentage and metric exactly as written.";

/// The résumé schema as shown to the model. Field names match `ResumeData`.
pub const RESUME_SCHEMA: &str = r#"{
  "name": string|null,
  "headline": string|null,
  "location": string|null,
  "summary": string|null,
  "skills_core": string[],
  "skills_tools": string[],
  "experience": [{"role": string|null, "company": string|null, "start": string|null, "end": string|null, "highlights": string[]}],
  "projects": [{"name": string|null, "description": string|null, "tech": string[], "links": {"live": string|null, "repo": string|null, "case": string|null}}],
  "education": [{"degree": string|null, "school": string|null, "year": string|null, "highlights": string[]}],
  "awards": string[],
  "certifications": string[],
  "contact": {"email": string|null, "phone": string|null, "website": string|null, "github": string|null, "linkedin": string|null, "twitter": string|null},
  "assets": {"headshot_url": string|null, "logo_url": string|null}
}"#;

/// Labels a block of input so prompts read consistently across stages.
pub fn labelled_block(label: &str, body: &str) -> String {
    format!("{label}:\n{body}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_every_top_level_field() {
        let value = serde_json::to_value(crate::models::ResumeData::default()).unwrap();
        for field in value.as_object().unwrap().keys() {
            assert!(
                RESUME_SCHEMA.contains(&format!("\"{field}\"")),
                "schema text is missing {field}"
            );
        }
    }
}
