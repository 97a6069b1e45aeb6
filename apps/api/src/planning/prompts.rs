// Prompt constants for the planning stages: brief, design plan, UI build.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{labelled_block, GROUNDING_INSTRUCTION, JSON_ONLY_INSTRUCTION};

const BRIEF_ROLE: &str = "You are a portfolio product planner. You DO NOT write code. \
    Write a clear product brief for a personal portfolio site generated from the resume below.";

const BRIEF_SECTIONS: &str = "\
Return ONLY a markdown document titled \"prd.md\" with these sections in order:
1. Overview & Objective
2. Target Audience & Use Cases
3. Information Architecture
4. Section-by-Section Content Outline (map each resume field to a site section)
5. Design Direction (tone, palette mood, typography mood)
6. Accessibility & Content Quality
7. Out of Scope

Tailor emphasis to the resume's strengths and domain (developer, designer, student, ...).
Vary section order and hero style where the resume supports it.
No code, no CSS classes, no code fences.";

pub fn brief_prompt(resume_json: &str) -> String {
    format!(
        "{BRIEF_ROLE}\n\n{BRIEF_SECTIONS}\n{GROUNDING_INSTRUCTION}\n\n{}",
        labelled_block("RESUME_JSON", resume_json)
    )
}

const DESIGN_ROLE: &str = "You are a senior product designer. \
    Plan a distinctive but accessible visual system and layout for a resume-to-portfolio site.";

const DESIGN_SHAPE: &str = r#"Return ONLY JSON with this exact shape:
{
  "seed": number,
  "theme": {
    "brand": { "name": string, "keywords": string[] },
    "palette": {
      "background": string, "foreground": string,
      "primary": string, "primaryForeground": string,
      "accent": string, "muted": string
    },
    "typography": { "heading": string, "body": string, "feature": string|null },
    "radiusRem": number,
    "motion": { "reducedByDefault": boolean, "maxTranslatePx": number }
  },
  "layout": {
    "sectionOrder": ("hero"|"about"|"projects"|"experience"|"skills"|"education"|"contact")[],
    "heroVariant": "left"|"center",
    "projects": { "cardStyle": "solid"|"outline", "colsDesktop": 2|3 },
    "experience": { "style": "timeline"|"cards", "bulletsMax": number },
    "skills": { "grouping": "core-first"|"mixed", "visibleMax": number }
  }
}"#;

const DESIGN_RULES: &str = "\
Rules:
- Colors are hex strings. Foreground on background and primaryForeground on primary \
must reach a WCAG AA contrast ratio of at least 4.5.
- Choose palette and type that fit the resume's domain.
- Use the seed to vary choices so different seeds look different.
- radiusRem is between 0 and 2.";

pub fn design_prompt(resume_json: &str, brief_md: &str, seed: u32) -> String {
    format!(
        "{DESIGN_ROLE}\n\n{DESIGN_SHAPE}\n\n{DESIGN_RULES}\n- {JSON_ONLY_INSTRUCTION}\n\n{}\n{}\n{}",
        labelled_block("RESUME_JSON", resume_json),
        labelled_block("PRD_MD", brief_md),
        labelled_block("SEED", &seed.to_string()),
    )
}

const UI_ROLE: &str = "You are a UI assembly assistant. \
    Given a resume plus a design plan, produce the render configuration for the portfolio page.";

const UI_SHAPE: &str = r#"Return ONLY JSON with this shape:
{
  "theme": {
    "background": string, "foreground": string, "primary": string,
    "primaryForeground": string, "accent": string, "muted": string, "radius": number
  },
  "sections": [
    { "type": "hero", "variant": "left"|"center", "showLocation": boolean, "ctaLabel": string|null },
    { "type": "projects", "cardStyle": "solid"|"outline", "colsDesktop": 2|3 },
    { "type": "experience", "style": "timeline"|"cards", "bulletsMax": number },
    { "type": "skills", "visibleMax": number },
    { "type": "about" },
    { "type": "education" },
    { "type": "contact" }
  ]
}"#;

const UI_RULES: &str = "\
Rules:
- Respect the design plan's section order, variants and palette.
- If the resume lacks data for a section, omit that section.
- Keep ctaLabel short and human (for example \"Contact Me\" or \"Hire Me\").";

pub fn ui_prompt(resume_json: &str, design_plan_json: &str) -> String {
    format!(
        "{UI_ROLE}\n\n{UI_SHAPE}\n\n{UI_RULES}\n- {JSON_ONLY_INSTRUCTION}\n\n{}\n{}",
        labelled_block("RESUME_JSON", resume_json),
        labelled_block("DESIGN_PLAN", design_plan_json),
    )
}
