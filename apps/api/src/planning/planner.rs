//! Planner: a pluggable, trait-based backend that turns a record into a brief,
//! a design plan and a render configuration.
//!
//! Default: `LlmPlanner` (three sequential model calls).
//! Offline: `PresetPlanner` (seeded choice among curated presets, no credential).
//!
//! `AppState` holds an `Arc<dyn Planner>`, chosen at startup via `PLANNER_BACKEND`.

use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{
    parse_json_reply, strip_markdown_fences, Credential, TextModel, DESIGN_TEMPERATURE,
};
use crate::models::{RenderConfig, ResumeData};
use crate::planning::design_plan::{Brand, DesignPlan, LayoutPlan, ThemeSpec};
use crate::planning::presets;
use crate::planning::prompts::{brief_prompt, design_prompt, ui_prompt};

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all planner backends)
// ────────────────────────────────────────────────────────────────────────────

/// A design plan and the render configuration built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub plan: DesignPlan,
    pub render_config: RenderConfig,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The planner trait. Implement this to swap backends without touching the
/// pipeline or handlers.
///
/// `credential` is `None` when the session has no key; backends that need
/// one return `MissingCredential` before doing any I/O.
#[async_trait]
pub trait Planner: Send + Sync {
    fn backend(&self) -> &'static str;

    fn requires_credential(&self) -> bool;

    async fn write_brief(
        &self,
        credential: Option<&Credential>,
        record: &ResumeData,
    ) -> Result<String, AppError>;

    async fn design(
        &self,
        credential: Option<&Credential>,
        record: &ResumeData,
        brief_md: &str,
        seed: u32,
    ) -> Result<Design, AppError>;
}

fn resume_json(record: &ResumeData) -> Result<String, AppError> {
    serde_json::to_string_pretty(record).map_err(|e| AppError::Internal(e.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// LlmPlanner
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmPlanner {
    model: Arc<dyn TextModel>,
}

impl LlmPlanner {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    async fn generate(&self, credential: &Credential, prompt: String) -> Result<String, AppError> {
        let request = credential.request(prompt, DESIGN_TEMPERATURE);
        Ok(self.model.generate(&credential.key, &request).await?)
    }
}

fn require(credential: Option<&Credential>) -> Result<&Credential, AppError> {
    credential.ok_or(AppError::MissingCredential)
}

#[async_trait]
impl Planner for LlmPlanner {
    fn backend(&self) -> &'static str {
        "llm"
    }

    fn requires_credential(&self) -> bool {
        true
    }

    async fn write_brief(
        &self,
        credential: Option<&Credential>,
        record: &ResumeData,
    ) -> Result<String, AppError> {
        let credential = require(credential)?;
        info!("Planning brief with {}", credential.model);

        let reply = self
            .generate(credential, brief_prompt(&resume_json(record)?))
            .await?;
        let brief = strip_markdown_fences(&reply);
        if brief.is_empty() {
            return Err(AppError::ResponseParseFailed(
                "model returned an empty brief".to_string(),
            ));
        }
        Ok(brief.to_string())
    }

    async fn design(
        &self,
        credential: Option<&Credential>,
        record: &ResumeData,
        brief_md: &str,
        seed: u32,
    ) -> Result<Design, AppError> {
        let credential = require(credential)?;
        let record_json = resume_json(record)?;

        info!("Planning design (seed {seed}) with {}", credential.model);
        let reply = self
            .generate(credential, design_prompt(&record_json, brief_md, seed))
            .await?;
        let mut plan: DesignPlan = parse_json_reply(&reply)?;
        plan.seed = seed;

        info!("Building render configuration");
        let plan_json = serde_json::to_string_pretty(&plan).map_err(|e| AppError::Internal(e.into()))?;
        let reply = self
            .generate(credential, ui_prompt(&record_json, &plan_json))
            .await?;
        let raw: Value = parse_json_reply(&reply)?;
        let render_config = RenderConfig::from_value(normalize_ui_reply(raw, &plan))
            .map_err(|e| AppError::ResponseParseFailed(format!("render configuration: {e}")))?;

        Ok(Design {
            plan,
            render_config,
        })
    }
}

/// Brings a UI-builder reply into `RenderConfig` shape: a nested `palette`
/// and `radiusRem` are flattened into the theme, missing parts come from the
/// plan, and a hero's CTA may arrive as `primaryCta` or `microcopy.ctaLabel`.
fn normalize_ui_reply(mut raw: Value, plan: &DesignPlan) -> Value {
    let Some(object) = raw.as_object_mut() else {
        return raw;
    };

    let plan_config = plan.to_render_config(None);
    match object.get_mut("theme").and_then(Value::as_object_mut) {
        Some(theme) => {
            if let Some(Value::Object(palette)) = theme.remove("palette") {
                for (token, color) in palette {
                    theme.entry(token).or_insert(color);
                }
            }
            if let Some(radius) = theme.remove("radiusRem") {
                theme.entry("radius").or_insert(radius);
            }
            theme.remove("typography");
        }
        None => {
            object.insert("theme".to_string(), json!(plan_config.theme));
        }
    }

    if !object.contains_key("sections") {
        object.insert("sections".to_string(), json!(plan_config.sections));
    }

    let microcopy_cta = object
        .get("microcopy")
        .and_then(|m| m.get("ctaLabel"))
        .cloned();
    if let Some(Value::Array(sections)) = object.get_mut("sections") {
        for entry in sections.iter_mut() {
            let is_hero = entry
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case("hero"));
            if !is_hero {
                continue;
            }
            let target = if entry.get("props").is_some_and(Value::is_object) {
                &mut entry["props"]
            } else {
                entry
            };
            let Some(params) = target.as_object_mut() else {
                continue;
            };
            if !params.contains_key("ctaLabel") {
                let cta = params
                    .remove("primaryCta")
                    .or_else(|| microcopy_cta.clone());
                if let Some(cta) = cta {
                    params.insert("ctaLabel".to_string(), cta);
                }
            }
        }
    }

    raw
}

// ────────────────────────────────────────────────────────────────────────────
// PresetPlanner
// ────────────────────────────────────────────────────────────────────────────

/// Offline planner: deterministic for a given seed, never calls the model.
pub struct PresetPlanner;

#[async_trait]
impl Planner for PresetPlanner {
    fn backend(&self) -> &'static str {
        "preset"
    }

    fn requires_credential(&self) -> bool {
        false
    }

    async fn write_brief(
        &self,
        _credential: Option<&Credential>,
        record: &ResumeData,
    ) -> Result<String, AppError> {
        Ok(preset_brief(record))
    }

    async fn design(
        &self,
        _credential: Option<&Credential>,
        record: &ResumeData,
        _brief_md: &str,
        seed: u32,
    ) -> Result<Design, AppError> {
        let plan = preset_plan(record, seed);
        let mut rng = StdRng::seed_from_u64(u64::from(seed).wrapping_add(1));
        let cta = presets::CTA_LABELS.choose(&mut rng).copied();
        let render_config = plan.to_render_config(cta);
        Ok(Design {
            plan,
            render_config,
        })
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

pub fn preset_plan(record: &ResumeData, seed: u32) -> DesignPlan {
    let mut rng = StdRng::seed_from_u64(u64::from(seed));
    let palette = pick(&mut rng, presets::PALETTES);
    let order = pick(&mut rng, presets::SECTION_ORDERS);

    let mut layout = LayoutPlan {
        section_order: order.iter().map(|k| k.as_str().to_string()).collect(),
        hero_variant: *pick(&mut rng, presets::HERO_VARIANTS),
        ..LayoutPlan::default()
    };
    layout.projects.card_style = *pick(&mut rng, presets::CARD_STYLES);
    layout.projects.cols_desktop = Some(i64::from(*pick(&mut rng, presets::PROJECT_COLUMNS)));
    layout.experience.style = *pick(&mut rng, presets::EXPERIENCE_STYLES);
    layout.experience.bullets_max = Some(rng.random_range(3..=5));
    layout.skills.grouping = *pick(&mut rng, presets::SKILL_GROUPINGS);
    layout.skills.visible_max = Some(rng.random_range(8..=16));

    let theme = ThemeSpec {
        brand: Brand {
            name: record.name.clone().unwrap_or_else(|| "Portfolio".to_string()),
            keywords: std::iter::once(palette.name)
                .chain(palette.keywords.iter().copied())
                .map(str::to_lowercase)
                .collect(),
        },
        palette: palette.palette(),
        typography: presets::typography(rng.random_range(0..presets::TYPE_PAIRS.len())),
        radius_rem: *pick(&mut rng, presets::RADII_REM),
        ..ThemeSpec::default()
    };

    DesignPlan {
        seed,
        theme,
        layout,
    }
}

/// A short markdown brief assembled from the record alone.
pub fn preset_brief(record: &ResumeData) -> String {
    let name = record.name.as_deref().unwrap_or("the candidate");
    let mut md = format!("# prd.md\n\n## 1. Overview & Objective\n\nA personal portfolio for {name}");
    if let Some(headline) = &record.headline {
        md.push_str(&format!(", {headline}"));
    }
    md.push_str(".\n\n## 2. Content Outline\n\n");

    let outline = [
        ("About", record.summary.is_some(), "summary paragraph"),
        (
            "Projects",
            record.projects.iter().any(|p| p.name.is_some()),
            "named projects with tech tags and links",
        ),
        (
            "Experience",
            !record.experience.is_empty(),
            "roles with achievement bullets",
        ),
        (
            "Skills",
            !record.skills_core.is_empty() || !record.skills_tools.is_empty(),
            "core skills, then tools",
        ),
        (
            "Education",
            !record.education.is_empty(),
            "degrees and schools",
        ),
    ];
    for (section, present, content) in outline {
        if present {
            md.push_str(&format!("- **{section}**: {content}\n"));
        }
    }

    let mut part = 3;
    let recognition: Vec<&String> = record
        .awards
        .iter()
        .chain(&record.certifications)
        .collect();
    if !recognition.is_empty() {
        md.push_str(&format!("\n## {part}. Recognition\n\n"));
        for item in recognition {
            md.push_str(&format!("- {item}\n"));
        }
        part += 1;
    }

    md.push_str(&format!(
        "\n## {part}. Accessibility\n\nText meets WCAG AA contrast; motion respects reduced-motion settings.\n"
    ));
    md
}
