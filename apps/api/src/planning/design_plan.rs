//! Design plan: the theme spec plus layout plan produced between the brief and
//! the render configuration.
//!
//! Every field defaults so a partial plan from the model still decodes; the
//! contract check on the derived `RenderConfig` decides whether it is usable.

use serde::{Deserialize, Serialize};

use crate::models::render_config::{
    CardStyle, ExperienceParams, ExperienceStyle, HeroParams, HeroVariant, ProjectsParams,
    SkillsParams,
};
use crate::models::{RenderConfig, Section, SectionKind, Theme};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignPlan {
    pub seed: u32,
    pub theme: ThemeSpec,
    pub layout: LayoutPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeSpec {
    pub brand: Brand,
    pub palette: Palette,
    pub typography: Typography,
    pub radius_rem: f64,
    pub motion: Motion,
}

impl Default for ThemeSpec {
    fn default() -> Self {
        Self {
            brand: Brand::default(),
            palette: Palette::default(),
            typography: Typography::default(),
            radius_rem: Theme::default().radius,
            motion: Motion::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brand {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    pub background: String,
    pub foreground: String,
    pub primary: String,
    pub primary_foreground: String,
    pub accent: String,
    pub muted: String,
}

impl Default for Palette {
    fn default() -> Self {
        let theme = Theme::default();
        Self {
            background: theme.background,
            foreground: theme.foreground,
            primary: theme.primary,
            primary_foreground: theme.primary_foreground,
            accent: theme.accent,
            muted: theme.muted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub heading: String,
    pub body: String,
    pub feature: Option<String>,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            heading: "Inter".to_string(),
            body: "Inter".to_string(),
            feature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Motion {
    pub reduced_by_default: bool,
    pub max_translate_px: f64,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            reduced_by_default: false,
            max_translate_px: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutPlan {
    /// Section tags in display order. Kept as strings: the model may name
    /// sections this service does not render, and those are dropped later.
    pub section_order: Vec<String>,
    pub hero_variant: HeroVariant,
    pub projects: ProjectsLayout,
    pub experience: ExperienceLayout,
    pub skills: SkillsLayout,
}

impl Default for LayoutPlan {
    fn default() -> Self {
        Self {
            section_order: SectionKind::ALL
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            hero_variant: HeroVariant::default(),
            projects: ProjectsLayout::default(),
            experience: ExperienceLayout::default(),
            skills: SkillsLayout::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectsLayout {
    pub card_style: CardStyle,
    pub cols_desktop: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceLayout {
    pub style: ExperienceStyle,
    pub bullets_max: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillsLayout {
    pub grouping: SkillGrouping,
    pub visible_max: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillGrouping {
    #[default]
    CoreFirst,
    Mixed,
}

impl DesignPlan {
    pub fn theme(&self) -> Theme {
        let p = &self.theme.palette;
        Theme {
            background: p.background.clone(),
            foreground: p.foreground.clone(),
            primary: p.primary.clone(),
            primary_foreground: p.primary_foreground.clone(),
            accent: p.accent.clone(),
            muted: p.muted.clone(),
            radius: self.theme.radius_rem,
        }
    }

    /// Section kinds named by the layout, in order. Unknown names are skipped.
    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.layout
            .section_order
            .iter()
            .filter_map(|name| SectionKind::parse(name))
            .collect()
    }

    /// Builds a render configuration straight from the plan, carrying the
    /// layout variants into each section's parameters.
    pub fn to_render_config(&self, cta_label: Option<&str>) -> RenderConfig {
        let layout = &self.layout;
        let sections = self
            .section_kinds()
            .into_iter()
            .map(|kind| match kind {
                SectionKind::Hero => Section::Hero(HeroParams {
                    variant: layout.hero_variant,
                    show_location: true,
                    cta_label: cta_label.map(str::to_string),
                }),
                SectionKind::Projects => Section::Projects(ProjectsParams {
                    card_style: layout.projects.card_style,
                    cols_desktop: layout.projects.cols_desktop,
                }),
                SectionKind::Experience => Section::Experience(ExperienceParams {
                    style: layout.experience.style,
                    bullets_max: layout.experience.bullets_max,
                }),
                SectionKind::Skills => Section::Skills(SkillsParams {
                    visible_max: layout.skills.visible_max,
                }),
                other => Section::plain(other),
            })
            .collect();

        RenderConfig {
            theme: self.theme(),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_plan_with_vendor_variant_names_decodes() {
        let plan: DesignPlan = serde_json::from_value(json!({
            "seed": 42,
            "theme": {
                "brand": {"name": "Ada", "keywords": ["precise"]},
                "palette": {"background": "#fff", "foreground": "#111", "primary": "#1d4ed8",
                            "primaryForeground": "#fff", "accent": "#eff6ff", "muted": "#64748b"},
                "typography": {"heading": "Fraunces", "body": "Inter", "feature": null},
                "radiusRem": 0.5,
                "motion": {"reducedByDefault": true, "maxTranslatePx": 6}
            },
            "layout": {
                "sectionOrder": ["hero", "projects", "testimonials", "contact"],
                "heroVariant": "left-avatar",
                "projects": {"cardStyle": "elevated", "colsDesktop": 3},
                "experience": {"style": "cards", "bulletsMax": 5},
                "skills": {"grouping": "mixed", "visibleMax": 12}
            }
        }))
        .unwrap();

        assert_eq!(plan.layout.hero_variant, HeroVariant::Left);
        assert_eq!(plan.layout.projects.card_style, CardStyle::Solid);
        assert_eq!(plan.layout.skills.grouping, SkillGrouping::Mixed);
        assert_eq!(
            plan.section_kinds(),
            vec![SectionKind::Hero, SectionKind::Projects, SectionKind::Contact]
        );
    }

    #[test]
    fn test_to_render_config_carries_layout_and_theme() {
        let mut plan = DesignPlan::default();
        plan.theme.radius_rem = 1.25;
        plan.layout.section_order = vec!["Experience".into(), "hero".into()];
        plan.layout.experience.bullets_max = Some(3);

        let config = plan.to_render_config(Some("Get in touch"));
        assert_eq!(config.theme.radius, 1.25);
        assert_eq!(
            config.sections[0],
            Section::Experience(ExperienceParams {
                style: ExperienceStyle::Timeline,
                bullets_max: Some(3),
            })
        );
        let Section::Hero(hero) = &config.sections[1] else {
            panic!("expected hero");
        };
        assert_eq!(hero.cta_label.as_deref(), Some("Get in touch"));
    }
}
