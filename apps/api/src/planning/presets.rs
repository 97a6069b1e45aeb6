//! Curated design presets for the offline planner.
//!
//! Every palette passes the render contract (checked in the tests below).

use crate::models::render_config::{CardStyle, ExperienceStyle, HeroVariant};
use crate::models::SectionKind;
use crate::planning::design_plan::{Palette, SkillGrouping, Typography};

pub struct PalettePreset {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub background: &'static str,
    pub foreground: &'static str,
    pub primary: &'static str,
    pub primary_foreground: &'static str,
    pub accent: &'static str,
    pub muted: &'static str,
}

impl PalettePreset {
    pub fn palette(&self) -> Palette {
        Palette {
            background: self.background.to_string(),
            foreground: self.foreground.to_string(),
            primary: self.primary.to_string(),
            primary_foreground: self.primary_foreground.to_string(),
            accent: self.accent.to_string(),
            muted: self.muted.to_string(),
        }
    }
}

pub const PALETTES: &[PalettePreset] = &[
    PalettePreset {
        name: "Slate",
        keywords: &["calm", "technical", "clear"],
        background: "#ffffff",
        foreground: "#0f172a",
        primary: "#1d4ed8",
        primary_foreground: "#ffffff",
        accent: "#eff6ff",
        muted: "#64748b",
    },
    PalettePreset {
        name: "Ink",
        keywords: &["focused", "modern", "night"],
        background: "#0b1220",
        foreground: "#e2e8f0",
        primary: "#38bdf8",
        primary_foreground: "#0b1220",
        accent: "#1e293b",
        muted: "#94a3b8",
    },
    PalettePreset {
        name: "Forest",
        keywords: &["grounded", "steady", "natural"],
        background: "#f7faf7",
        foreground: "#14281d",
        primary: "#166534",
        primary_foreground: "#ffffff",
        accent: "#dcfce7",
        muted: "#4b5563",
    },
    PalettePreset {
        name: "Ember",
        keywords: &["warm", "energetic", "bold"],
        background: "#fffaf5",
        foreground: "#2b1a10",
        primary: "#b45309",
        primary_foreground: "#ffffff",
        accent: "#ffedd5",
        muted: "#78716c",
    },
    PalettePreset {
        name: "Plum",
        keywords: &["creative", "expressive", "refined"],
        background: "#faf5ff",
        foreground: "#2e1065",
        primary: "#6d28d9",
        primary_foreground: "#ffffff",
        accent: "#ede9fe",
        muted: "#6b7280",
    },
];

pub const TYPE_PAIRS: &[(&str, &str)] = &[
    ("Inter", "Inter"),
    ("Fraunces", "Inter"),
    ("Space Grotesk", "IBM Plex Sans"),
    ("Playfair Display", "Source Sans 3"),
];

pub fn typography(index: usize) -> Typography {
    let (heading, body) = TYPE_PAIRS[index % TYPE_PAIRS.len()];
    Typography {
        heading: heading.to_string(),
        body: body.to_string(),
        feature: None,
    }
}

pub const RADII_REM: &[f64] = &[0.0, 0.375, 0.75, 1.25];

pub const HERO_VARIANTS: &[HeroVariant] = &[HeroVariant::Center, HeroVariant::Left];
pub const CARD_STYLES: &[CardStyle] = &[CardStyle::Solid, CardStyle::Outline];
pub const EXPERIENCE_STYLES: &[ExperienceStyle] =
    &[ExperienceStyle::Timeline, ExperienceStyle::Cards];
pub const SKILL_GROUPINGS: &[SkillGrouping] = &[SkillGrouping::CoreFirst, SkillGrouping::Mixed];
pub const PROJECT_COLUMNS: &[u8] = &[2, 3];

pub const CTA_LABELS: &[&str] = &["Contact Me", "Hire Me", "Let's talk"];

/// Hero always leads and contact always closes; the middle varies.
pub const SECTION_ORDERS: &[[SectionKind; 7]] = &[
    [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Projects,
        SectionKind::Experience,
        SectionKind::Skills,
        SectionKind::Education,
        SectionKind::Contact,
    ],
    [
        SectionKind::Hero,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::About,
        SectionKind::Education,
        SectionKind::Contact,
    ],
    [
        SectionKind::Hero,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::About,
        SectionKind::Contact,
    ],
];
