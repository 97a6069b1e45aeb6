//! Render configuration: theme tokens plus the ordered list of page sections.
//!
//! `Section` is closed over the seven section kinds. Section lists coming from a
//! planner are decoded leniently: entries with an unknown or missing `type` are
//! skipped, capitalised tags (`"Hero"`) and a nested `props` object are accepted.
//! A known tag with malformed parameters still fails the whole configuration.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, deserialize_with = "known_sections")]
    pub sections: Vec<Section>,
}

impl RenderConfig {
    /// Sections in render order, keeping only the first occurrence of each kind.
    pub fn effective_sections(&self) -> impl Iterator<Item = &Section> + '_ {
        let mut seen = HashSet::new();
        self.sections.iter().filter(move |section| {
            let first = seen.insert(section.kind());
            if !first {
                debug!("Skipping duplicate {} section", section.kind());
            }
            first
        })
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Color, typography and radius tokens. Colors are CSS color strings; `radius` is in rem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub background: String,
    pub foreground: String,
    pub primary: String,
    pub primary_foreground: String,
    pub accent: String,
    pub muted: String,
    pub radius: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            foreground: "#0b1220".to_string(),
            primary: "#0b1220".to_string(),
            primary_foreground: "#ffffff".to_string(),
            accent: "#f6f8fb".to_string(),
            muted: "#5b6474".to_string(),
            radius: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    Projects,
    Experience,
    Skills,
    About,
    Education,
    Contact,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Hero,
        SectionKind::Projects,
        SectionKind::Experience,
        SectionKind::Skills,
        SectionKind::About,
        SectionKind::Education,
        SectionKind::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::Projects => "projects",
            SectionKind::Experience => "experience",
            SectionKind::Skills => "skills",
            SectionKind::About => "about",
            SectionKind::Education => "education",
            SectionKind::Contact => "contact",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        SectionKind::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Hero => "Introduction",
            SectionKind::Projects => "Projects",
            SectionKind::Experience => "Experience",
            SectionKind::Skills => "Skills",
            SectionKind::About => "About",
            SectionKind::Education => "Education",
            SectionKind::Contact => "Contact",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    Hero(HeroParams),
    Projects(ProjectsParams),
    Experience(ExperienceParams),
    Skills(SkillsParams),
    About,
    Education,
    Contact,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Hero(_) => SectionKind::Hero,
            Section::Projects(_) => SectionKind::Projects,
            Section::Experience(_) => SectionKind::Experience,
            Section::Skills(_) => SectionKind::Skills,
            Section::About => SectionKind::About,
            Section::Education => SectionKind::Education,
            Section::Contact => SectionKind::Contact,
        }
    }

    /// A section of the given kind with default parameters.
    pub fn plain(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Hero => Section::Hero(HeroParams::default()),
            SectionKind::Projects => Section::Projects(ProjectsParams::default()),
            SectionKind::Experience => Section::Experience(ExperienceParams::default()),
            SectionKind::Skills => Section::Skills(SkillsParams::default()),
            SectionKind::About => Section::About,
            SectionKind::Education => Section::Education,
            SectionKind::Contact => Section::Contact,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroParams {
    pub variant: HeroVariant,
    pub show_location: bool,
    pub cta_label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeroVariant {
    #[serde(alias = "left-avatar", alias = "split")]
    Left,
    #[default]
    #[serde(alias = "centered")]
    Center,
}

pub const DEFAULT_PROJECT_COLUMNS: u8 = 2;
pub const MAX_PROJECT_COLUMNS: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectsParams {
    pub card_style: CardStyle,
    /// Kept wide so out-of-range model values decode and get clamped.
    pub cols_desktop: Option<i64>,
}

impl ProjectsParams {
    /// Column count clamped to `1..=MAX_PROJECT_COLUMNS`; unset means two.
    pub fn columns(&self) -> u8 {
        let cols = self
            .cols_desktop
            .unwrap_or(i64::from(DEFAULT_PROJECT_COLUMNS))
            .clamp(1, i64::from(MAX_PROJECT_COLUMNS));
        u8::try_from(cols).unwrap_or(MAX_PROJECT_COLUMNS)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    #[default]
    #[serde(alias = "flat", alias = "elevated")]
    Solid,
    #[serde(alias = "bordered")]
    Outline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceParams {
    pub style: ExperienceStyle,
    pub bullets_max: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceStyle {
    #[default]
    Timeline,
    Cards,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillsParams {
    pub visible_max: Option<usize>,
}

/// Resolves an optional cap: unset and zero both mean "no cap".
pub fn effective_cap(cap: Option<usize>) -> Option<usize> {
    cap.filter(|&n| n > 0)
}

fn known_sections<'de, D>(deserializer: D) -> Result<Vec<Section>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    let mut sections = Vec::with_capacity(raw.len());

    for entry in raw {
        let Some(normalized) = normalize_section_entry(entry) else {
            continue;
        };
        let section = serde_json::from_value(normalized).map_err(serde::de::Error::custom)?;
        sections.push(section);
    }

    Ok(sections)
}

/// Lowercases the tag and lifts `props` to the top level. `None` for entries to skip.
fn normalize_section_entry(entry: Value) -> Option<Value> {
    let Value::Object(mut object) = entry else {
        debug!("Skipping non-object section entry");
        return None;
    };

    let tag = object.get("type").and_then(Value::as_str).map(str::to_string);
    let Some(kind) = tag.as_deref().and_then(SectionKind::parse) else {
        debug!("Skipping unknown section type {:?}", tag);
        return None;
    };

    let mut normalized = Map::new();
    if let Some(Value::Object(props)) = object.remove("props") {
        normalized.extend(props);
    }
    object.remove("type");
    normalized.extend(object);
    normalized.insert("type".to_string(), Value::String(kind.as_str().to_string()));

    Some(Value::Object(normalized))
}
