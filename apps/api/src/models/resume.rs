//! Normalized résumé record, the canonical shape every downstream stage consumes.
//!
//! Scalars are `Option<String>`: absent and empty are the same thing, so blank
//! strings are coerced to `None` on the way in. Sequences are always present and
//! default to empty. Construction from untrusted JSON goes through
//! `ingest::validation`, never through `serde_json` directly.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    #[serde(deserialize_with = "present_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub headline: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub summary: Option<String>,
    pub skills_core: Vec<String>,
    pub skills_tools: Vec<String>,
    pub experience: Vec<ExperienceItem>,
    pub projects: Vec<ProjectItem>,
    pub education: Vec<EducationItem>,
    pub awards: Vec<String>,
    pub certifications: Vec<String>,
    pub contact: Contact,
    pub assets: Assets,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    #[serde(deserialize_with = "present_text")]
    pub role: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub company: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub start: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub end: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    #[serde(deserialize_with = "present_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub description: Option<String>,
    pub tech: Vec<String>,
    pub links: ProjectLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLinks {
    #[serde(deserialize_with = "present_text")]
    pub live: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub repo: Option<String>,
    #[serde(rename = "case", deserialize_with = "present_text")]
    pub case_study: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    #[serde(deserialize_with = "present_text")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub school: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub year: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(deserialize_with = "present_text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub website: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub github: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub linkedin: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assets {
    #[serde(deserialize_with = "present_text")]
    pub headshot_url: Option<String>,
    #[serde(deserialize_with = "present_text")]
    pub logo_url: Option<String>,
}

/// Accepts `null`, a missing field, or a string; blank strings collapse to `None`.
/// Any other JSON type is a hard error.
fn present_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
