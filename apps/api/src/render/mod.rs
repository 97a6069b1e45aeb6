//! Page renderer: (record, render configuration) → ordered view models for the live preview.
//!
//! Pure and synchronous. Omission rules:
//! - projects: hidden unless at least one project has a name; unnamed projects are skipped
//! - experience, education, skills: hidden when empty
//! - about: hidden without a summary
//! - contact: hidden without any channel
//!
//! Truncation: experience highlights stop at `bulletsMax`, skills (core then
//! tools) stop at `visibleMax`; unset or zero means no cap.

pub mod format;

use serde::Serialize;

use crate::models::render_config::{
    effective_cap, CardStyle, ExperienceParams, ExperienceStyle, HeroParams, HeroVariant,
    ProjectsParams, SkillsParams,
};
use crate::models::{RenderConfig, ResumeData, Section, SectionKind, Theme};
use format::Link;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub theme: Theme,
    pub sections: Vec<RenderedSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderedSection {
    Hero(HeroView),
    Projects(ProjectsView),
    Experience(ExperienceView),
    Skills(SkillsView),
    About(AboutView),
    Education(EducationView),
    Contact(ContactView),
}

impl RenderedSection {
    pub fn kind(&self) -> SectionKind {
        match self {
            RenderedSection::Hero(_) => SectionKind::Hero,
            RenderedSection::Projects(_) => SectionKind::Projects,
            RenderedSection::Experience(_) => SectionKind::Experience,
            RenderedSection::Skills(_) => SectionKind::Skills,
            RenderedSection::About(_) => SectionKind::About,
            RenderedSection::Education(_) => SectionKind::Education,
            RenderedSection::Contact(_) => SectionKind::Contact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkView {
    pub label: String,
    pub text: String,
    pub href: String,
}

impl From<Link> for LinkView {
    fn from(link: Link) -> Self {
        Self {
            label: link.label.to_string(),
            text: link.text,
            href: link.href,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Avatar {
    Image { url: String },
    Initials { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaView {
    pub label: String,
    /// `None` renders as a disabled button.
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroView {
    pub variant: HeroVariant,
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<Avatar>,
    pub cta: Option<CtaView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCard {
    pub name: String,
    pub description: Option<String>,
    pub tech: Vec<String>,
    pub links: Vec<LinkView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectsView {
    pub card_style: CardStyle,
    pub columns: u8,
    pub projects: Vec<ProjectCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub dates: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceView {
    pub style: ExperienceStyle,
    pub items: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillsView {
    pub skills: Vec<String>,
    /// Skills cut by `visibleMax`.
    pub hidden_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutView {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationEntry {
    pub line: String,
    pub highlights: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationView {
    pub items: Vec<EducationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactView {
    pub links: Vec<LinkView>,
}

/// Renders sections in configuration order. Duplicate kinds render once.
pub fn render_page(record: &ResumeData, config: &RenderConfig) -> Vec<RenderedSection> {
    config
        .effective_sections()
        .filter_map(|section| render_section(record, section))
        .collect()
}

pub fn render_preview(record: &ResumeData, config: &RenderConfig) -> RenderedPage {
    RenderedPage {
        theme: config.theme.clone(),
        sections: render_page(record, config),
    }
}

fn render_section(record: &ResumeData, section: &Section) -> Option<RenderedSection> {
    match section {
        Section::Hero(params) => Some(RenderedSection::Hero(hero(record, params))),
        Section::Projects(params) => projects(record, params).map(RenderedSection::Projects),
        Section::Experience(params) => experience(record, params).map(RenderedSection::Experience),
        Section::Skills(params) => skills(record, params).map(RenderedSection::Skills),
        Section::About => record.summary.as_ref().map(|summary| {
            RenderedSection::About(AboutView {
                summary: summary.clone(),
            })
        }),
        Section::Education => education(record).map(RenderedSection::Education),
        Section::Contact => {
            let links = format::contact_links(&record.contact);
            (!links.is_empty()).then(|| {
                RenderedSection::Contact(ContactView {
                    links: links.into_iter().map(LinkView::from).collect(),
                })
            })
        }
    }
}

fn hero(record: &ResumeData, params: &HeroParams) -> HeroView {
    let headshot = record.assets.headshot_url.as_deref().and_then(format::image_src);
    let avatar = match headshot {
        Some(url) => Some(Avatar::Image { url }),
        None => record
            .name
            .as_deref()
            .and_then(format::initials)
            .map(|text| Avatar::Initials { text }),
    };

    let cta = params
        .cta_label
        .as_ref()
        .filter(|label| !label.trim().is_empty())
        .map(|label| CtaView {
            label: label.clone(),
            href: format::cta_href(&record.contact),
        });

    HeroView {
        variant: params.variant,
        name: record.name.clone(),
        headline: record.headline.clone(),
        location: record.location.clone().filter(|_| params.show_location),
        avatar,
        cta,
    }
}

fn projects(record: &ResumeData, params: &ProjectsParams) -> Option<ProjectsView> {
    let cards: Vec<ProjectCard> = record
        .projects
        .iter()
        .filter_map(|project| {
            let name = project.name.clone()?;
            Some(ProjectCard {
                name,
                description: project.description.clone(),
                tech: project.tech.clone(),
                links: format::project_links(&project.links)
                    .into_iter()
                    .map(LinkView::from)
                    .collect(),
            })
        })
        .collect();

    if cards.is_empty() {
        return None;
    }
    Some(ProjectsView {
        card_style: params.card_style,
        columns: params.columns(),
        projects: cards,
    })
}

fn experience(record: &ResumeData, params: &ExperienceParams) -> Option<ExperienceView> {
    if record.experience.is_empty() {
        return None;
    }
    let cap = effective_cap(params.bullets_max).unwrap_or(usize::MAX);
    let items = record
        .experience
        .iter()
        .map(|item| ExperienceEntry {
            title: format::experience_title(item),
            dates: format::experience_dates(item),
            highlights: item.highlights.iter().take(cap).cloned().collect(),
        })
        .collect();

    Some(ExperienceView {
        style: params.style,
        items,
    })
}

fn skills(record: &ResumeData, params: &SkillsParams) -> Option<SkillsView> {
    let all: Vec<&String> = record
        .skills_core
        .iter()
        .chain(record.skills_tools.iter())
        .collect();
    if all.is_empty() {
        return None;
    }
    let visible = effective_cap(params.visible_max).unwrap_or(all.len()).min(all.len());
    Some(SkillsView {
        skills: all[..visible].iter().map(|s| s.to_string()).collect(),
        hidden_count: all.len() - visible,
    })
}

fn education(record: &ResumeData) -> Option<EducationView> {
    if record.education.is_empty() {
        return None;
    }
    Some(EducationView {
        items: record
            .education
            .iter()
            .map(|item| EducationEntry {
                line: format::education_line(item),
                highlights: format::education_highlights(item),
            })
            .collect(),
    })
}
