//! `index.html` for the exported site.
//!
//! Builds markup directly from the record and configuration; it does not go
//! through the live renderer's view models. Every interpolated value passes
//! through `escape_html` or `safe_href`. Each page section carries a
//! `data-section` attribute naming its kind.

use std::fmt::Write as _;

use crate::export::escape::{escape_html, safe_href};
use crate::models::render_config::{
    effective_cap, CardStyle, ExperienceParams, ExperienceStyle, HeroParams, HeroVariant,
    ProjectsParams, SkillsParams,
};
use crate::models::{RenderConfig, ResumeData, Section, SectionKind};
use crate::render::format;

pub fn index_html(record: &ResumeData, config: &RenderConfig, year: i32) -> String {
    let title = match &record.name {
        Some(name) => format!("{} — Portfolio", escape_html(name)),
        None => "Portfolio".to_string(),
    };

    let body: String = config
        .effective_sections()
        .filter_map(|section| section_markup(record, section))
        .collect();

    let footer = match &record.name {
        Some(name) => format!("© {year} {}. Built from resume.", escape_html(name)),
        None => format!("© {year}. Built from resume."),
    };

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\"/>\n\
        <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\"/>\n\
        <title>{title}</title>\n<link rel=\"stylesheet\" href=\"./styles.css\"/>\n</head>\n\
        <body>\n<main>\n{body}</main>\n<footer class=\"container\"><p>{footer}</p></footer>\n\
        </body>\n</html>\n"
    )
}

fn section_markup(record: &ResumeData, section: &Section) -> Option<String> {
    let (class, inner) = match section {
        Section::Hero(params) => (hero_class(params), hero(record, params)),
        Section::Projects(params) => ("projects container".to_string(), projects(record, params)?),
        Section::Experience(params) => {
            ("experience container".to_string(), experience(record, params)?)
        }
        Section::Skills(params) => ("skills container".to_string(), skills(record, params)?),
        Section::About => {
            let summary = record.summary.as_ref()?;
            (
                "about container".to_string(),
                format!("<p>{}</p>", escape_html(summary)),
            )
        }
        Section::Education => ("education container".to_string(), education(record)?),
        Section::Contact => ("contact container".to_string(), contact(record)?),
    };

    let kind = section.kind();
    let heading = match kind {
        SectionKind::Hero => String::new(),
        other => format!("<h2>{}</h2>", other.title()),
    };
    Some(format!(
        "<section class=\"{class}\" data-section=\"{kind}\">{heading}{inner}</section>\n"
    ))
}

fn hero_class(params: &HeroParams) -> String {
    let variant = match params.variant {
        HeroVariant::Left => "left",
        HeroVariant::Center => "center",
    };
    format!("hero hero--{variant} container")
}

fn hero(record: &ResumeData, params: &HeroParams) -> String {
    let mut out = String::new();

    let headshot = record.assets.headshot_url.as_deref().and_then(format::image_src);
    if let Some(src) = headshot {
        let alt = record.name.as_deref().map(escape_html).unwrap_or_default();
        let _ = write!(
            out,
            "<img class=\"avatar\" src=\"{}\" alt=\"{alt}\"/>",
            safe_href(&src)
        );
    } else if let Some(initials) = record.name.as_deref().and_then(format::initials) {
        let _ = write!(
            out,
            "<div class=\"avatar\" aria-hidden=\"true\">{}</div>",
            escape_html(&initials)
        );
    }

    out.push_str("<div>");
    if let Some(name) = &record.name {
        let _ = write!(out, "<h1>{}</h1>", escape_html(name));
    }
    if let Some(headline) = &record.headline {
        let _ = write!(out, "<p class=\"headline\">{}</p>", escape_html(headline));
    }
    if params.show_location {
        if let Some(location) = &record.location {
            let _ = write!(out, "<p class=\"location\">{}</p>", escape_html(location));
        }
    }
    if let Some(label) = params.cta_label.as_deref().filter(|l| !l.trim().is_empty()) {
        match format::cta_href(&record.contact) {
            Some(href) => {
                let _ = write!(
                    out,
                    "<a class=\"cta\" href=\"{}\">{}</a>",
                    safe_href(&href),
                    escape_html(label)
                );
            }
            None => {
                let _ = write!(
                    out,
                    "<a class=\"cta\" aria-disabled=\"true\">{}</a>",
                    escape_html(label)
                );
            }
        }
    }
    out.push_str("</div>");
    out
}

fn tag_list<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let items: String = items
        .into_iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect();
    format!("<ul class=\"tags\">{items}</ul>")
}

fn link_list(links: &[format::Link], target_blank: bool) -> String {
    let target = if target_blank {
        " target=\"_blank\" rel=\"noopener\""
    } else {
        ""
    };
    links
        .iter()
        .map(|link| {
            format!(
                "<a href=\"{}\"{target}>{}</a>",
                safe_href(&link.href),
                escape_html(&link.text)
            )
        })
        .collect()
}

fn projects(record: &ResumeData, params: &ProjectsParams) -> Option<String> {
    let card_class = match params.card_style {
        CardStyle::Solid => "card card--solid",
        CardStyle::Outline => "card card--outline",
    };

    let mut cards = String::new();
    for project in &record.projects {
        let Some(name) = &project.name else {
            continue;
        };
        let _ = write!(cards, "<article class=\"{card_class}\"><h3>{}</h3>", escape_html(name));
        if let Some(description) = &project.description {
            let _ = write!(cards, "<p>{}</p>", escape_html(description));
        }
        if !project.tech.is_empty() {
            cards.push_str(&tag_list(&project.tech));
        }
        let links = format::project_links(&project.links);
        if !links.is_empty() {
            let _ = write!(cards, "<p class=\"links\">{}</p>", link_list(&links, true));
        }
        cards.push_str("</article>");
    }

    if cards.is_empty() {
        return None;
    }
    Some(format!(
        "<div class=\"grid grid--{}\">{cards}</div>",
        params.columns()
    ))
}

fn experience(record: &ResumeData, params: &ExperienceParams) -> Option<String> {
    if record.experience.is_empty() {
        return None;
    }
    let class = match params.style {
        ExperienceStyle::Timeline => "xp xp--timeline",
        ExperienceStyle::Cards => "xp xp--cards",
    };
    let cap = effective_cap(params.bullets_max);

    let mut out = String::new();
    for item in &record.experience {
        let _ = write!(
            out,
            "<article class=\"{class}\"><h3>{}</h3>",
            escape_html(&format::experience_title(item))
        );
        if let Some(dates) = format::experience_dates(item) {
            let _ = write!(out, "<p class=\"meta\">{}</p>", escape_html(&dates));
        }
        let shown = match cap {
            Some(cap) => &item.highlights[..cap.min(item.highlights.len())],
            None => &item.highlights[..],
        };
        if !shown.is_empty() {
            out.push_str("<ul>");
            for highlight in shown {
                let _ = write!(out, "<li>{}</li>", escape_html(highlight));
            }
            out.push_str("</ul>");
        }
        out.push_str("</article>");
    }
    Some(out)
}

fn skills(record: &ResumeData, params: &SkillsParams) -> Option<String> {
    let total = record.skills_core.len() + record.skills_tools.len();
    if total == 0 {
        return None;
    }
    let visible = effective_cap(params.visible_max).map_or(total, |cap| cap.min(total));
    let mut out = tag_list(
        record
            .skills_core
            .iter()
            .chain(&record.skills_tools)
            .take(visible),
    );
    if visible < total {
        let _ = write!(out, "<p class=\"more\">+{} more</p>", total - visible);
    }
    Some(out)
}

fn education(record: &ResumeData) -> Option<String> {
    if record.education.is_empty() {
        return None;
    }
    let mut out = String::from("<ul class=\"edu\">");
    for item in &record.education {
        let _ = write!(out, "<li>{}", escape_html(&format::education_line(item)));
        if let Some(highlights) = format::education_highlights(item) {
            let _ = write!(out, " — {}", escape_html(&highlights));
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    Some(out)
}

fn contact(record: &ResumeData) -> Option<String> {
    let links = format::contact_links(&record.contact);
    if links.is_empty() {
        return None;
    }
    let items: String = links
        .iter()
        .map(|link| {
            let external = !link.href.starts_with("mailto:") && !link.href.starts_with("tel:");
            format!(
                "<li><span class=\"meta\">{}</span> {}</li>",
                link.label,
                link_list(std::slice::from_ref(link), external)
            )
        })
        .collect();
    Some(format!("<ul class=\"links\">{items}</ul>"))
}
