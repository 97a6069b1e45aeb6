//! Display formatting shared by the live renderer and the static exporter.
//!
//! These helpers only turn record values into display strings. Which sections
//! and items appear is decided separately by each output.

use crate::models::resume::{Contact, EducationItem, ExperienceItem, ProjectLinks};

/// `role · company`, or whichever half is present.
pub fn experience_title(item: &ExperienceItem) -> String {
    join_present([item.role.as_deref(), item.company.as_deref()], " · ")
}

/// `start — end`, with a missing end shown as `Present`.
pub fn experience_dates(item: &ExperienceItem) -> Option<String> {
    match (item.start.as_deref(), item.end.as_deref()) {
        (Some(start), end) => Some(format!("{start} — {}", end.unwrap_or("Present"))),
        (None, Some(end)) => Some(end.to_string()),
        (None, None) => None,
    }
}

/// `degree, school (year)`.
pub fn education_line(item: &EducationItem) -> String {
    let mut line = join_present([item.degree.as_deref(), item.school.as_deref()], ", ");
    if let Some(year) = &item.year {
        if line.is_empty() {
            line = year.clone();
        } else {
            line.push_str(&format!(" ({year})"));
        }
    }
    line
}

pub fn education_highlights(item: &EducationItem) -> Option<String> {
    (!item.highlights.is_empty()).then(|| item.highlights.join("; "))
}

/// Up to two uppercase initials from the name's first words.
pub fn initials(name: &str) -> Option<String> {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    (!initials.is_empty()).then_some(initials)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: &'static str,
    pub text: String,
    pub href: String,
}

/// Project links in display order: live, repo, case study.
pub fn project_links(links: &ProjectLinks) -> Vec<Link> {
    [
        ("Live", &links.live),
        ("Code", &links.repo),
        ("Case study", &links.case_study),
    ]
    .into_iter()
    .filter_map(|(label, url)| {
        url.as_ref().map(|url| Link {
            label,
            text: label.to_string(),
            href: web_href(url),
        })
    })
    .collect()
}

/// Contact channels in display order: email, phone, website, GitHub, LinkedIn, Twitter.
pub fn contact_links(contact: &Contact) -> Vec<Link> {
    let mut links = Vec::new();
    if let Some(email) = &contact.email {
        links.push(Link {
            label: "Email",
            text: email.clone(),
            href: format!("mailto:{email}"),
        });
    }
    if let Some(phone) = &contact.phone {
        let dial: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        links.push(Link {
            label: "Phone",
            text: phone.clone(),
            href: format!("tel:{dial}"),
        });
    }
    if let Some(website) = &contact.website {
        links.push(Link {
            label: "Website",
            text: website.clone(),
            href: web_href(website),
        });
    }
    let socials = [
        ("GitHub", &contact.github, "https://github.com/"),
        ("LinkedIn", &contact.linkedin, "https://www.linkedin.com/in/"),
        ("Twitter", &contact.twitter, "https://twitter.com/"),
    ];
    for (label, handle, profile_base) in socials {
        if let Some(handle) = handle {
            links.push(Link {
                label,
                text: handle.clone(),
                href: social_href(handle, profile_base),
            });
        }
    }
    links
}

/// Hero call-to-action target: a safe website, then `mailto:` email, else none.
pub fn cta_href(contact: &Contact) -> Option<String> {
    contact
        .website
        .as_deref()
        .filter(|url| is_safe_url(url))
        .map(web_href)
        .or_else(|| contact.email.as_ref().map(|email| format!("mailto:{email}")))
}

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Text before the first `:`, when that text could be a scheme. A `/`, `?` or
/// `#` before the colon means the colon belongs to the path or query.
fn scheme(url: &str) -> Option<&str> {
    url.split_once(':')
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.contains(['/', '?', '#']))
}

/// True for web, mail and phone links and for scheme-less ones. Anything else
/// (`javascript:`, `data:`, `vbscript:`) is rejected.
pub fn is_safe_url(url: &str) -> bool {
    scheme(url.trim()).map_or(true, |scheme| {
        SAFE_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme))
    })
}

/// Bare domains such as `ada.dev` get an `https://` prefix; unsafe links become `#`.
pub fn web_href(url: &str) -> String {
    let url = url.trim();
    if !is_safe_url(url) {
        "#".to_string()
    } else if scheme(url).is_some() || url.starts_with('/') || url.starts_with('#') {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Headshot source, or `None` when the URL is not safe to load.
pub fn image_src(url: &str) -> Option<String> {
    is_safe_url(url).then(|| web_href(url))
}

fn social_href(handle: &str, profile_base: &str) -> String {
    let handle = handle.trim();
    if scheme(handle).is_some() || handle.contains('.') {
        web_href(handle)
    } else {
        format!("{profile_base}{}", handle.trim_start_matches('@'))
    }
}

fn join_present<const N: usize>(parts: [Option<&str>; N], sep: &str) -> String {
    parts.into_iter().flatten().collect::<Vec<_>>().join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_title_and_dates() {
        let item = ExperienceItem {
            role: Some("Engineer".into()),
            company: Some("Acme".into()),
            start: Some("2021".into()),
            ..Default::default()
        };
        assert_eq!(experience_title(&item), "Engineer · Acme");
        assert_eq!(experience_dates(&item).as_deref(), Some("2021 — Present"));

        let company_only = ExperienceItem {
            company: Some("Acme".into()),
            ..Default::default()
        };
        assert_eq!(experience_title(&company_only), "Acme");
        assert_eq!(experience_dates(&company_only), None);
    }

    #[test]
    fn test_education_line() {
        let item = EducationItem {
            degree: Some("BSc Mathematics".into()),
            school: Some("University of London".into()),
            year: Some("1843".into()),
            highlights: vec!["First".into(), "Prize".into()],
        };
        assert_eq!(education_line(&item), "BSc Mathematics, University of London (1843)");
        assert_eq!(education_highlights(&item).as_deref(), Some("First; Prize"));
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("ada king lovelace").as_deref(), Some("AK"));
        assert_eq!(initials("Plato").as_deref(), Some("P"));
        assert_eq!(initials("   "), None);
    }

    #[test]
    fn test_contact_order_and_hrefs() {
        let contact = Contact {
            twitter: Some("@ada".into()),
            email: Some("ada@example.com".into()),
            github: Some("ada".into()),
            phone: Some("+44 20 7946 0000".into()),
            ..Default::default()
        };
        let links = contact_links(&contact);
        let labels: Vec<_> = links.iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["Email", "Phone", "GitHub", "Twitter"]);
        assert_eq!(links[0].href, "mailto:ada@example.com");
        assert_eq!(links[1].href, "tel:+442079460000");
        assert_eq!(links[2].href, "https://github.com/ada");
        assert_eq!(links[3].href, "https://twitter.com/ada");
    }

    #[test]
    fn test_cta_prefers_website_then_email() {
        let mut contact = Contact {
            email: Some("ada@example.com".into()),
            website: Some("ada.dev".into()),
            ..Default::default()
        };
        assert_eq!(cta_href(&contact).as_deref(), Some("https://ada.dev"));
        contact.website = None;
        assert_eq!(cta_href(&contact).as_deref(), Some("mailto:ada@example.com"));
        contact.email = None;
        assert_eq!(cta_href(&contact), None);
    }

    #[test]
    fn test_unsafe_schemes_never_become_links() {
        for url in ["javascript:alert(1)", " JaVaScRiPt:alert(1)", "data:text/html,hi", "java\tscript:x"] {
            assert!(!is_safe_url(url), "{url:?}");
            assert_eq!(web_href(url), "#");
            assert_eq!(image_src(url), None);
        }
        assert_eq!(web_href("https://ada.dev/a:b"), "https://ada.dev/a:b");
        assert_eq!(web_href("/work#top"), "/work#top");
        assert_eq!(image_src("cdn.example.com/ada.png").as_deref(), Some("https://cdn.example.com/ada.png"));
    }

    #[test]
    fn test_cta_skips_unsafe_website() {
        let contact = Contact {
            email: Some("ada@example.com".into()),
            website: Some("javascript:alert(1)".into()),
            ..Default::default()
        };
        assert_eq!(cta_href(&contact).as_deref(), Some("mailto:ada@example.com"));
    }
}
