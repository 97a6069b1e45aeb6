//! Render contract. Checks every configuration a planner returns.
//!
//! # Contract rules
//! - a section is only kept when the record has data for it
//! - foreground/background and primary/primary-foreground contrast ≥ 4.5 (WCAG AA)
//! - radius is finite and non-negative
//!
//! Dropping sections repairs the config; a color or radius violation rejects it.

use csscolorparser::Color;
use tracing::debug;

use crate::errors::AppError;
use crate::models::{RenderConfig, ResumeData, Section, SectionKind};

/// WCAG AA minimum for normal text.
pub const MIN_CONTRAST_RATIO: f64 = 4.5;

/// Whether the record carries anything the section could show.
pub fn has_data(record: &ResumeData, kind: SectionKind) -> bool {
    match kind {
        SectionKind::Hero => true,
        SectionKind::Projects => record.projects.iter().any(|p| p.name.is_some()),
        SectionKind::Experience => !record.experience.is_empty(),
        SectionKind::Skills => !record.skills_core.is_empty() || !record.skills_tools.is_empty(),
        SectionKind::About => record.summary.is_some(),
        SectionKind::Education => !record.education.is_empty(),
        SectionKind::Contact => {
            let c = &record.contact;
            [&c.email, &c.phone, &c.website, &c.github, &c.linkedin, &c.twitter]
                .iter()
                .any(|channel| channel.is_some())
        }
    }
}

/// Parses a CSS color, also accepting the bare `"H S% L%"` triplets used for
/// CSS custom properties.
pub fn parse_color(raw: &str) -> Option<Color> {
    let raw = raw.trim();
    if let Ok(color) = csscolorparser::parse(raw) {
        return Some(color);
    }
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() == 3 && parts[1].ends_with('%') && parts[2].ends_with('%') {
        return csscolorparser::parse(&format!("hsl({}, {}, {})", parts[0], parts[1], parts[2]))
            .ok();
    }
    None
}

fn relative_luminance(color: &Color) -> f64 {
    fn channel(c: f64) -> f64 {
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    0.2126 * channel(color.r) + 0.7152 * channel(color.g) + 0.0722 * channel(color.b)
}

/// WCAG contrast ratio, in `1.0..=21.0`.
pub fn contrast_ratio(a: &Color, b: &Color) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

fn check_pair(name: &str, fg: &str, bg: &str) -> Result<(), AppError> {
    let parse = |token: &str| {
        parse_color(token).ok_or_else(|| {
            AppError::ResponseParseFailed(format!("{name}: '{token}' is not a color"))
        })
    };
    let ratio = contrast_ratio(&parse(fg)?, &parse(bg)?);
    if ratio < MIN_CONTRAST_RATIO {
        return Err(AppError::ResponseParseFailed(format!(
            "{name} contrast {ratio:.2} is below {MIN_CONTRAST_RATIO}"
        )));
    }
    Ok(())
}

/// Drops sections without data and rejects unreadable themes.
pub fn enforce(mut config: RenderConfig, record: &ResumeData) -> Result<RenderConfig, AppError> {
    let theme = &config.theme;
    check_pair("foreground/background", &theme.foreground, &theme.background)?;
    check_pair(
        "primaryForeground/primary",
        &theme.primary_foreground,
        &theme.primary,
    )?;
    if !theme.radius.is_finite() || theme.radius < 0.0 {
        return Err(AppError::ResponseParseFailed(format!(
            "radius must be a non-negative number, got {}",
            theme.radius
        )));
    }

    config.sections.retain(|section: &Section| {
        let keep = has_data(record, section.kind());
        if !keep {
            debug!("Dropping {} section: record has no data for it", section.kind());
        }
        keep
    });

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ProjectItem;
    use crate::models::Theme;

    fn ratio(a: &str, b: &str) -> f64 {
        contrast_ratio(&parse_color(a).unwrap(), &parse_color(b).unwrap())
    }

    #[test]
    fn test_black_on_white_is_maximum_contrast() {
        assert!((ratio("#000000", "#ffffff") - 21.0).abs() < 0.01);
        assert!((ratio("white", "white") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bare_hsl_triplet_is_accepted() {
        let color = parse_color("0 0% 100%").unwrap();
        assert!((color.r - 1.0).abs() < 1e-6);
        assert!(parse_color("not a color").is_none());
    }

    #[test]
    fn test_default_theme_passes() {
        let config = RenderConfig::default();
        assert!(enforce(config, &ResumeData::default()).is_ok());
    }

    #[test]
    fn test_low_contrast_is_rejected() {
        let config = RenderConfig {
            theme: Theme {
                foreground: "#dddddd".into(),
                ..Theme::default()
            },
            sections: vec![],
        };
        let err = enforce(config, &ResumeData::default()).unwrap_err();
        assert!(matches!(err, AppError::ResponseParseFailed(msg) if msg.contains("foreground")));
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        let config = RenderConfig {
            theme: Theme {
                radius: -1.0,
                ..Theme::default()
            },
            sections: vec![],
        };
        assert!(enforce(config, &ResumeData::default()).is_err());
    }

    #[test]
    fn test_sections_without_data_are_dropped() {
        let record = ResumeData {
            projects: vec![ProjectItem::default()],
            summary: Some("Builds compilers.".into()),
            ..Default::default()
        };
        let config = RenderConfig {
            theme: Theme::default(),
            sections: SectionKind::ALL.into_iter().map(Section::plain).collect(),
        };
        let kinds: Vec<_> = enforce(config, &record)
            .unwrap()
            .sections
            .iter()
            .map(Section::kind)
            .collect();
        assert_eq!(kinds, vec![SectionKind::Hero, SectionKind::About]);
    }
}
