//! `styles.css` for the exported site: theme tokens as custom properties plus a
//! fixed base stylesheet.

use crate::models::Theme;

const BASE_CSS: &str = "\
body{margin:0;background:var(--background);color:var(--foreground);font:16px/1.6 system-ui,-apple-system,Segoe UI,Roboto,Inter,Arial,sans-serif}
a{color:var(--primary)}
.container{max-width:1100px;margin:0 auto;padding:24px}
h1{font-size:clamp(28px,5vw,40px);margin:4px 0 8px}
h2{font-size:22px;margin:32px 0 12px}
h3{font-size:18px;margin:8px 0}
p{margin:8px 0}
.headline,.meta,.location{color:var(--muted)}
.hero{display:flex;flex-direction:column;align-items:center;text-align:center;gap:12px}
.hero--left{flex-direction:row;align-items:center;text-align:left}
.avatar{width:96px;height:96px;border-radius:999px;object-fit:cover;display:grid;place-items:center;background:var(--accent);font-size:32px;font-weight:600}
.cta{display:inline-block;background:var(--primary);color:var(--primary-foreground);border-radius:var(--radius);padding:10px 18px;text-decoration:none}
.cta[aria-disabled=true]{opacity:.5;pointer-events:none}
.tags{display:flex;flex-wrap:wrap;gap:8px;padding:0;margin:0;list-style:none}
.tags li{background:var(--accent);border-radius:999px;padding:6px 10px;font-size:13px}
.grid{display:grid;grid-template-columns:1fr;gap:16px}
@media (min-width:768px){.grid--2{grid-template-columns:repeat(2,1fr)}.grid--3{grid-template-columns:repeat(3,1fr)}.grid--4{grid-template-columns:repeat(4,1fr)}}
.card{border-radius:var(--radius);padding:16px}
.card--solid{background:var(--accent)}
.card--outline{border:1px solid var(--muted)}
.links a{margin-right:12px}
.xp--timeline{border-left:3px solid var(--muted);padding-left:12px;margin:12px 0}
.xp--cards{background:var(--accent);border-radius:var(--radius);padding:16px;margin:12px 0}
.more{color:var(--muted);font-size:13px}
.edu{padding-left:18px}
footer{color:var(--muted);margin-top:32px;border-top:1px solid var(--muted);padding-top:16px}
@media (prefers-reduced-motion:reduce){*{transition:none!important;animation:none!important}}
";

/// Theme token with a fallback when the configured value is blank.
fn token<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Strips characters that could end the declaration or the `:root` block.
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '\\'))
        .collect()
}

pub fn stylesheet(theme: &Theme) -> String {
    let defaults = Theme::default();
    let radius = if theme.radius.is_finite() && theme.radius >= 0.0 {
        theme.radius
    } else {
        defaults.radius
    };

    let vars = [
        ("background", &theme.background, &defaults.background),
        ("foreground", &theme.foreground, &defaults.foreground),
        ("primary", &theme.primary, &defaults.primary),
        (
            "primary-foreground",
            &theme.primary_foreground,
            &defaults.primary_foreground,
        ),
        ("accent", &theme.accent, &defaults.accent),
        ("muted", &theme.muted, &defaults.muted),
    ];

    let mut css = String::from(":root{");
    for (name, value, fallback) in vars {
        css.push_str(&format!("--{name}:{};", css_value(token(value, fallback))));
    }
    css.push_str(&format!("--radius:{radius}rem}}\n"));
    css.push_str(BASE_CSS);
    css
}
