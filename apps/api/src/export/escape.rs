//! Escaping for text and attribute values interpolated into the exported markup.

use crate::render::format::is_safe_url;

/// Escapes `& < > " '` so the result is safe in element text and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped `href` value. Only web, mail and phone schemes or relative links
/// survive; anything else (`javascript:`, `data:`) becomes `#`.
pub fn safe_href(url: &str) -> String {
    if is_safe_url(url) {
        escape_html(url.trim())
    } else {
        "#".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_html_specials() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_safe_href_blocks_script_schemes() {
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href(" JaVaScRiPt:alert(1)"), "#");
        assert_eq!(safe_href("data:text/html,hi"), "#");
        assert_eq!(safe_href("https://ada.dev/?a=1&b=2"), "https://ada.dev/?a=1&amp;b=2");
        assert_eq!(safe_href("mailto:ada@example.com"), "mailto:ada@example.com");
        assert_eq!(safe_href("/work#top"), "/work#top");
    }

    proptest! {
        #[test]
        fn prop_escaped_text_has_no_raw_markup(s in ".*") {
            let escaped = escape_html(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
        }

        #[test]
        fn prop_plain_text_is_unchanged(s in "[a-zA-Z0-9 .,]*") {
            prop_assert_eq!(escape_html(&s), s);
        }
    }
}
