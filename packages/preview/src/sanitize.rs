//! Allow-list HTML sanitizer for storefront responses.

use lol_html::html_content::Element;
use lol_html::{comments, element, rewrite_str, RewriteStrSettings};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

pub const ALLOWED_TAGS: &[&str] = &[
    "div", "span", "section", "article", "header", "footer", "main", "nav", "aside", "p", "h1",
    "h2", "h3", "h4", "h5", "h6", "strong", "em", "b", "i", "u", "br", "hr", "ul", "ol", "li", "dl",
    "dt", "dd", "a", "img", "picture", "source", "video", "audio", "figure", "figcaption", "svg",
    "path", "form", "input", "button", "select", "option", "textarea", "label", "table", "thead",
    "tbody", "tfoot", "tr", "th", "td", "caption", "colgroup", "col", "style", "noscript",
    "template",
];

pub const ALLOWED_ATTRS: &[&str] = &[
    "class", "id", "style", "href", "target", "rel", "src", "srcset", "alt", "width", "height",
    "loading", "decoding", "type", "name", "value", "placeholder", "required", "disabled",
    "checked", "for", "role", "tabindex", "viewbox", "fill", "stroke", "d", "xmlns",
];

/// Dropped together with everything inside them
const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "iframe", "frame", "frameset", "object", "embed", "applet", "base", "link", "meta",
    "title", "math",
];

const URI_ATTRS: &[&str] = &["href", "src", "srcset"];

/// Headers attached wherever remote HTML is served back out
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "Content-Security-Policy",
        "script-src 'none'; object-src 'none'; frame-ancestors 'self'",
    ),
    ("X-Content-Type-Options", "nosniff"),
];

fn is_allowed_attr(name: &str) -> bool {
    ALLOWED_ATTRS.contains(&name) || name.starts_with("data-") || name.starts_with("aria-")
}

/// Accepts http(s), mailto, tel and data schemes plus relative references.
///
/// `value` is the raw attribute text; entities are decoded first since the
/// browser resolves them before reading the scheme.
fn is_safe_uri(value: &str) -> bool {
    static SAFE_URI: OnceLock<Regex> = OnceLock::new();
    let pattern = SAFE_URI.get_or_init(|| {
        Regex::new(r"(?i)^(?:(?:https?|mailto|tel|data):|[^a-z]|[a-z+.\-]+(?:[^a-z+.\-:]|$))")
            .expect("static regex")
    });
    let decoded = html_escape::decode_html_entities(value);
    let compact: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    // An entity left undecoded could still spell out a scheme
    let scheme_part = compact.split(['/', '?', '#']).next().unwrap_or_default();
    if scheme_part.contains('&') {
        return false;
    }
    compact.is_empty() || pattern.is_match(&compact)
}

fn scrub(el: &mut Element) {
    let tag = el.tag_name().to_ascii_lowercase();
    if DROPPED_WITH_CONTENT.contains(&tag.as_str()) {
        el.remove();
        return;
    }
    if !ALLOWED_TAGS.contains(&tag.as_str()) {
        el.remove_and_keep_content();
        return;
    }

    let rejected: Vec<String> = el
        .attributes()
        .iter()
        .filter(|attr| {
            let name = attr.name().to_ascii_lowercase();
            !is_allowed_attr(&name) || (URI_ATTRS.contains(&name.as_str()) && !is_safe_uri(&attr.value()))
        })
        .map(|attr| attr.name())
        .collect();
    for name in rejected {
        el.remove_attribute(&name);
    }
}

/// Strip every element, attribute and URI outside the allow-lists.
///
/// Elements that are not allowed are unwrapped so their text survives;
/// executable and embedding elements go with their content. On a rewriter
/// failure nothing of the input is returned.
pub fn sanitize_html(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("*", |el| {
                    scrub(el);
                    Ok(())
                }),
                comments!("*", |c| {
                    c.remove();
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    );

    match result {
        Ok(clean) => clean,
        Err(e) => {
            warn!("failed to sanitize storefront html: {:?}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_script_removed_with_content() {
        assert_eq!(
            sanitize_html("<div>ok<script>alert(1)</script></div>"),
            "<div>ok</div>"
        );
    }

    #[test]
    fn test_event_handlers_stripped() {
        assert_eq!(
            sanitize_html(r#"<img src="/a.png" onerror="steal()" alt="A">"#),
            r#"<img src="/a.png" alt="A">"#
        );
    }

    #[test]
    fn test_javascript_uri_stripped() {
        assert_eq!(
            sanitize_html(r#"<a href="javascript:alert(1)" class="x">go</a>"#),
            r#"<a class="x">go</a>"#
        );
        assert_eq!(
            sanitize_html(r#"<a href="https://shop.example/p">go</a>"#),
            r#"<a href="https://shop.example/p">go</a>"#
        );
    }

    #[test]
    fn test_unknown_tags_unwrapped() {
        assert_eq!(
            sanitize_html("<custom-card><p>text</p></custom-card>"),
            "<p>text</p>"
        );
    }

    #[test]
    fn test_data_and_aria_attributes_kept() {
        let html = r#"<button data-id="7" aria-label="Add">+</button>"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_comments_and_iframes_removed() {
        assert_eq!(
            sanitize_html(r#"<!-- note --><section><iframe src="https://x"></iframe></section>"#),
            "<section></section>"
        );
    }

    #[test]
    fn test_safe_uris() {
        assert!(is_safe_uri("/products/tee"));
        assert!(is_safe_uri("mailto:a@b.c"));
        assert!(is_safe_uri("data:image/png;base64,AAAA"));
        assert!(!is_safe_uri("javascript:void(0)"));
        assert!(!is_safe_uri("java\tscript:void(0)"));
        assert!(is_safe_uri("/search?q=a&b=c"));
    }

    #[test]
    fn test_entity_encoded_schemes_stripped() {
        assert_eq!(
            sanitize_html(r#"<a href="&#106;avascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_html(r#"<a href="javascript&colon;alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_html(r#"<img src="&#x6A;ava&#x09;script:alert(1)">"#),
            "<img>"
        );
        assert!(!is_safe_uri("&unknown;javascript:alert(1)"));
    }
}
