use crate::diagnostic::{RuleOutcome, Severity};
use crate::rules::ValidationRule;
use blocksmith_common::ParsedSchema;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Tags that open a block and need a matching `end<tag>`
const BLOCK_TAGS: [&str; 15] = [
    "if",
    "unless",
    "for",
    "case",
    "capture",
    "form",
    "paginate",
    "tablerow",
    "comment",
    "raw",
    "style",
    "stylesheet",
    "javascript",
    "schema",
    "content_for",
];

/// Tags whose bodies are opaque text
const VERBATIM_TAGS: [&str; 3] = ["comment", "raw", "schema"];

fn tag_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{%-?\s*([A-Za-z_]+)").expect("static regex"))
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Imbalance {
    /// Openers never closed, by tag name
    unclosed: BTreeMap<String, usize>,
    /// Closers with no opener, by end-tag name
    stray: BTreeMap<String, usize>,
}

impl Imbalance {
    fn is_balanced(&self) -> bool {
        self.unclosed.is_empty() && self.stray.is_empty()
    }

    fn describe(&self) -> String {
        self.unclosed
            .iter()
            .map(|(tag, n)| format!("{}: {} unclosed", tag, n))
            .chain(
                self.stray
                    .iter()
                    .map(|(tag, n)| format!("{}: {} without opening tag", tag, n)),
            )
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Single pass over tag openings with an explicit stack.
fn scan(code: &str) -> Imbalance {
    let mut imbalance = Imbalance::default();
    let mut stack: Vec<&str> = Vec::new();
    // Inside a verbatim tag only its own end tag counts
    let mut verbatim: Option<&str> = None;

    for caps in tag_name().captures_iter(code) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };

        if let Some(open) = verbatim {
            if name.strip_prefix("end") == Some(open) {
                stack.pop();
                verbatim = None;
            }
            continue;
        }

        if BLOCK_TAGS.contains(&name) {
            stack.push(name);
            if VERBATIM_TAGS.contains(&name) {
                verbatim = Some(name);
            }
            continue;
        }

        let Some(closed) = name.strip_prefix("end").filter(|tag| BLOCK_TAGS.contains(tag)) else {
            continue;
        };
        match stack.iter().rposition(|open| *open == closed) {
            Some(at) => {
                // Anything opened after the match was never closed
                for open in stack.drain(at..).skip(1) {
                    *imbalance.unclosed.entry(open.to_string()).or_default() += 1;
                }
            }
            None => *imbalance.stray.entry(name.to_string()).or_default() += 1,
        }
    }

    for open in stack {
        *imbalance.unclosed.entry(open.to_string()).or_default() += 1;
    }
    imbalance
}

pub struct LiquidTagsBalancedRule;

impl ValidationRule for LiquidTagsBalancedRule {
    fn id(&self) -> &'static str {
        "liquid-tags-balanced"
    }

    fn name(&self) -> &'static str {
        "Liquid tags are balanced"
    }

    fn description(&self) -> &'static str {
        "Every block tag such as if, for, case or capture has a matching end tag"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, code: &str, _: Option<&ParsedSchema>) -> RuleOutcome {
        let imbalance = scan(code);
        if imbalance.is_balanced() {
            RuleOutcome::pass("All tags balanced")
        } else {
            RuleOutcome::fail(format!("Unbalanced tags: {}", imbalance.describe()))
                .with_suggestion("Close every block tag, e.g. {% if %} ... {% endif %}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(code: &str) -> RuleOutcome {
        LiquidTagsBalancedRule.check(code, None)
    }

    #[test]
    fn test_balanced() {
        let outcome = check(
            "{% if condition %}<div>{% for item in items %}{{ item }}{% endfor %}</div>{% endif %}",
        );
        assert!(outcome.valid);
        assert_eq!(outcome.message, "All tags balanced");
    }

    #[test]
    fn test_unclosed_if_and_for() {
        let outcome = check("{% if true %} <div>content</div>");
        assert!(!outcome.valid);
        assert!(outcome.message.contains("Unbalanced tags"));
        assert!(outcome.message.contains("if:"));

        let both = check("{% if true %} {% for item in items %} content");
        assert_eq!(both.message, "Unbalanced tags: for: 1 unclosed, if: 1 unclosed");
    }

    #[test]
    fn test_case_and_capture() {
        assert!(check("{% case value %}{% when \"a\" %} A{% when \"b\" %} B{% endcase %}").valid);
        assert!(check("{% capture var %} content {% endcapture %}").valid);
    }

    #[test]
    fn test_stray_end_tag() {
        let outcome = check("content {% endif %}");
        assert_eq!(outcome.message, "Unbalanced tags: endif: 1 without opening tag");
    }

    #[test]
    fn test_interleaved_blocks_report_inner_opener() {
        let outcome = check("{% for x in y %}{% if x %}{% endfor %}");
        assert_eq!(outcome.message, "Unbalanced tags: if: 1 unclosed");
    }

    #[test]
    fn test_verbatim_bodies_are_skipped() {
        assert!(check("{% raw %}{% if %}{% endraw %}").valid);
        assert!(check("{% comment %}{% for %}{% endcomment %}").valid);
        assert!(check("{% schema %}{\"name\": \"{% if\"}{% endschema %}").valid);
    }

    #[test]
    fn test_whitespace_control() {
        assert!(check("{%- if a -%}x{%- endif -%}").valid);
    }
}
