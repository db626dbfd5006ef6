use crate::diagnostic::{RuleOutcome, Severity};
use crate::rules::ValidationRule;
use blocksmith_common::ParsedSchema;
use regex::Regex;
use std::sync::OnceLock;

fn style_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\{%-?\s*style\s*-?%\}(.*?)\{%-?\s*endstyle\s*-?%\}").expect("static regex")
    })
}

fn section_id_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{-?\s*section\.id\s*-?\}\}").expect("static regex"))
}

/// Scoped styles are keyed to the section's unique id so two copies of the
/// section on one page do not restyle each other.
pub struct CssUsesSectionIdRule;

impl ValidationRule for CssUsesSectionIdRule {
    fn id(&self) -> &'static str {
        "css-uses-section-id"
    }

    fn name(&self) -> &'static str {
        "CSS is scoped to the section"
    }

    fn description(&self) -> &'static str {
        "Selectors inside {% style %} should start with #shopify-section-{{ section.id }}"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, code: &str, _: Option<&ParsedSchema>) -> RuleOutcome {
        let bodies: Vec<&str> = style_block()
            .captures_iter(code)
            .filter_map(|caps| caps.get(1).map(|body| body.as_str()))
            .collect();

        if bodies.is_empty() {
            return RuleOutcome::pass("No style block");
        }
        if bodies.iter().all(|body| section_id_reference().is_match(body)) {
            RuleOutcome::pass("CSS properly scoped")
        } else {
            RuleOutcome::fail("CSS is not scoped to the section id").with_suggestion(
                "Prefix selectors with #shopify-section-{{ section.id }}",
            )
        }
    }
}
