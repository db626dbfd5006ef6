use super::{all_settings, has_settings, setting_label};
use crate::diagnostic::{RuleOutcome, Severity};
use crate::rules::ValidationRule;
use blocksmith_common::ParsedSchema;

/// `number` and `range` defaults are JSON numbers, never strings
pub struct NumberDefaultsAreNumbersRule;

impl ValidationRule for NumberDefaultsAreNumbersRule {
    fn id(&self) -> &'static str {
        "number-defaults-are-numbers"
    }

    fn name(&self) -> &'static str {
        "Number defaults are numbers"
    }

    fn description(&self) -> &'static str {
        "Shopify rejects number settings whose default is a string such as \"5\""
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, _: &str, schema: Option<&ParsedSchema>) -> RuleOutcome {
        let Some(schema) = schema.filter(|schema| has_settings(schema)) else {
            return RuleOutcome::pass("No settings to check");
        };

        let offenders: Vec<&str> = all_settings(schema)
            .filter(|setting| matches!(setting.kind.as_str(), "number" | "range"))
            .filter(|setting| matches!(&setting.default, Some(default) if !default.is_number()))
            .map(setting_label)
            .collect();

        if offenders.is_empty() {
            RuleOutcome::pass("All number defaults are numbers")
        } else {
            RuleOutcome::fail(format!(
                "Number settings with string defaults: {}",
                offenders.join(", ")
            ))
            .with_suggestion("Write numeric defaults without quotes, e.g. \"default\": 5")
        }
    }
}

/// `range` settings define `min`, `max` and `step`
pub struct RangeHasRequiredPropsRule;

impl ValidationRule for RangeHasRequiredPropsRule {
    fn id(&self) -> &'static str {
        "range-has-required-props"
    }

    fn name(&self) -> &'static str {
        "Range settings are complete"
    }

    fn description(&self) -> &'static str {
        "Range settings need min, max and step"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, _: &str, schema: Option<&ParsedSchema>) -> RuleOutcome {
        let Some(schema) = schema.filter(|schema| has_settings(schema)) else {
            return RuleOutcome::pass("No settings to check");
        };

        let problems: Vec<String> = all_settings(schema)
            .filter(|setting| setting.kind == "range")
            .filter_map(|setting| {
                let missing: Vec<&str> = [
                    ("min", &setting.min),
                    ("max", &setting.max),
                    ("step", &setting.step),
                ]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(prop, _)| prop)
                .collect();
                (!missing.is_empty())
                    .then(|| format!("{} (missing {})", setting_label(setting), missing.join(", ")))
            })
            .collect();

        if problems.is_empty() {
            RuleOutcome::pass("All range settings have required props")
        } else {
            RuleOutcome::fail(format!("Incomplete range settings: {}", problems.join("; ")))
                .with_suggestion("Add \"min\", \"max\" and \"step\" to every range setting")
        }
    }
}

/// `select` and `radio` settings list at least one option
pub struct SelectHasOptionsRule;

impl ValidationRule for SelectHasOptionsRule {
    fn id(&self) -> &'static str {
        "select-has-options"
    }

    fn name(&self) -> &'static str {
        "Select settings have options"
    }

    fn description(&self) -> &'static str {
        "Select and radio settings need a non-empty options list"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, _: &str, schema: Option<&ParsedSchema>) -> RuleOutcome {
        let Some(schema) = schema.filter(|schema| has_settings(schema)) else {
            return RuleOutcome::pass("No settings to check");
        };

        let offenders: Vec<&str> = all_settings(schema)
            .filter(|setting| matches!(setting.kind.as_str(), "select" | "radio"))
            .filter(|setting| setting.options.is_empty())
            .map(setting_label)
            .collect();

        if offenders.is_empty() {
            RuleOutcome::pass("All select settings have options")
        } else {
            RuleOutcome::fail(format!("Settings without options: {}", offenders.join(", ")))
                .with_suggestion(
                    "Add \"options\": [{ \"value\": \"left\", \"label\": \"Left\" }] to each select or radio setting",
                )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> ParsedSchema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_number_defaults() {
        let rule = NumberDefaultsAreNumbersRule;
        let ok = schema(
            r#"{"settings": [{"type": "number", "id": "size", "default": 16}, {"type": "range", "id": "padding", "default": 8}]}"#,
        );
        let outcome = rule.check("", Some(&ok));
        assert!(outcome.valid);
        assert_eq!(outcome.message, "All number defaults are numbers");

        let bad = schema(r#"{"settings": [{"type": "number", "id": "size", "default": "16"}]}"#);
        let outcome = rule.check("", Some(&bad));
        assert!(!outcome.valid);
        assert!(outcome.message.contains("string defaults"));
        assert!(outcome.message.contains("size"));
        assert!(outcome.suggestion.is_some());
    }

    #[test]
    fn test_number_without_default_or_settings() {
        let rule = NumberDefaultsAreNumbersRule;
        assert!(rule.check("", Some(&schema(r#"{"settings": [{"type": "number", "id": "size"}]}"#))).valid);
        assert_eq!(rule.check("", Some(&schema("{}"))).message, "No settings to check");
    }

    #[test]
    fn test_block_settings_are_checked() {
        let bad = schema(
            r#"{"blocks": [{"type": "item", "settings": [{"type": "number", "id": "price", "default": "10"}]}]}"#,
        );
        assert!(!NumberDefaultsAreNumbersRule.check("", Some(&bad)).valid);
    }

    #[test]
    fn test_range_props() {
        let rule = RangeHasRequiredPropsRule;
        let ok = schema(r#"{"settings": [{"type": "range", "id": "width", "min": 10, "max": 100, "step": 5}]}"#);
        assert_eq!(rule.check("", Some(&ok)).message, "All range settings have required props");

        for json in [
            r#"{"settings": [{"type": "range", "id": "width", "max": 100, "step": 5}]}"#,
            r#"{"settings": [{"type": "range", "id": "width", "min": 10, "step": 5}]}"#,
            r#"{"settings": [{"type": "range", "id": "width", "min": 10, "max": 100}]}"#,
        ] {
            let outcome = rule.check("", Some(&schema(json)));
            assert!(!outcome.valid, "{}", json);
            assert!(outcome.suggestion.is_some());
        }

        let text = schema(r#"{"settings": [{"type": "text", "id": "title"}]}"#);
        assert!(rule.check("", Some(&text)).valid);
    }

    #[test]
    fn test_select_options() {
        let rule = SelectHasOptionsRule;
        let ok = schema(
            r#"{"settings": [{"type": "select", "id": "align", "options": [{"value": "left", "label": "Left"}]}]}"#,
        );
        assert_eq!(rule.check("", Some(&ok)).message, "All select settings have options");
        assert!(!rule.check("", Some(&schema(r#"{"settings": [{"type": "select", "id": "align"}]}"#))).valid);
        assert!(!rule
            .check("", Some(&schema(r#"{"settings": [{"type": "select", "id": "align", "options": []}]}"#)))
            .valid);

        let radio = schema(r#"{"settings": [{"type": "radio", "id": "style", "options": [{"value": "light"}]}]}"#);
        assert!(rule.check("", Some(&radio)).valid);
    }
}
