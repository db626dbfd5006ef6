use crate::diagnostic::{RuleOutcome, Severity};
use crate::error::{load_schema, SchemaError};
use crate::rules::ValidationRule;
use blocksmith_common::{schema_source, ParsedSchema};

/// The template carries a `{% schema %}` block
pub struct SchemaExistsRule;

impl ValidationRule for SchemaExistsRule {
    fn id(&self) -> &'static str {
        "schema-exists"
    }

    fn name(&self) -> &'static str {
        "Schema block exists"
    }

    fn description(&self) -> &'static str {
        "Sections need a {% schema %} block to appear in the theme editor"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, code: &str, _: Option<&ParsedSchema>) -> RuleOutcome {
        if schema_source(code).is_some() {
            RuleOutcome::pass("Schema block found")
        } else {
            RuleOutcome::fail("Missing {% schema %} block").with_suggestion(
                "Add a {% schema %} { \"name\": \"My Section\" } {% endschema %} block at the end of the file",
            )
        }
    }
}

/// The schema block body is well-formed JSON
pub struct SchemaValidJsonRule;

impl ValidationRule for SchemaValidJsonRule {
    fn id(&self) -> &'static str {
        "schema-valid-json"
    }

    fn name(&self) -> &'static str {
        "Schema is valid JSON"
    }

    fn description(&self) -> &'static str {
        "The schema block must contain a JSON object"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, code: &str, _: Option<&ParsedSchema>) -> RuleOutcome {
        match load_schema(code) {
            Ok(_) => RuleOutcome::pass("Valid JSON"),
            Err(SchemaError::Missing) => RuleOutcome::fail(SchemaError::Missing.to_string()),
            Err(err @ SchemaError::InvalidJson(_)) => RuleOutcome::fail(err.to_string())
                .with_suggestion("Check for trailing commas, unquoted keys and missing quotes"),
            Err(err @ SchemaError::NotAnObject) => RuleOutcome::fail(err.to_string())
                .with_suggestion("Wrap the schema in { ... }"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_exists() {
        let rule = SchemaExistsRule;
        let found = rule.check("{% schema %} { \"name\": \"Test\" } {% endschema %}", None);
        assert!(found.valid);
        assert_eq!(found.message, "Schema block found");

        let missing = rule.check("<div>No schema here</div>", None);
        assert!(!missing.valid);
        assert_eq!(missing.message, "Missing {% schema %} block");
        assert!(missing.suggestion.is_some());
    }

    #[test]
    fn test_schema_exists_whitespace_variations() {
        assert!(SchemaExistsRule.check("{%  schema  %} {} {%  endschema  %}", None).valid);
        assert!(SchemaExistsRule.check("{%- schema -%}{}{%- endschema -%}", None).valid);
    }

    #[test]
    fn test_valid_json() {
        let rule = SchemaValidJsonRule;
        let ok = rule.check("{% schema %} { \"name\": \"Test\", \"settings\": [] } {% endschema %}", None);
        assert!(ok.valid);
        assert_eq!(ok.message, "Valid JSON");
    }

    #[test]
    fn test_trailing_comma_is_invalid() {
        let outcome = SchemaValidJsonRule.check("{% schema %} { \"name\": \"Test\", } {% endschema %}", None);
        assert!(!outcome.valid);
        assert!(outcome.message.contains("Invalid JSON"));
        assert!(outcome.suggestion.is_some());
    }

    #[test]
    fn test_no_block_to_validate() {
        let outcome = SchemaValidJsonRule.check("<div>No schema</div>", None);
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "No schema block to validate");
    }
}
