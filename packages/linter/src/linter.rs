use crate::diagnostic::{Finding, Severity};
use crate::error::load_schema;
use crate::rules::RuleRegistry;
use blocksmith_common::ParsedSchema;
use serde::Serialize;
use tracing::{debug, instrument};

/// Outcome of one validation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff no error-severity rule failed
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    /// `None` when the schema block is absent or not a JSON object
    pub schema: Option<ParsedSchema>,
}

/// Options for configuring validation
#[derive(Debug, Default)]
pub struct ValidateOptions {
    /// Custom rule registry (uses default if None)
    pub registry: Option<RuleRegistry>,
}

/// Validate a section template with the built-in rules
pub fn validate_schema(code: &str) -> ValidationResult {
    validate_with(code, ValidateOptions::default())
}

#[instrument(skip_all, fields(len = code.len()))]
pub fn validate_with(code: &str, options: ValidateOptions) -> ValidationResult {
    let registry = options.registry.unwrap_or_default();
    let schema = load_schema(code).ok();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for rule in registry.rules() {
        let outcome = rule.check(code, schema.as_ref());
        if outcome.valid {
            continue;
        }
        debug!(rule = rule.id(), message = %outcome.message, "rule failed");
        let finding = Finding::new(rule.id(), rule.name(), rule.severity(), outcome);
        match finding.severity {
            Severity::Error => errors.push(finding),
            Severity::Warning => warnings.push(finding),
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        schema,
    }
}
