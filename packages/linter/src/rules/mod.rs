mod css_scope;
mod schema_block;
mod schema_metadata;
mod setting_types;
mod tag_balance;

pub use css_scope::CssUsesSectionIdRule;
pub use schema_block::{SchemaExistsRule, SchemaValidJsonRule};
pub use schema_metadata::{PresetMatchesNameRule, SchemaHasNameRule, SchemaHasPresetsRule};
pub use setting_types::{NumberDefaultsAreNumbersRule, RangeHasRequiredPropsRule, SelectHasOptionsRule};
pub use tag_balance::LiquidTagsBalancedRule;

use crate::diagnostic::{RuleOutcome, Severity};
use blocksmith_common::{ParsedSchema, SchemaSetting};

/// Trait for implementing schema validation rules.
///
/// Rules are pure and independent: each sees the raw template and the
/// parsed schema (`None` when the block is absent or not a JSON object)
/// and never the outcome of another rule.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn severity(&self) -> Severity;

    fn check(&self, code: &str, schema: Option<&ParsedSchema>) -> RuleOutcome;
}

/// Registry of the validation rules to run
pub struct RuleRegistry {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(SchemaExistsRule),
                Box::new(SchemaValidJsonRule),
                Box::new(SchemaHasNameRule),
                Box::new(SchemaHasPresetsRule),
                Box::new(PresetMatchesNameRule),
                Box::new(NumberDefaultsAreNumbersRule),
                Box::new(RangeHasRequiredPropsRule),
                Box::new(SelectHasOptionsRule),
                Box::new(CssUsesSectionIdRule),
                Box::new(LiquidTagsBalancedRule),
            ],
        }
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn ValidationRule>] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&dyn ValidationRule> {
        self.rules.iter().find(|rule| rule.id() == id).map(|rule| rule.as_ref())
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a custom rule to the registry
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}

/// Section settings followed by every block's settings
fn all_settings(schema: &ParsedSchema) -> impl Iterator<Item = &SchemaSetting> {
    schema
        .settings
        .iter()
        .chain(schema.blocks.iter().flat_map(|block| block.settings.iter()))
}

fn has_settings(schema: &ParsedSchema) -> bool {
    all_settings(schema).next().is_some()
}

fn setting_label(setting: &SchemaSetting) -> &str {
    if setting.id.is_empty() {
        "(unnamed)"
    } else {
        &setting.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_ids_are_unique() {
        let registry = RuleRegistry::new();
        let ids: HashSet<_> = registry.rules().iter().map(|rule| rule.id()).collect();
        assert_eq!(ids.len(), registry.rules().len());
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_rules_are_described() {
        for rule in RuleRegistry::new().rules() {
            assert!(!rule.name().is_empty());
            assert!(!rule.description().is_empty());
        }
    }

    #[test]
    fn test_warning_rules() {
        let registry = RuleRegistry::new();
        let warnings: Vec<_> = registry
            .rules()
            .iter()
            .filter(|rule| rule.severity() == Severity::Warning)
            .map(|rule| rule.id())
            .collect();
        assert_eq!(
            warnings,
            vec!["schema-has-presets", "preset-matches-name", "css-uses-section-id"]
        );
    }
}
