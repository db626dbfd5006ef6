use crate::diagnostic::{RuleOutcome, Severity};
use crate::rules::ValidationRule;
use blocksmith_common::ParsedSchema;

pub struct SchemaHasNameRule;

impl ValidationRule for SchemaHasNameRule {
    fn id(&self) -> &'static str {
        "schema-has-name"
    }

    fn name(&self) -> &'static str {
        "Schema has a name"
    }

    fn description(&self) -> &'static str {
        "The section name shown in the theme editor"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, _: &str, schema: Option<&ParsedSchema>) -> RuleOutcome {
        match schema.and_then(|schema| schema.name.as_deref()) {
            Some(name) => RuleOutcome::pass(format!("Section name: \"{}\"", name)),
            None => RuleOutcome::fail("Missing \"name\" property")
                .with_suggestion("Add \"name\": \"My Section\" to the schema"),
        }
    }
}

pub struct SchemaHasPresetsRule;

impl ValidationRule for SchemaHasPresetsRule {
    fn id(&self) -> &'static str {
        "schema-has-presets"
    }

    fn name(&self) -> &'static str {
        "Schema has presets"
    }

    fn description(&self) -> &'static str {
        "Without presets a section cannot be added from the theme editor"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, _: &str, schema: Option<&ParsedSchema>) -> RuleOutcome {
        match schema {
            Some(schema) if !schema.presets.is_empty() => RuleOutcome::pass("Presets defined"),
            _ => RuleOutcome::fail("No presets found")
                .with_suggestion("Add \"presets\": [{ \"name\": \"My Section\" }] to the schema"),
        }
    }
}

/// The first preset is named after the section
pub struct PresetMatchesNameRule;

impl ValidationRule for PresetMatchesNameRule {
    fn id(&self) -> &'static str {
        "preset-matches-name"
    }

    fn name(&self) -> &'static str {
        "Preset name matches section name"
    }

    fn description(&self) -> &'static str {
        "The first preset should carry the section's name"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, _: &str, schema: Option<&ParsedSchema>) -> RuleOutcome {
        let name = schema.and_then(|schema| schema.name.as_deref());
        let preset = schema
            .and_then(|schema| schema.presets.first())
            .and_then(|preset| preset.name.as_deref());

        match (name, preset) {
            (Some(name), Some(preset)) if name == preset => RuleOutcome::pass("Preset name matches"),
            (Some(name), Some(preset)) => RuleOutcome::fail(format!(
                "Preset name \"{}\" doesn't match section name \"{}\"",
                preset, name
            ))
            .with_suggestion(format!("Rename the first preset to \"{}\"", name)),
            _ => RuleOutcome::pass("Skipped (no name or preset)"),
        }
    }
}
