pub mod diff;
pub mod preview;
pub mod render;
pub mod validate;

pub use diff::{diff, DiffArgs};
pub use preview::{preview, PreviewArgs};
pub use render::{render, RenderArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::{anyhow, Context, Result};
use blocksmith_common::{
    build_block_instances_from_preset, build_initial_state, extract_settings, parse_schema,
    BlockInstance, SettingsState,
};
use blocksmith_evaluator::RenderError;
use blocksmith_parser::format_error;
use std::fs;
use std::path::Path;

pub(crate) fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

/// Settings and blocks for a render: schema defaults and preset blocks,
/// overridden by whatever was passed on the command line.
pub(crate) fn initial_context(
    source: &str,
    settings: Option<&str>,
    blocks: Option<&str>,
) -> Result<(SettingsState, Vec<BlockInstance>)> {
    let schema = parse_schema(source);
    let mut state = build_initial_state(&extract_settings(schema.as_ref()));
    if let Some(json) = settings {
        let overrides: SettingsState =
            serde_json::from_str(json).context("--settings must be a JSON object")?;
        state.merge(&overrides);
    }

    let blocks = match blocks {
        Some(json) => serde_json::from_str(json).context("--blocks must be a JSON array of blocks")?,
        None => build_block_instances_from_preset(schema.as_ref()),
    };
    Ok((state, blocks))
}

/// Parse errors get a source excerpt; everything else its message.
pub(crate) fn render_failure(source: &str, path: &Path, err: RenderError) -> anyhow::Error {
    match err {
        RenderError::Parse(parse) => {
            eprintln!("{}", format_error(source, &path.to_string_lossy(), &parse));
            anyhow!("Failed to parse {}", path.display())
        }
        RenderError::Eval(eval) => anyhow!("Failed to render {}: {}", path.display(), eval),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SECTION: &str = r#"<h2>{{ section.settings.heading }}</h2>
{% schema %}
{
  "name": "Slideshow",
  "settings": [{ "type": "text", "id": "heading", "default": "Hello" }],
  "blocks": [{ "type": "slide", "name": "Slide", "settings": [] }],
  "presets": [{ "name": "Slideshow", "blocks": [{ "type": "slide" }, { "type": "slide" }] }]
}
{% endschema %}"#;

    #[test]
    fn test_defaults_from_schema() {
        let (settings, blocks) = initial_context(SECTION, None, None).unwrap();
        assert_eq!(settings.get("heading"), Some(&json!("Hello")));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_overrides_win() {
        let (settings, blocks) =
            initial_context(SECTION, Some(r#"{"heading":"Sale"}"#), Some("[]")).unwrap();
        assert_eq!(settings.get("heading"), Some(&json!("Sale")));
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_bad_settings_json() {
        assert!(initial_context(SECTION, Some("[1]"), None).is_err());
    }
}
