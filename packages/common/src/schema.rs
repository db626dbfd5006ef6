//! Section schema: the JSON document embedded in `{% schema %}` blocks.
//!
//! Parsing is forgiving. A block that is missing or whose body is not a JSON
//! object yields `None`; a block with a few malformed entries still parses
//! and the odd entries are dropped.

use crate::lenient;
use crate::settings::{BlockInstance, SettingsState};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

/// Setting types whose value references a store resource by handle or id.
pub const RESOURCE_TYPES: [&str; 10] = [
    "product",
    "collection",
    "article",
    "blog",
    "page",
    "link_list",
    "product_list",
    "collection_list",
    "metaobject",
    "metaobject_list",
];

/// Setting types that only affect presentation.
pub const PRESENTATIONAL_TYPES: [&str; 10] = [
    "checkbox",
    "color",
    "color_background",
    "color_scheme",
    "font_picker",
    "number",
    "radio",
    "range",
    "select",
    "text_alignment",
];

/// Sidebar decorations that never hold a value.
const DISPLAY_ONLY_TYPES: [&str; 2] = ["header", "paragraph"];

pub fn is_resource_type(kind: &str) -> bool {
    RESOURCE_TYPES.contains(&kind)
}

pub fn is_presentational_type(kind: &str) -> bool {
    PRESENTATIONAL_TYPES.contains(&kind)
}

pub fn is_display_only_type(kind: &str) -> bool {
    DISPLAY_ONLY_TYPES.contains(&kind)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub value: String,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSetting {
    #[serde(rename = "type", default, deserialize_with = "lenient::string_or_empty")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,

    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Value>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaBlock {
    #[serde(rename = "type", default, deserialize_with = "lenient::string_or_empty")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub settings: Vec<SchemaSetting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetBlock {
    #[serde(rename = "type", default, deserialize_with = "lenient::string_or_empty")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient::object")]
    pub settings: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaPreset {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub settings: Map<String, Value>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub blocks: Vec<PresetBlock>,
}

/// Decoded `{% schema %}` JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSchema {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Value>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub settings: Vec<SchemaSetting>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub blocks: Vec<SchemaBlock>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub presets: Vec<SchemaPreset>,
}

impl ParsedSchema {
    pub fn block(&self, kind: &str) -> Option<&SchemaBlock> {
        self.blocks.iter().find(|block| block.kind == kind)
    }

    pub fn setting(&self, id: &str) -> Option<&SchemaSetting> {
        self.settings.iter().find(|setting| setting.id == id)
    }
}

fn schema_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)\{%-?\s*schema\s*-?%\}(.*?)\{%-?\s*endschema\s*-?%\}")
            .expect("schema block pattern compiles")
    })
}

/// Raw body of the first `{% schema %}` block, trimmed.
pub fn schema_source(code: &str) -> Option<&str> {
    schema_pattern()
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
}

/// Remove every `{% schema %}` block from the template.
pub fn strip_schema(code: &str) -> String {
    schema_pattern().replace_all(code, "").into_owned()
}

/// Parse the schema block, or `None` when it is absent or not a JSON object.
pub fn parse_schema(code: &str) -> Option<ParsedSchema> {
    let source = schema_source(code)?;

    let value: Value = match serde_json::from_str(source) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "schema block is not valid JSON");
            return None;
        }
    };

    if !value.is_object() {
        debug!("schema block is not a JSON object");
        return None;
    }

    serde_json::from_value(value).ok()
}

/// Turn a `t:` translation key into a readable label.
///
/// `t:sections.hero.settings.button_text.label` becomes `Button Text`. Plain
/// text is returned unchanged.
pub fn resolve_translation_key(key: &str) -> String {
    let Some(path) = key.strip_prefix("t:") else {
        return key.to_string();
    };

    let meaningful = path
        .split('.')
        .filter(|segment| !is_translation_noise(segment))
        .last();

    match meaningful {
        Some(segment) => title_case(segment),
        None => path.to_string(),
    }
}

fn is_translation_noise(segment: &str) -> bool {
    if matches!(
        segment,
        "sections" | "blocks" | "settings" | "label" | "info" | "placeholder" | "name" | "content"
    ) {
        return true;
    }

    segment
        .strip_prefix("options__")
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_labels(mut setting: SchemaSetting) -> SchemaSetting {
    setting.label = setting.label.map(|label| resolve_translation_key(&label));
    setting.info = setting.info.map(|info| resolve_translation_key(&info));
    setting.placeholder = setting
        .placeholder
        .map(|placeholder| resolve_translation_key(&placeholder));
    for option in &mut setting.options {
        option.label = option.label.take().map(|label| resolve_translation_key(&label));
    }
    setting
}

/// Editable section settings with their labels resolved.
pub fn extract_settings(schema: Option<&ParsedSchema>) -> Vec<SchemaSetting> {
    let Some(schema) = schema else {
        return Vec::new();
    };

    schema
        .settings
        .iter()
        .filter(|setting| !setting.id.is_empty() && !is_display_only_type(&setting.kind))
        .cloned()
        .map(resolve_labels)
        .collect()
}

/// Block definitions with their names and setting labels resolved.
pub fn extract_blocks(schema: Option<&ParsedSchema>) -> Vec<SchemaBlock> {
    let Some(schema) = schema else {
        return Vec::new();
    };

    schema
        .blocks
        .iter()
        .cloned()
        .map(|mut block| {
            block.name = block.name.map(|name| resolve_translation_key(&name));
            block.settings = block.settings.into_iter().map(resolve_labels).collect();
            block
        })
        .collect()
}

/// The value a setting starts with: its explicit default, or a per-type
/// fallback. Display-only settings have none.
pub fn initial_value(setting: &SchemaSetting) -> Option<Value> {
    if is_display_only_type(&setting.kind) {
        return None;
    }

    if let Some(default) = &setting.default {
        return Some(default.clone());
    }

    let value = match setting.kind.as_str() {
        "checkbox" => Value::Bool(false),
        "number" | "range" => setting.min.clone().unwrap_or_else(|| Value::from(0)),
        "color" | "color_background" => Value::from("#000000"),
        "select" | "radio" => Value::from(
            setting
                .options
                .first()
                .map(|option| option.value.clone())
                .unwrap_or_default(),
        ),
        "font_picker" => Value::from("system-ui"),
        "text_alignment" => Value::from("left"),
        "collection_list" | "product_list" => Value::from("[]"),
        "url" => Value::from("#"),
        _ => Value::from(""),
    };

    Some(value)
}

pub fn build_initial_state(settings: &[SchemaSetting]) -> SettingsState {
    settings
        .iter()
        .filter(|setting| !setting.id.is_empty())
        .filter_map(|setting| initial_value(setting).map(|value| (setting.id.clone(), value)))
        .collect()
}

/// Coerce an edited value to the JSON type its setting expects.
pub fn coerce_value(value: &Value, setting_type: &str) -> Value {
    match setting_type {
        "checkbox" => Value::Bool(is_truthy(value)),
        "number" | "range" => match value {
            Value::Number(_) => value.clone(),
            other => number_value(parse_leading_float(&scalar_to_string(other)).unwrap_or(0.0)),
        },
        _ => Value::String(scalar_to_string(value)),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Longest numeric prefix of `text`, the way browsers read form input.
fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = text.len();
    while end > 0 {
        if text.is_char_boundary(end) {
            if let Ok(parsed) = text[..end].parse::<f64>() {
                if parsed.is_finite() {
                    return Some(parsed);
                }
            }
        }
        end -= 1;
    }
    None
}

fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}

/// Block instances for the first preset, with each block's settings filled
/// from its definition's defaults and then the preset's own values.
pub fn build_block_instances_from_preset(schema: Option<&ParsedSchema>) -> Vec<BlockInstance> {
    let Some(schema) = schema else {
        return Vec::new();
    };
    let Some(preset) = schema.presets.first() else {
        return Vec::new();
    };

    preset
        .blocks
        .iter()
        .enumerate()
        .map(|(index, preset_block)| {
            let mut settings = schema
                .block(&preset_block.kind)
                .map(|definition| build_initial_state(&definition.settings))
                .unwrap_or_default();

            for (id, value) in &preset_block.settings {
                settings.insert(id.clone(), value.clone());
            }

            BlockInstance {
                id: format!("block-{}", index),
                kind: preset_block.kind.clone(),
                settings,
            }
        })
        .collect()
}

/// Result of writing edited values back into the schema defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefaultsUpdate {
    pub code: String,
    /// Resource-typed settings whose values cannot be stored as defaults.
    pub unsupported_settings: Vec<String>,
}

/// Write `new_defaults` into the `default` of matching settings.
///
/// The code is returned untouched when it has no schema block or the block
/// is not valid JSON. Resource-typed settings are skipped.
pub fn update_schema_defaults(code: &str, new_defaults: &SettingsState) -> String {
    update_schema_defaults_with_report(code, new_defaults).code
}

pub fn update_schema_defaults_with_report(
    code: &str,
    new_defaults: &SettingsState,
) -> SchemaDefaultsUpdate {
    let unchanged = || SchemaDefaultsUpdate {
        code: code.to_string(),
        unsupported_settings: Vec::new(),
    };

    let Some(caps) = schema_pattern().captures(code) else {
        return unchanged();
    };
    let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
        return unchanged();
    };
    let Ok(mut document) = serde_json::from_str::<Value>(body.as_str().trim()) else {
        return unchanged();
    };

    let mut unsupported_settings = Vec::new();
    if let Some(settings) = document.get_mut("settings").and_then(Value::as_array_mut) {
        for setting in settings.iter_mut() {
            let Some(object) = setting.as_object_mut() else {
                continue;
            };
            let id = object.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            let kind = object.get("type").and_then(Value::as_str).unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            let Some(value) = new_defaults.get(&id) else {
                continue;
            };
            if is_resource_type(kind) {
                unsupported_settings.push(id);
                continue;
            }
            object.insert("default".to_string(), value.clone());
        }
    }

    let Ok(json) = serde_json::to_string_pretty(&document) else {
        return unchanged();
    };

    let mut updated = String::with_capacity(code.len() + 32);
    updated.push_str(&code[..whole.start()]);
    updated.push_str("{% schema %}\n");
    updated.push_str(&json);
    updated.push_str("\n{% endschema %}");
    updated.push_str(&code[whole.end()..]);

    SchemaDefaultsUpdate {
        code: updated,
        unsupported_settings,
    }
}

/// Values in `values` that differ from the schema's starting values.
pub fn get_settings_diff(schema: Option<&ParsedSchema>, values: &SettingsState) -> SettingsState {
    let Some(schema) = schema else {
        return SettingsState::new();
    };

    schema
        .settings
        .iter()
        .filter(|setting| !setting.id.is_empty())
        .filter_map(|setting| {
            let current = values.get(&setting.id)?;
            let baseline = initial_value(setting)?;
            (*current != baseline).then(|| (setting.id.clone(), current.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn setting(value: Value) -> SchemaSetting {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_schema_tolerates_whitespace_control() {
        let code = r#"<div></div>{%- schema -%}{"name":"Hero"}{%- endschema -%}"#;
        let schema = parse_schema(code).unwrap();
        assert_eq!(schema.name.as_deref(), Some("Hero"));
    }

    #[test]
    fn test_parse_schema_rejects_missing_and_malformed_blocks() {
        assert!(parse_schema("<div>no schema</div>").is_none());
        assert!(parse_schema("{% schema %}{ invalid json {% endschema %}").is_none());
        assert!(parse_schema("{% schema %}{% endschema %}").is_none());
        assert!(parse_schema("{% schema %}[1, 2]{% endschema %}").is_none());
    }

    #[test]
    fn test_parse_schema_keeps_shape_with_odd_values() {
        let code = r#"{% schema %}{"name": 42, "presets": "nope", "settings": [{"type":"text","id":"a"}, 7]}{% endschema %}"#;
        let schema = parse_schema(code).unwrap();
        assert_eq!(schema.name, None);
        assert!(schema.presets.is_empty());
        assert_eq!(schema.settings.len(), 1);
    }

    #[test]
    fn test_strip_schema_removes_block() {
        let code = "<h1>Hi</h1>\n{% SCHEMA %}\n{\"name\":\"x\"}\n{% endschema %}";
        assert_eq!(strip_schema(code), "<h1>Hi</h1>\n");
    }

    #[test]
    fn test_resolve_translation_key() {
        assert_eq!(resolve_translation_key("t:sections.hero.settings.heading.label"), "Heading");
        assert_eq!(
            resolve_translation_key("t:sections.hero.settings.alignment.options__1.label"),
            "Alignment"
        );
        assert_eq!(
            resolve_translation_key("t:sections.blocks.settings.call_to_action.label"),
            "Call To Action"
        );
        assert_eq!(
            resolve_translation_key("t:sections.testimonials.blocks.testimonial.name"),
            "Testimonial"
        );
        assert_eq!(resolve_translation_key("t:label"), "label");
        assert_eq!(resolve_translation_key("Background Color"), "Background Color");
        assert_eq!(resolve_translation_key(""), "");
    }

    #[test]
    fn test_extract_settings_skips_display_only_and_resolves_labels() {
        let schema: ParsedSchema = serde_json::from_value(json!({
            "name": "Test",
            "settings": [
                {"type": "header", "content": "Heading"},
                {"type": "text", "id": "email", "label": "t:sections.contact.settings.email.label",
                 "info": "t:sections.contact.settings.email.info"},
                {"type": "text", "label": "no id"}
            ]
        }))
        .unwrap();

        let settings = extract_settings(Some(&schema));
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].label.as_deref(), Some("Email"));
        assert_eq!(settings[0].info.as_deref(), Some("Email"));
    }

    #[test]
    fn test_build_initial_state_type_defaults() {
        let settings = vec![
            setting(json!({"type": "checkbox", "id": "enabled"})),
            setting(json!({"type": "range", "id": "opacity", "min": 0.5, "max": 1})),
            setting(json!({"type": "number", "id": "count"})),
            setting(json!({"type": "color", "id": "text_color"})),
            setting(json!({"type": "radio", "id": "layout", "options": [{"value": "grid"}, {"value": "list"}]})),
            setting(json!({"type": "font_picker", "id": "font"})),
            setting(json!({"type": "text_alignment", "id": "align"})),
            setting(json!({"type": "product_list", "id": "products"})),
            setting(json!({"type": "url", "id": "link"})),
            setting(json!({"type": "product", "id": "featured"})),
            setting(json!({"type": "paragraph", "id": "para"})),
            setting(json!({"type": "url", "id": "shop_link", "default": "/products"})),
        ];

        let state = build_initial_state(&settings);
        assert_eq!(state.get("enabled"), Some(&json!(false)));
        assert_eq!(state.get("opacity"), Some(&json!(0.5)));
        assert_eq!(state.get("count"), Some(&json!(0)));
        assert_eq!(state.get("text_color"), Some(&json!("#000000")));
        assert_eq!(state.get("layout"), Some(&json!("grid")));
        assert_eq!(state.get("font"), Some(&json!("system-ui")));
        assert_eq!(state.get("align"), Some(&json!("left")));
        assert_eq!(state.get("products"), Some(&json!("[]")));
        assert_eq!(state.get("link"), Some(&json!("#")));
        assert_eq!(state.get("featured"), Some(&json!("")));
        assert_eq!(state.get("para"), None);
        assert_eq!(state.get("shop_link"), Some(&json!("/products")));
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value(&json!(1), "checkbox"), json!(true));
        assert_eq!(coerce_value(&json!(0), "checkbox"), json!(false));
        assert_eq!(coerce_value(&json!(""), "checkbox"), json!(false));
        assert_eq!(coerce_value(&json!("true"), "checkbox"), json!(true));
        assert_eq!(coerce_value(&json!("42"), "number"), json!(42));
        assert_eq!(coerce_value(&json!("3.14"), "number"), json!(3.14));
        assert_eq!(coerce_value(&json!("invalid"), "number"), json!(0));
        assert_eq!(coerce_value(&json!("0.5"), "range"), json!(0.5));
        assert_eq!(coerce_value(&json!(123), "text"), json!("123"));
        assert_eq!(coerce_value(&json!(true), "text"), json!("true"));
    }

    #[test]
    fn test_build_block_instances_from_preset() {
        let schema: ParsedSchema = serde_json::from_value(json!({
            "name": "Slideshow",
            "blocks": [{
                "type": "slide",
                "settings": [
                    {"type": "text", "id": "title", "default": "Slide"},
                    {"type": "checkbox", "id": "dark"}
                ]
            }],
            "presets": [{
                "name": "Slideshow",
                "blocks": [{"type": "slide"}, {"type": "slide", "settings": {"title": "Second"}}]
            }]
        }))
        .unwrap();

        let blocks = build_block_instances_from_preset(Some(&schema));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id, "block-0");
        assert_eq!(blocks[0].settings.get("title"), Some(&json!("Slide")));
        assert_eq!(blocks[0].settings.get("dark"), Some(&json!(false)));
        assert_eq!(blocks[1].settings.get("title"), Some(&json!("Second")));
    }

    #[test]
    fn test_update_schema_defaults_reports_resource_settings() {
        let code = r#"<div></div>
{% schema %}
{
  "name": "Test",
  "settings": [
    { "type": "text", "id": "heading", "label": "Heading", "default": "Hello" },
    { "type": "product", "id": "product", "label": "Product" }
  ]
}
{% endschema %}"#;

        let mut values = SettingsState::new();
        values.insert("heading", "Updated");
        values.insert("product", "pid");
        values.insert("unknown_id", "ignored");

        let update = update_schema_defaults_with_report(code, &values);
        assert!(update.code.starts_with("<div></div>\n{% schema %}"));
        assert!(update.code.contains(r#""default": "Updated""#));
        assert!(update.code.contains(r#""label": "Heading""#));
        assert!(!update.code.contains("unknown_id"));
        assert!(!update.code.contains(r#""default": "pid""#));
        assert_eq!(update.unsupported_settings, vec!["product".to_string()]);
        assert!(parse_schema(&update.code).is_some());
    }

    #[test]
    fn test_update_schema_defaults_leaves_unparsable_code() {
        let malformed = "{% schema %} invalid json {% endschema %}";
        let mut values = SettingsState::new();
        values.insert("heading", "Test");
        assert_eq!(update_schema_defaults(malformed, &values), malformed);
    }

    #[test]
    fn test_get_settings_diff_uses_type_defaults() {
        let schema: ParsedSchema = serde_json::from_value(json!({
            "name": "Test",
            "settings": [
                {"type": "checkbox", "id": "enabled"},
                {"type": "url", "id": "link"},
                {"type": "header", "id": ""}
            ]
        }))
        .unwrap();

        let mut values = SettingsState::new();
        values.insert("enabled", false);
        values.insert("link", "/products");

        let diff = get_settings_diff(Some(&schema), &values);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get("link"), Some(&json!("/products")));
        assert!(get_settings_diff(None, &values).is_empty());
    }

    #[test]
    fn test_type_catalogs() {
        assert!(is_resource_type("metaobject_list"));
        assert!(!is_resource_type("image_picker"));
        assert!(is_presentational_type("text_alignment"));
        assert!(!is_presentational_type("richtext"));
    }
}
