use super::{FilterArgs, Registry};
use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::value::Value;
use std::collections::BTreeMap;

pub(super) fn register(filters: &mut Registry) {
    filters.insert("font_face", font_face);
    filters.insert("font_url", font_url);
    filters.insert("font_modify", font_modify);
}

fn prop_or(font: &Value, key: &str, fallback: &str) -> String {
    match font.get(key) {
        Value::Nil => fallback.to_string(),
        value => match value.render() {
            text if text.is_empty() => fallback.to_string(),
            text => text,
        },
    }
}

/// `@font-face` rule for a font setting
fn font_face(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    if !input.is_truthy() {
        return Ok(Value::string(""));
    }
    let family = prop_or(&input, "family", "sans-serif");
    Ok(Value::Str(format!(
        "@font-face {{\n  font-family: \"{family}\";\n  font-weight: {weight};\n  font-style: {style};\n  font-display: swap;\n  src: local(\"{family}\");\n}}",
        family = family,
        weight = prop_or(&input, "weight", "400"),
        style = prop_or(&input, "style", "normal"),
    )))
}

fn font_url(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    if !input.is_truthy() {
        return Ok(Value::string(""));
    }
    let family = prop_or(&input, "family", "arial")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let format = match args.arg(0) {
        Value::Nil => "woff2".to_string(),
        format => format.render(),
    };
    Ok(Value::Str(format!(
        "https://fonts.shopifycdn.com/preview/{}.{}",
        family, format
    )))
}

/// Copy of the font with `weight` or `style` replaced
fn font_modify(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    if !input.is_truthy() {
        return Ok(Value::object([("family", Value::string("sans-serif"))]));
    }
    let mut fields = match Value::from(input.to_json()) {
        Value::Object(fields) => fields,
        _ => BTreeMap::new(),
    };
    let value = args.arg(1);
    match args.text(0).as_str() {
        "weight" => {
            let weight = match &value {
                Value::Str(s) if s == "bold" => Value::Int(700),
                Value::Str(s) if s == "normal" => Value::Int(400),
                other => other.as_i64().map(Value::Int).unwrap_or_default(),
            };
            fields.insert("weight".to_string(), weight);
        }
        "style" => {
            fields.insert("style".to_string(), Value::Str(value.render()));
        }
        _ => {}
    }
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::{run, run_text};
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_font_face_defaults() {
        let css = run_text("font_face", Value::from(json!({"family": "Inter"})), vec![]);
        assert_eq!(
            css,
            "@font-face {\n  font-family: \"Inter\";\n  font-weight: 400;\n  font-style: normal;\n  font-display: swap;\n  src: local(\"Inter\");\n}"
        );
        assert_eq!(run_text("font_face", Value::Nil, vec![]), "");
    }

    #[test]
    fn test_font_url() {
        let font = Value::from(json!({"family": "Open Sans"}));
        assert_eq!(
            run_text("font_url", font.clone(), vec![]),
            "https://fonts.shopifycdn.com/preview/open-sans.woff2"
        );
        assert_eq!(
            run_text("font_url", font, vec![Value::string("woff")]),
            "https://fonts.shopifycdn.com/preview/open-sans.woff"
        );
    }

    #[test]
    fn test_font_modify() {
        let font = Value::from(json!({"family": "Inter", "weight": 400}));
        let bold = run("font_modify", font.clone(), vec![Value::string("weight"), Value::string("bold")]);
        assert_eq!(bold.get("weight"), Value::Int(700));
        assert_eq!(bold.get("family"), Value::string("Inter"));

        let italic = run("font_modify", font, vec![Value::string("style"), Value::string("italic")]);
        assert_eq!(italic.get("style"), Value::string("italic"));

        let missing = run("font_modify", Value::Nil, vec![Value::string("weight"), Value::Int(700)]);
        assert_eq!(missing.get("family"), Value::string("sans-serif"));
    }
}
