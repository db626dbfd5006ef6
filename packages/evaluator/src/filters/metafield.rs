use super::html::escape_html;
use super::utility::parse_date;
use super::{FilterArgs, Registry};
use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::value::Value;
use regex::RegexBuilder;
use std::sync::OnceLock;

const LOCAL_DATE: &str = "%-m/%-d/%Y";

pub(super) fn register(filters: &mut Registry) {
    filters.insert("metafield_tag", metafield_tag);
    filters.insert("metafield_text", metafield_text);
}

/// `type` of a metafield, defaulting to single-line text
fn field_type(metafield: &Value) -> String {
    match metafield.get("type").render() {
        kind if kind.is_empty() => "single_line_text_field".to_string(),
        kind => kind,
    }
}

fn is_image_url(url: &str) -> bool {
    static IMAGE: OnceLock<regex::Regex> = OnceLock::new();
    IMAGE
        .get_or_init(|| {
            RegexBuilder::new(r"\.(jpg|jpeg|png|gif|webp|svg)$")
                .case_insensitive(true)
                .build()
                .expect("static regex")
        })
        .is_match(url)
}

fn or_default(text: String, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn local_date(value: &Value, ctx: &RenderContext) -> String {
    parse_date(value, ctx)
        .map(|at| at.format(LOCAL_DATE).to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

fn metafield_tag(input: Value, _: &FilterArgs, ctx: &RenderContext) -> EvalResult<Value> {
    if !input.is_truthy() {
        return Ok(Value::string(""));
    }
    let value = input.get("value");
    let text = || escape_html(&value.render());

    let html = match field_type(&input).as_str() {
        "single_line_text_field" | "multi_line_text_field" => {
            format!(r#"<span class="metafield metafield--text">{}</span>"#, text())
        }
        "rich_text_field" => {
            format!(r#"<div class="metafield metafield--rich-text">{}</div>"#, value.render())
        }
        "url" => format!(
            r#"<a href="{0}" class="metafield metafield--url">{0}</a>"#,
            text()
        ),
        "color" => format!(
            r#"<span class="metafield metafield--color" style="background-color: {}"></span>"#,
            text()
        ),
        "rating" => {
            let rating = value.get("value").as_f64().unwrap_or(0.0);
            let scale_max = value.get("scale_max").as_f64().unwrap_or(0.0);
            let filled = rating.round().max(0.0) as usize;
            let empty = (scale_max - rating.round()).max(0.0) as usize;
            format!(
                r#"<span class="metafield metafield--rating" aria-label="{} out of {}">{}{}</span>"#,
                value.get("value").render(),
                value.get("scale_max").render(),
                "\u{2605}".repeat(filled),
                "\u{2606}".repeat(empty)
            )
        }
        "file_reference" => {
            let url = value.get("url").render();
            let alt = value.get("alt").render();
            if is_image_url(&url) {
                format!(
                    r#"<img src="{}" alt="{}" class="metafield metafield--image">"#,
                    escape_html(&url),
                    escape_html(&alt)
                )
            } else {
                format!(
                    r#"<a href="{}" class="metafield metafield--file">{}</a>"#,
                    escape_html(&url),
                    escape_html(&or_default(alt, "Download"))
                )
            }
        }
        "product_reference" | "collection_reference" | "page_reference" => format!(
            r#"<a href="{}" class="metafield metafield--reference">{}</a>"#,
            escape_html(&or_default(value.get("url").render(), "#")),
            escape_html(&or_default(value.get("title").render(), "Link"))
        ),
        "boolean" => (if value.is_truthy() { "Yes" } else { "No" }).to_string(),
        "number_integer" | "number_decimal" => {
            format!(r#"<span class="metafield metafield--number">{}</span>"#, value.render())
        }
        "date" | "date_time" => format!(
            r#"<time datetime="{}" class="metafield metafield--date">{}</time>"#,
            value.render(),
            local_date(&value, ctx)
        ),
        "json" => {
            let pretty = serde_json::to_string_pretty(&value.to_json()).unwrap_or_default();
            format!(r#"<pre class="metafield metafield--json">{}</pre>"#, escape_html(&pretty))
        }
        _ => value.render(),
    };
    Ok(Value::Str(html))
}

fn metafield_text(input: Value, _: &FilterArgs, ctx: &RenderContext) -> EvalResult<Value> {
    if !input.is_truthy() {
        return Ok(Value::string(""));
    }
    let value = input.get("value");
    let text = match field_type(&input).as_str() {
        "rating" => format!(
            "{}/{}",
            value.get("value").render(),
            value.get("scale_max").render()
        ),
        "file_reference" => value.get("url").render(),
        "product_reference" | "collection_reference" | "page_reference" => {
            value.get("title").render()
        }
        "date" | "date_time" => local_date(&value, ctx),
        "json" => value.to_json().to_string(),
        _ => value.render(),
    };
    Ok(Value::Str(text))
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::run_text;
    use crate::value::Value;
    use serde_json::json;

    fn field(kind: &str, value: serde_json::Value) -> Value {
        Value::from(json!({"type": kind, "value": value}))
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            run_text("metafield_tag", field("single_line_text_field", json!("<b>Hi</b>")), vec![]),
            r#"<span class="metafield metafield--text">&lt;b&gt;Hi&lt;/b&gt;</span>"#
        );
    }

    #[test]
    fn test_rating() {
        let rating = field("rating", json!({"value": 4, "scale_max": 5}));
        assert_eq!(
            run_text("metafield_tag", rating.clone(), vec![]),
            r#"<span class="metafield metafield--rating" aria-label="4 out of 5">★★★★☆</span>"#
        );
        assert_eq!(run_text("metafield_text", rating, vec![]), "4/5");
    }

    #[test]
    fn test_file_reference() {
        let image = field("file_reference", json!({"url": "/a.PNG", "alt": "A"}));
        assert!(run_text("metafield_tag", image, vec![]).starts_with("<img"));
        let pdf = field("file_reference", json!({"url": "/a.pdf"}));
        assert_eq!(
            run_text("metafield_tag", pdf, vec![]),
            r#"<a href="/a.pdf" class="metafield metafield--file">Download</a>"#
        );
    }

    #[test]
    fn test_boolean_and_reference() {
        assert_eq!(run_text("metafield_tag", field("boolean", json!(true)), vec![]), "Yes");
        assert_eq!(
            run_text("metafield_tag", field("product_reference", json!({})), vec![]),
            r##"<a href="#" class="metafield metafield--reference">Link</a>"##
        );
    }

    #[test]
    fn test_date_text() {
        assert_eq!(run_text("metafield_text", field("date", json!("2024-02-03")), vec![]), "2/3/2024");
    }

    #[test]
    fn test_nil_metafield() {
        assert_eq!(run_text("metafield_tag", Value::Nil, vec![]), "");
        assert_eq!(run_text("metafield_text", Value::Nil, vec![]), "");
    }
}
