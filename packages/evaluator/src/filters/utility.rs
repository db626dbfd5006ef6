//! General-purpose storefront filters.

use super::html::escape_html;
use super::{FilterArgs, Registry};
use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::value::Value;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use regex::{Regex, RegexBuilder};
use std::fmt::Write;
use std::sync::OnceLock;

const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

pub(super) fn register(filters: &mut Registry) {
    filters.insert("default", default);
    filters.insert("default_errors", default_errors);
    filters.insert("default_pagination", default_pagination);
    filters.insert("highlight", highlight);
    filters.insert("payment_type_img_url", |v, _, _| {
        Ok(Value::Str(format!(
            "https://cdn.shopify.com/s/files/1/0000/0001/files/{}.svg",
            v.render()
        )))
    });
    filters.insert("payment_type_svg_tag", |v, _, _| Ok(Value::Str(payment_icon(&v.render()))));
    filters.insert("stylesheet_tag", |v, _, _| {
        Ok(Value::Str(format!(
            r#"<link rel="stylesheet" href="{}" type="text/css">"#,
            escape_html(&v.render())
        )))
    });
    filters.insert("script_tag", |v, _, _| {
        Ok(Value::Str(format!(r#"<script src="{}"></script>"#, escape_html(&v.render()))))
    });
    filters.insert("preload_tag", preload_tag);
    filters.insert("time_tag", time_tag);
    filters.insert("weight_with_unit", weight_with_unit);
    filters.insert("pluralize", pluralize);
    filters.insert("handle", |v, _, _| Ok(Value::Str(handleize(&v.render()))));
    filters.insert("handleize", |v, _, _| Ok(Value::Str(handleize(&v.render()))));
    // Translation keys render as themselves
    filters.insert("t", |v, _, _| Ok(v));
    filters.insert("json", |v, _, _| Ok(Value::Str(v.to_json().to_string())));
    filters.insert("date", date);
}

/// `nil`, `""` and `false` take the fallback
fn default(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let missing = match &input {
        Value::Nil | Value::Bool(false) => true,
        Value::Str(s) => s.is_empty(),
        _ => false,
    };
    Ok(if missing { args.arg(0) } else { input })
}

fn default_errors(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let Value::Array(errors) = input else {
        return Ok(Value::string(""));
    };
    let items: String = errors
        .iter()
        .map(|error| {
            let message = match error {
                Value::Str(s) => s.clone(),
                other => other.get("message").render(),
            };
            format!("<li>{}</li>", escape_html(&message))
        })
        .collect();
    Ok(Value::Str(format!(r#"<ul class="form-errors">{}</ul>"#, items)))
}

fn default_pagination(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    if !input.is_truthy() {
        return Ok(Value::string(""));
    }
    let mut html = String::from(r#"<nav class="pagination">"#);

    let previous = input.get("previous");
    if previous.is_truthy() {
        let _ = write!(
            html,
            r#"<a href="{}" class="pagination__prev">Previous</a>"#,
            escape_html(&previous.get("url").render())
        );
    }

    let parts = input.get("parts");
    if let Value::Array(parts) = parts {
        html.push_str(r#"<span class="pagination__pages">"#);
        for part in parts {
            let title = escape_html(&part.get("title").render());
            if part.get("is_link").is_truthy() {
                let url = escape_html(&part.get("url").render());
                let _ = write!(html, r#"<a href="{}">{}</a>"#, url, title);
            } else {
                let _ = write!(html, r#"<span class="pagination__current">{}</span>"#, title);
            }
        }
        html.push_str("</span>");
    }

    let next = input.get("next");
    if next.is_truthy() {
        let _ = write!(
            html,
            r#"<a href="{}" class="pagination__next">Next</a>"#,
            escape_html(&next.get("url").render())
        );
    }

    html.push_str("</nav>");
    Ok(Value::Str(html))
}

/// Wrap case-insensitive matches of the query in `<mark>`
fn highlight(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let text = input.render();
    let query = args.text(0);
    if text.is_empty() || query.is_empty() {
        return Ok(Value::Str(text));
    }
    let pattern = RegexBuilder::new(&format!("({})", regex::escape(&query)))
        .case_insensitive(true)
        .build();
    Ok(Value::Str(match pattern {
        Ok(pattern) => pattern.replace_all(&text, "<mark>$1</mark>").into_owned(),
        Err(_) => text,
    }))
}

fn payment_icon(kind: &str) -> String {
    let icon = match kind {
        "visa" => r##"<svg viewBox="0 0 38 24"><rect fill="#1434CB" width="38" height="24" rx="3"/><text x="19" y="15" fill="white" text-anchor="middle" font-size="8">VISA</text></svg>"##,
        "mastercard" => r##"<svg viewBox="0 0 38 24"><rect fill="#EB001B" width="38" height="24" rx="3"/><circle cx="15" cy="12" r="7" fill="#F79E1B" fill-opacity="0.8"/><text x="19" y="15" fill="white" text-anchor="middle" font-size="6">MC</text></svg>"##,
        "american_express" => r##"<svg viewBox="0 0 38 24"><rect fill="#006FCF" width="38" height="24" rx="3"/><text x="19" y="15" fill="white" text-anchor="middle" font-size="6">AMEX</text></svg>"##,
        "paypal" => r##"<svg viewBox="0 0 38 24"><rect fill="#003087" width="38" height="24" rx="3"/><text x="19" y="15" fill="white" text-anchor="middle" font-size="6">PayPal</text></svg>"##,
        "shopify_pay" => r##"<svg viewBox="0 0 38 24"><rect fill="#5C6AC4" width="38" height="24" rx="3"/><text x="19" y="15" fill="white" text-anchor="middle" font-size="6">Shop</text></svg>"##,
        other => {
            return format!(
                r##"<svg viewBox="0 0 38 24"><rect fill="#ccc" width="38" height="24" rx="3"/><text x="19" y="15" fill="#666" text-anchor="middle" font-size="6">{}</text></svg>"##,
                escape_html(other)
            )
        }
    };
    icon.to_string()
}

fn preload_tag(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let as_attr = match args.arg(0) {
        Value::Nil => String::new(),
        kind => format!(r#" as="{}""#, escape_html(&kind.render())),
    };
    Ok(Value::Str(format!(
        r#"<link rel="preload" href="{}"{}>"#,
        escape_html(&input.render()),
        as_attr
    )))
}

/// Parse a date input; `now` and `today` read the render clock.
pub(crate) fn parse_date(input: &Value, ctx: &RenderContext) -> Option<DateTime<Utc>> {
    match input {
        Value::Int(secs) => Utc.timestamp_opt(*secs, 0).single(),
        Value::Str(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("now") || s.eq_ignore_ascii_case("today") {
                return Some(ctx.now());
            }
            if let Ok(at) = DateTime::parse_from_rfc3339(s) {
                return Some(at.with_timezone(&Utc));
            }
            if let Ok(at) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(at.and_utc());
            }
            if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return day.and_hms_opt(0, 0, 0).map(|at| at.and_utc());
            }
            s.parse::<i64>()
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        }
        _ => None,
    }
}

/// Format with a strftime pattern, `None` when the pattern is invalid
fn strftime(at: &DateTime<Utc>, pattern: &str) -> Option<String> {
    let items: Vec<Item> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(at.format_with_items(items.into_iter()).to_string())
}

fn date(input: Value, args: &FilterArgs, ctx: &RenderContext) -> EvalResult<Value> {
    let Some(at) = parse_date(&input, ctx) else {
        return Ok(input);
    };
    let pattern = match args.arg(0) {
        Value::Nil => DEFAULT_DATE_FORMAT.to_string(),
        pattern => pattern.render(),
    };
    Ok(match strftime(&at, &pattern) {
        Some(formatted) => Value::Str(formatted),
        None => input,
    })
}

fn time_tag(input: Value, args: &FilterArgs, ctx: &RenderContext) -> EvalResult<Value> {
    let Some(at) = parse_date(&input, ctx) else {
        return Ok(Value::string(""));
    };
    let display = match args.arg(0) {
        Value::Nil => strftime(&at, "%-m/%-d/%Y, %-I:%M:%S %p"),
        pattern => strftime(&at, &pattern.render()).or_else(|| strftime(&at, "%-m/%-d/%Y")),
    }
    .unwrap_or_default();
    Ok(Value::Str(format!(
        r#"<time datetime="{}">{}</time>"#,
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        escape_html(&display)
    )))
}

/// Grams to the requested unit, two decimals
fn weight_with_unit(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let grams = input.as_f64().unwrap_or(0.0);
    let unit = match args.arg(0) {
        Value::Nil => "kg".to_string(),
        unit => unit.render(),
    };
    let (value, unit) = match unit.as_str() {
        "kg" => (grams / 1000.0, "kg"),
        "lb" => (grams * 0.00220462, "lb"),
        "oz" => (grams * 0.035274, "oz"),
        _ => (grams, "g"),
    };
    Ok(Value::Str(format!("{:.2} {}", value, unit)))
}

fn pluralize(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let singular = input.as_f64() == Some(1.0);
    Ok(args.arg(if singular { 0 } else { 1 }))
}

/// Lowercase, runs of non-alphanumerics to `-`, no leading or trailing dash
pub fn handleize(text: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let non_alnum = NON_ALNUM.get_or_init(|| Regex::new("[^a-z0-9]+").expect("static regex"));
    non_alnum
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
