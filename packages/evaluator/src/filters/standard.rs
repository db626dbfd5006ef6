//! String, array and math filters of the base language.

use super::html::escape_html;
use super::{FilterArgs, Registry};
use crate::context::RenderContext;
use crate::error::{EvalError, EvalResult};
use crate::value::{Number, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

pub(super) fn register(filters: &mut Registry) {
    // strings
    filters.insert("append", append);
    filters.insert("prepend", prepend);
    filters.insert("upcase", |v, _, _| Ok(Value::Str(v.render().to_uppercase())));
    filters.insert("downcase", |v, _, _| Ok(Value::Str(v.render().to_lowercase())));
    filters.insert("capitalize", capitalize);
    filters.insert("strip", |v, _, _| Ok(Value::string(v.render().trim())));
    filters.insert("lstrip", |v, _, _| Ok(Value::string(v.render().trim_start())));
    filters.insert("rstrip", |v, _, _| Ok(Value::string(v.render().trim_end())));
    filters.insert("strip_html", strip_html);
    filters.insert("strip_newlines", |v, _, _| {
        Ok(Value::Str(v.render().replace("\r\n", "").replace('\n', "")))
    });
    filters.insert("newline_to_br", |v, _, _| {
        Ok(Value::Str(v.render().replace("\r\n", "\n").replace('\n', "<br />\n")))
    });
    filters.insert("escape", |v, _, _| Ok(Value::Str(escape_html(&v.render()))));
    filters.insert("escape_once", escape_once);
    filters.insert("url_encode", url_encode);
    filters.insert("url_escape", url_encode);
    filters.insert("url_param_escape", url_encode);
    filters.insert("url_decode", url_decode);
    filters.insert("replace", replace);
    filters.insert("replace_first", replace_first);
    filters.insert("replace_last", replace_last);
    filters.insert("remove", remove);
    filters.insert("remove_first", remove_first);
    filters.insert("remove_last", remove_last);
    filters.insert("truncate", truncate);
    filters.insert("truncatewords", truncatewords);
    filters.insert("split", split);
    filters.insert("slice", slice);
    filters.insert("size", size);

    // arrays
    filters.insert("join", join);
    filters.insert("first", |v, _, _| Ok(v.get("first")));
    filters.insert("last", |v, _, _| Ok(v.get("last")));
    filters.insert("reverse", reverse);
    filters.insert("sort", sort);
    filters.insert("sort_natural", sort_natural);
    filters.insert("uniq", uniq);
    filters.insert("compact", compact);
    filters.insert("map", map);
    filters.insert("where", where_filter);
    filters.insert("concat", concat);
    filters.insert("sum", sum);

    // math
    filters.insert("plus", plus);
    filters.insert("minus", minus);
    filters.insert("times", times);
    filters.insert("divided_by", divided_by);
    filters.insert("modulo", modulo);
    filters.insert("abs", abs);
    filters.insert("ceil", |v, _, _| Ok(round_to_int(&v, f64::ceil)));
    filters.insert("floor", |v, _, _| Ok(round_to_int(&v, f64::floor)));
    filters.insert("round", round);
    filters.insert("at_least", at_least);
    filters.insert("at_most", at_most);
}

fn append(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(input.render() + &args.text(0)))
}

fn prepend(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(args.text(0) + &input.render()))
}

fn capitalize(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let text = input.render();
    let mut chars = text.chars();
    Ok(Value::Str(match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }))
}

fn strip_html(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| {
        Regex::new(r"(?is)<script.*?</script>|<style.*?</style>|<!--.*?-->|<[^>]*>")
            .expect("static regex")
    });
    Ok(Value::Str(tags.replace_all(&input.render(), "").into_owned()))
}

fn escape_once(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let unescaped = input
        .render()
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    Ok(Value::Str(escape_html(&unescaped)))
}

fn url_encode(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(
        urlencoding::encode(&input.render()).replace("%20", "+"),
    ))
}

fn url_decode(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let text = input.render().replace('+', " ");
    Ok(Value::Str(match urlencoding::decode(&text) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text,
    }))
}

fn replace(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(input.render().replace(&args.text(0), &args.text(1))))
}

fn replace_first(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(input.render().replacen(&args.text(0), &args.text(1), 1)))
}

fn replace_last(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let text = input.render();
    let (needle, replacement) = (args.text(0), args.text(1));
    Ok(Value::Str(match text.rfind(&needle) {
        Some(at) if !needle.is_empty() => {
            format!("{}{}{}", &text[..at], replacement, &text[at + needle.len()..])
        }
        _ => text,
    }))
}

fn remove(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(input.render().replace(&args.text(0), "")))
}

fn remove_first(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(input.render().replacen(&args.text(0), "", 1)))
}

fn remove_last(input: Value, args: &FilterArgs, ctx: &RenderContext) -> EvalResult<Value> {
    let args = FilterArgs::new(vec![args.arg(0), Value::string("")]);
    replace_last(input, &args, ctx)
}

fn truncate(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let text = input.render();
    let length = args.arg(0).as_i64().unwrap_or(50).max(0) as usize;
    let ellipsis = match args.arg(1) {
        Value::Nil => "...".to_string(),
        other => other.render(),
    };
    if text.chars().count() <= length {
        return Ok(Value::Str(text));
    }
    let keep = length.saturating_sub(ellipsis.chars().count());
    Ok(Value::Str(text.chars().take(keep).collect::<String>() + &ellipsis))
}

fn truncatewords(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let text = input.render();
    let count = args.arg(0).as_i64().unwrap_or(15).max(1) as usize;
    let ellipsis = match args.arg(1) {
        Value::Nil => "...".to_string(),
        other => other.render(),
    };
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= count {
        return Ok(Value::Str(text));
    }
    Ok(Value::Str(words[..count].join(" ") + &ellipsis))
}

fn split(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let text = input.render();
    let separator = args.text(0);
    if text.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(Value::Array(if separator.is_empty() {
        text.chars().map(Value::string).collect()
    } else {
        text.split(separator.as_str()).map(Value::string).collect()
    }))
}

/// Start index into `len` items; negative counts from the end.
fn slice_start(start: i64, len: usize) -> usize {
    if start < 0 {
        (len as i64 + start).max(0) as usize
    } else {
        (start as usize).min(len)
    }
}

fn slice(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let start = args.arg(0).as_i64().unwrap_or(0);
    let length = args.arg(1).as_i64().unwrap_or(1).max(0) as usize;
    Ok(match input {
        Value::Array(items) => {
            let from = slice_start(start, items.len());
            Value::Array(items.into_iter().skip(from).take(length).collect())
        }
        other => {
            let chars: Vec<char> = other.render().chars().collect();
            let from = slice_start(start, chars.len());
            Value::Str(chars.iter().skip(from).take(length).collect())
        }
    })
}

fn size(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(match &input {
        Value::Nil => Value::Int(0),
        Value::Drop(_) => Value::Int(input.iter_items().len() as i64),
        _ => input.get("size"),
    })
}

fn join(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let separator = match args.arg(0) {
        Value::Nil => " ".to_string(),
        other => other.render(),
    };
    Ok(Value::Str(
        input
            .iter_items()
            .iter()
            .map(Value::render)
            .collect::<Vec<_>>()
            .join(&separator),
    ))
}

fn reverse(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let mut items = input.iter_items();
    items.reverse();
    Ok(Value::Array(items))
}

/// Sort key: the item itself or one of its properties
fn key_of(item: &Value, property: &Value) -> Value {
    match property {
        Value::Nil => item.clone(),
        property => item.get(&property.render()),
    }
}

fn sort(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let property = args.arg(0);
    let mut items = input.iter_items();
    items.sort_by(|a, b| {
        let (a, b) = (key_of(a, &property), key_of(b, &property));
        match (a.is_nil(), b.is_nil()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => a.compare(&b).unwrap_or(Ordering::Equal),
        }
    });
    Ok(Value::Array(items))
}

fn sort_natural(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let property = args.arg(0);
    let mut items = input.iter_items();
    items.sort_by_cached_key(|item| key_of(item, &property).render().to_lowercase());
    Ok(Value::Array(items))
}

fn uniq(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let mut unique: Vec<Value> = Vec::new();
    for item in input.iter_items() {
        if !unique.iter().any(|seen| seen.loose_eq(&item)) {
            unique.push(item);
        }
    }
    Ok(Value::Array(unique))
}

fn compact(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Array(
        input.iter_items().into_iter().filter(|v| !v.is_nil()).collect(),
    ))
}

fn map(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let property = args.text(0);
    Ok(Value::Array(
        input.iter_items().iter().map(|item| item.get(&property)).collect(),
    ))
}

/// Items whose property equals the value, or is truthy when no value is given
fn where_filter(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let property = args.text(0);
    let expected = args.positional.get(1);
    Ok(Value::Array(
        input
            .iter_items()
            .into_iter()
            .filter(|item| {
                let actual = item.get(&property);
                match expected {
                    Some(expected) => actual.loose_eq(expected),
                    None => actual.is_truthy(),
                }
            })
            .collect(),
    ))
}

fn concat(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let mut items = input.iter_items();
    items.extend(args.arg(0).iter_items());
    Ok(Value::Array(items))
}

fn sum(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let property = args.arg(0);
    let mut total = Number::Int(0);
    for item in input.iter_items() {
        if let Some(n) = key_of(&item, &property).as_number() {
            total = add(total, n);
        }
    }
    Ok(total.into())
}

fn number(value: &Value) -> Number {
    value.as_number().unwrap_or(Number::Int(0))
}

fn add(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_add(b)
            .map(Number::Int)
            .unwrap_or(Number::Float(a as f64 + b as f64)),
        (a, b) => Number::Float(a.to_f64() + b.to_f64()),
    }
}

fn plus(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(add(number(&input), number(&args.arg(0))).into())
}

fn minus(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let negated = match number(&args.arg(0)) {
        Number::Int(n) => n.checked_neg().map(Number::Int).unwrap_or(Number::Float(-(n as f64))),
        Number::Float(f) => Number::Float(-f),
    };
    Ok(add(number(&input), negated).into())
}

fn times(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(match (number(&input), number(&args.arg(0))) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_mul(b)
            .map(Value::Int)
            .unwrap_or(Value::Float(a as f64 * b as f64)),
        (a, b) => Value::Float(a.to_f64() * b.to_f64()),
    })
}

/// Floor division, always an integer result. A nil divisor yields nil.
fn divided_by(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let divisor = args.arg(0);
    if divisor.is_nil() {
        return Ok(Value::Nil);
    }
    let divisor = number(&divisor);
    if divisor.to_f64() == 0.0 {
        return Err(EvalError::division_by_zero("divided_by"));
    }
    let floor_f64 = |a: Number, b: Number| Value::Int((a.to_f64() / b.to_f64()).floor() as i64);
    Ok(match (number(&input), divisor) {
        (Number::Int(a), Number::Int(b)) => match a.checked_div(b) {
            Some(q) if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) => Value::Int(q - 1),
            Some(q) => Value::Int(q),
            None => floor_f64(Number::Int(a), Number::Int(b)),
        },
        (a, b) => floor_f64(a, b),
    })
}

fn modulo(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let divisor = args.arg(0);
    if divisor.is_nil() {
        return Ok(Value::Nil);
    }
    let divisor = number(&divisor);
    if divisor.to_f64() == 0.0 {
        return Err(EvalError::division_by_zero("modulo"));
    }
    Ok(match (number(&input), divisor) {
        (Number::Int(a), Number::Int(b)) => Value::Int(a.wrapping_rem(b)),
        (a, b) => Value::Float(a.to_f64() % b.to_f64()),
    })
}

fn abs(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(match number(&input) {
        Number::Int(n) => Value::Int(n.saturating_abs()),
        Number::Float(f) => Value::Float(f.abs()),
    })
}

fn round_to_int(input: &Value, op: fn(f64) -> f64) -> Value {
    Value::Int(op(number(input).to_f64()) as i64)
}

fn round(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let digits = args.arg(0).as_i64().unwrap_or(0).clamp(0, 15) as i32;
    let value = number(&input).to_f64();
    if digits == 0 {
        return Ok(Value::Int(value.round() as i64));
    }
    let factor = 10f64.powi(digits);
    Ok(Value::Float((value * factor).round() / factor))
}

fn at_least(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let (value, bound) = (number(&input), number(&args.arg(0)));
    Ok(if value.to_f64() < bound.to_f64() { bound } else { value }.into())
}

fn at_most(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let (value, bound) = (number(&input), number(&args.arg(0)));
    Ok(if value.to_f64() > bound.to_f64() { bound } else { value }.into())
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::*;
    use crate::filters::{apply, FilterArgs};
    use crate::error::EvalError;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_string_filters() {
        assert_eq!(run_text("capitalize", "hello world", vec![]), "Hello world");
        assert_eq!(run_text("strip_html", "<p>Hi <b>there</b></p>", vec![]), "Hi there");
        assert_eq!(
            run_text("replace_last", "a-b-c", vec![Value::string("-"), Value::string("+")]),
            "a-b+c"
        );
        assert_eq!(run_text("escape_once", "&lt;b&gt; & <i>", vec![]), "&lt;b&gt; &amp; &lt;i&gt;");
        assert_eq!(run_text("url_encode", "a b&c", vec![]), "a+b%26c");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(
            run_text("truncate", "Ground control to Major Tom.", vec![Value::Int(20)]),
            "Ground control to..."
        );
        assert_eq!(run_text("truncate", "short", vec![Value::Int(20)]), "short");
        assert_eq!(
            run_text("truncatewords", "one two three four", vec![Value::Int(2)]),
            "one two..."
        );
    }

    #[test]
    fn test_split_join_slice() {
        let parts = run("split", Value::string("a,b,c"), vec![Value::string(",")]);
        assert_eq!(parts, Value::strings(&["a", "b", "c"]));
        assert_eq!(run_text("join", parts.clone(), vec![Value::string("-")]), "a-b-c");
        assert_eq!(run_text("slice", "Liquid", vec![Value::Int(-3), Value::Int(2)]), "ui");
    }

    #[test]
    fn test_array_filters() {
        let products = Value::from(json!([
            {"title": "B", "price": 20, "available": true},
            {"title": "a", "price": 10, "available": false},
            {"title": "C", "price": 30, "available": true}
        ]));
        let titles = run("map", run("sort", products.clone(), vec![Value::string("price")]), vec![Value::string("title")]);
        assert_eq!(titles, Value::strings(&["a", "B", "C"]));

        let natural = run("map", run("sort_natural", products.clone(), vec![Value::string("title")]), vec![Value::string("title")]);
        assert_eq!(natural, Value::strings(&["a", "B", "C"]));

        let available = run("where", products.clone(), vec![Value::string("available")]);
        assert_eq!(available.get("size"), Value::Int(2));
        let cheap = run("where", products.clone(), vec![Value::string("price"), Value::Int(10)]);
        assert_eq!(cheap.get("first").get("title"), Value::string("a"));

        assert_eq!(run("sum", products, vec![Value::string("price")]), Value::Int(60));
        assert_eq!(
            run("uniq", Value::from(json!([1, 2, 1, 3])), vec![]),
            Value::from(json!([1, 2, 3]))
        );
        assert_eq!(
            run("compact", Value::from(json!([1, null, 2])), vec![]),
            Value::from(json!([1, 2]))
        );
    }

    #[test]
    fn test_math_filters() {
        assert_eq!(run("plus", Value::Int(4), vec![Value::Int(2)]), Value::Int(6));
        assert_eq!(run("minus", Value::string("10"), vec![Value::Int(3)]), Value::Int(7));
        assert_eq!(run("times", Value::Int(3), vec![Value::Float(1.5)]), Value::Float(4.5));
        assert_eq!(run("divided_by", Value::Int(7), vec![Value::Int(2)]), Value::Int(3));
        assert_eq!(run("divided_by", Value::Int(-7), vec![Value::Int(2)]), Value::Int(-4));
        assert_eq!(run("modulo", Value::Int(7), vec![Value::Int(3)]), Value::Int(1));
        assert_eq!(run("round", Value::Float(2.567), vec![Value::Int(2)]), Value::Float(2.57));
        assert_eq!(run("ceil", Value::Float(1.2), vec![]), Value::Int(2));
        assert_eq!(run("at_most", Value::Int(5), vec![Value::Int(3)]), Value::Int(3));
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let err = apply("divided_by", Value::Int(1), &FilterArgs::new(vec![Value::Int(0)]), &ctx())
            .unwrap_err();
        assert_eq!(err, EvalError::division_by_zero("divided_by"));
    }

    #[test]
    fn test_nil_divisor_yields_nil() {
        assert_eq!(run("divided_by", Value::Int(10), vec![Value::Nil]), Value::Nil);
        assert_eq!(run("modulo", Value::Int(10), vec![]), Value::Nil);
    }

    #[test]
    fn test_division_at_integer_limits() {
        assert_eq!(
            run("divided_by", Value::Int(i64::MIN), vec![Value::Int(-1)]),
            Value::Int(i64::MAX)
        );
        assert_eq!(run("modulo", Value::Int(i64::MIN), vec![Value::Int(-1)]), Value::Int(0));
    }

    #[test]
    fn test_nil_input_is_safe() {
        assert_eq!(run_text("upcase", Value::Nil, vec![]), "");
        assert_eq!(run("size", Value::Nil, vec![]), Value::Int(0));
        assert_eq!(run("first", Value::Nil, vec![]), Value::Nil);
        assert_eq!(run("split", Value::Nil, vec![Value::string(",")]), Value::Array(vec![]));
    }
}
