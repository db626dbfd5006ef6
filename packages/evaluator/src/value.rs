//! Runtime values seen by templates.

use crate::drops::TemplateDrop;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Drop(Arc<dyn TemplateDrop>),
}

impl Value {
    pub fn drop(drop: impl TemplateDrop + 'static) -> Self {
        Value::Drop(Arc::new(drop))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Build an object from key/value pairs.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn strings<S: AsRef<str>>(items: &[S]) -> Self {
        Value::Array(items.iter().map(|s| Value::string(s.as_ref())).collect())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only `nil` and `false` are falsy; drops may opt out.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil | Value::Bool(false) => false,
            Value::Drop(drop) => drop.is_truthy(),
            _ => true,
        }
    }

    /// Matches the `empty` literal
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Matches the `blank` literal
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Nil | Value::Bool(false) => true,
            Value::Str(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Drop(drop) => !drop.is_truthy(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view; numeric strings parse, everything else is `None`.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Str(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .map(Number::Int)
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(Number::Float))
            }
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().map(|n| match n {
            Number::Int(n) => n,
            Number::Float(f) => f as i64,
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::to_f64)
    }

    /// Property access shared by templates and filters.
    ///
    /// Arrays and strings answer `size`, `first` and `last`; objects answer
    /// `size` unless they hold a key of that name.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Drop(drop) => drop.lookup(key),
            Value::Object(map) => match map.get(key) {
                Some(value) => value.clone(),
                None if key == "size" => Value::Int(map.len() as i64),
                None => Value::Nil,
            },
            Value::Array(items) => match key {
                "size" => Value::Int(items.len() as i64),
                "first" => items.first().cloned().unwrap_or_default(),
                "last" => items.last().cloned().unwrap_or_default(),
                _ => Value::Nil,
            },
            Value::Str(s) => match key {
                "size" => Value::Int(s.chars().count() as i64),
                "first" => s.chars().next().map(|c| Value::string(c)).unwrap_or_default(),
                "last" => s.chars().last().map(|c| Value::string(c)).unwrap_or_default(),
                _ => Value::Nil,
            },
            _ => Value::Nil,
        }
    }

    /// `value[index]`: integer index into arrays (negative counts from the
    /// end), anything else is a key.
    pub fn index(&self, index: &Value) -> Value {
        match (self, index) {
            (Value::Array(items), Value::Int(i)) => {
                let len = items.len() as i64;
                let idx = if *i < 0 { len + i } else { *i };
                if (0..len).contains(&idx) {
                    items[idx as usize].clone()
                } else {
                    Value::Nil
                }
            }
            (_, Value::Str(key)) => self.get(key),
            (_, Value::Int(i)) => self.get(&i.to_string()),
            _ => Value::Nil,
        }
    }

    /// Items a `for` loop walks. Objects iterate as `[key, value]` pairs.
    pub fn iter_items(&self) -> Vec<Value> {
        match self {
            Value::Array(items) => items.clone(),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Value::Array(vec![Value::string(k.clone()), v.clone()]))
                .collect(),
            Value::Drop(drop) => drop.items().unwrap_or_default(),
            Value::Nil => Vec::new(),
            other => vec![other.clone()],
        }
    }

    /// String form written into the output
    pub fn render(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => s.clone(),
            Value::Array(items) => items.iter().map(Value::render).collect(),
            Value::Object(_) => self.to_json().to_string(),
            Value::Drop(drop) => drop.render(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Nil => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Drop(drop) => drop.to_json(),
        }
    }

    /// Liquid equality: numbers compare by value, drops by identity.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.loose_eq(vb))
            }
            (Value::Drop(a), Value::Drop(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering for `<`, `>` and the sort filters. Mixed types do not compare.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ => None,
        }
    }

    /// `contains`: substring, array membership or object key
    pub fn contains(&self, needle: &Value) -> bool {
        match self {
            Value::Str(s) => s.contains(&needle.render()),
            Value::Array(items) => items.iter().any(|item| item.loose_eq(needle)),
            Value::Object(map) => needle.as_str().is_some_and(|key| map.contains_key(key)),
            _ => false,
        }
    }
}

/// Integer or float, the two number shapes math filters produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(n) => Value::Int(n),
            Number::Float(f) => Value::Float(f),
        }
    }
}

/// Whole floats keep one decimal place, as `2.0`.
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or_default(),
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or_default()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(map) => f.debug_map().entries(map).finish(),
            Value::Drop(drop) => write!(f, "Drop({})", drop.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.loose_eq(other)
    }
}
