//! Read-only template views over store records.
//!
//! Every drop answers property access in two tiers: its typed accessor
//! table first, then a raw lookup into the wrapped record's serialized
//! fields. Neither tier fails; an unknown name is `nil`.
//!
//! Derived collections (a product's variants, a collection's products) are
//! built on first access and cached in the drop. Drops are created per render
//! call, so a cache never outlives the data it was built from.

mod article;
mod cart;
mod collection;
mod customer;
mod forloop;
mod media;
mod paginate;
mod product;
mod request;
mod section;
mod shop;

pub use article::ArticleDrop;
pub use cart::{CartDrop, CartItemDrop};
pub use collection::{CollectionDrop, CollectionsDrop};
pub use customer::CustomerDrop;
pub use forloop::{ForloopDrop, TablerowloopDrop};
pub use media::MediaDrop;
pub use paginate::PaginateDrop;
pub use product::{ImageDrop, ProductDrop, VariantDrop};
pub use request::{RequestDrop, RoutesDrop, ThemeDrop};
pub use section::{BlockDrop, SectionDrop, SettingsDrop};
pub use shop::ShopDrop;

use crate::value::Value;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Map;
use std::sync::OnceLock;

/// A template-facing object with a fixed property surface
pub trait TemplateDrop: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Typed accessor table
    fn get(&self, key: &str) -> Option<Value>;

    /// Raw-field lookup for names the accessor table does not know
    fn fallback(&self, _key: &str) -> Option<Value> {
        None
    }

    fn lookup(&self, key: &str) -> Value {
        self.get(key)
            .or_else(|| self.fallback(key))
            .unwrap_or_default()
    }

    fn is_truthy(&self) -> bool {
        true
    }

    /// Text written when the drop itself is output
    fn render(&self) -> String {
        String::new()
    }

    /// Items when the drop is iterated with `for`
    fn items(&self) -> Option<Vec<Value>> {
        None
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(Map::new())
    }
}

/// Serialized fields of a wrapped record, computed once.
#[derive(Debug, Default)]
pub(crate) struct RawFields(OnceLock<Map<String, serde_json::Value>>);

impl RawFields {
    fn fields<T: Serialize>(&self, record: &T) -> &Map<String, serde_json::Value> {
        self.0.get_or_init(|| match serde_json::to_value(record) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Map::new(),
        })
    }

    pub(crate) fn get<T: Serialize>(&self, record: &T, key: &str) -> Option<Value> {
        self.fields(record).get(key).map(Value::from)
    }

    pub(crate) fn json<T: Serialize>(&self, record: &T) -> serde_json::Value {
        serde_json::Value::Object(self.fields(record).clone())
    }
}

/// Lazily built list of child values.
#[derive(Debug, Default)]
pub(crate) struct Cached(OnceLock<Vec<Value>>);

impl Cached {
    pub(crate) fn get_or_init(&self, build: impl FnOnce() -> Vec<Value>) -> Value {
        Value::Array(self.0.get_or_init(build).clone())
    }
}

/// Timestamp in the `2024-01-01T00:00:00.000Z` form
pub(crate) fn iso_timestamp(at: DateTime<Utc>) -> Value {
    Value::string(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub(crate) fn empty_object() -> Value {
    Value::Object(Default::default())
}

pub(crate) fn empty_array() -> Value {
    Value::Array(Vec::new())
}
