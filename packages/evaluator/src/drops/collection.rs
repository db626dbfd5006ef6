use super::product::image_value;
use super::{empty_array, empty_object, iso_timestamp, Cached, ProductDrop, RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::CollectionRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

const SORT_OPTIONS: [(&str, &str); 7] = [
    ("Best Selling", "best-selling"),
    ("Alphabetically, A-Z", "title-ascending"),
    ("Alphabetically, Z-A", "title-descending"),
    ("Price, low to high", "price-ascending"),
    ("Price, high to low", "price-descending"),
    ("Date, old to new", "created-ascending"),
    ("Date, new to old", "created-descending"),
];

const DEFAULT_SORT_BY: &str = "best-selling";

pub struct CollectionDrop {
    collection: Arc<CollectionRecord>,
    now: DateTime<Utc>,
    products: Cached,
    raw: RawFields,
}

impl CollectionDrop {
    pub fn new(collection: impl Into<Arc<CollectionRecord>>, now: DateTime<Utc>) -> Self {
        Self {
            collection: collection.into(),
            now,
            products: Cached::default(),
            raw: RawFields::default(),
        }
    }

    fn products(&self) -> Value {
        self.products.get_or_init(|| {
            self.collection
                .products
                .iter()
                .map(|product| Value::drop(ProductDrop::new(product.clone(), self.now)))
                .collect()
        })
    }

    /// Unique non-empty values across the products, sorted
    fn distinct<'a>(&'a self, field: impl Fn(&'a blocksmith_common::ProductRecord) -> Vec<&'a str>) -> Value {
        let values: BTreeSet<&str> = self
            .collection
            .products
            .iter()
            .flat_map(field)
            .filter(|value| !value.is_empty())
            .collect();
        Value::Array(values.into_iter().map(Value::string).collect())
    }

    fn sort_options() -> Value {
        Value::Array(
            SORT_OPTIONS
                .iter()
                .map(|(name, value)| {
                    Value::object([("name", Value::string(*name)), ("value", Value::string(*value))])
                })
                .collect(),
        )
    }
}

impl TemplateDrop for CollectionDrop {
    fn type_name(&self) -> &'static str {
        "collection"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let collection = &self.collection;
        Some(match key {
            "id" => Value::Int(collection.id),
            "title" => Value::string(&collection.title),
            "handle" => Value::string(&collection.handle),
            "description" => Value::string(&collection.description),
            "url" => Value::string(collection.storefront_url()),
            "products_count" | "all_products_count" => Value::Int(collection.products_count as i64),
            "image" | "featured_image" => image_value(collection.image.as_ref()),
            "products" => self.products(),
            "all_tags" => self.distinct(|product| product.tags.iter().map(String::as_str).collect()),
            "all_types" => self.distinct(|product| vec![product.product_type.as_str()]),
            "all_vendors" => self.distinct(|product| vec![product.vendor.as_str()]),
            "default_sort_by" | "sort_by" => Value::string(DEFAULT_SORT_BY),
            "sort_options" => Self::sort_options(),
            "current_vendor" | "current_type" | "template_suffix" => Value::string(""),
            "filters" => empty_array(),
            "metafields" => empty_object(),
            "published_at" => iso_timestamp(self.now),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(self.collection.as_ref(), key)
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(self.collection.as_ref())
    }
}

/// The `collections` global, indexed by handle
pub struct CollectionsDrop {
    collections: Vec<Arc<CollectionRecord>>,
    now: DateTime<Utc>,
    drops: Cached,
}

impl CollectionsDrop {
    pub fn new(collections: Vec<CollectionRecord>, now: DateTime<Utc>) -> Self {
        Self {
            collections: collections.into_iter().map(Arc::new).collect(),
            now,
            drops: Cached::default(),
        }
    }

    fn all(&self) -> Vec<Value> {
        match self.drops.get_or_init(|| {
            self.collections
                .iter()
                .map(|collection| Value::drop(CollectionDrop::new(Arc::clone(collection), self.now)))
                .collect()
        }) {
            Value::Array(items) => items,
            _ => Vec::new(),
        }
    }
}

impl TemplateDrop for CollectionsDrop {
    fn type_name(&self) -> &'static str {
        "collections"
    }

    fn get(&self, key: &str) -> Option<Value> {
        if key == "size" {
            return Some(Value::Int(self.collections.len() as i64));
        }
        let position = self
            .collections
            .iter()
            .position(|collection| collection.handle == key)?;
        self.all().into_iter().nth(position)
    }

    fn items(&self) -> Option<Vec<Value>> {
        Some(self.all())
    }
}
