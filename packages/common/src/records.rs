//! Normalized store records handed to templates.
//!
//! These are the shapes a resource-fetch service returns and the mock data
//! presets are written in. Money is in integer minor units. Fields a record
//! does not model are kept in `extra` so templates can still reach them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub compare_at_price: Option<i64>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
    #[serde(default)]
    pub featured_image: Option<ImageRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(rename = "type", default)]
    pub product_type: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub price_min: i64,
    #[serde(default)]
    pub price_max: i64,
    #[serde(default)]
    pub compare_at_price: Option<i64>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub featured_image: Option<ImageRecord>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductRecord {
    /// Storefront url, derived from the handle when the record has none.
    pub fn storefront_url(&self) -> String {
        if self.url.is_empty() {
            format!("/products/{}", self.handle)
        } else {
            self.url.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<ImageRecord>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub products_count: usize,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionRecord {
    pub fn storefront_url(&self) -> String {
        if self.url.is_empty() {
            format!("/collections/{}", self.handle)
        } else {
            self.url.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRecord>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_money_format")]
    pub money_format: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_money_format() -> String {
    "${{amount}}".to_string()
}

impl Default for ShopRecord {
    fn default() -> Self {
        Self {
            name: "Demo Store".to_string(),
            email: "hello@demo-store.com".to_string(),
            domain: "demo-store.myshopify.com".to_string(),
            url: "https://demo-store.myshopify.com".to_string(),
            currency: default_currency(),
            money_format: default_money_format(),
            description: "Your one-stop shop for amazing products.".to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartItemRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub line_price: i64,
    #[serde(default)]
    pub image: Option<ImageRecord>,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartRecord {
    #[serde(default)]
    pub item_count: i64,
    #[serde(default)]
    pub total_price: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub items: Vec<CartItemRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub orders_count: i64,
    #[serde(default)]
    pub total_spent: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A record bound to a resource-typed setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceRecord {
    Product(ProductRecord),
    Collection(CollectionRecord),
}

impl ResourceRecord {
    /// Classify a loose JSON record. Variants or a vendor mark a product;
    /// anything else is read as a collection.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        let looks_like_product = value.get("variants").is_some() || value.get("vendor").is_some();
        if looks_like_product {
            Ok(Self::Product(serde_json::from_value(value)?))
        } else {
            Ok(Self::Collection(serde_json::from_value(value)?))
        }
    }
}

impl<'de> Deserialize<'de> for ResourceRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ResourceRecord::from_json(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_keeps_unmodelled_fields() {
        let product: ProductRecord = serde_json::from_value(json!({
            "title": "Shirt",
            "type": "Apparel",
            "material": "cotton"
        }))
        .unwrap();

        assert_eq!(product.title, "Shirt");
        assert_eq!(product.product_type, "Apparel");
        assert_eq!(product.extra.get("material"), Some(&json!("cotton")));
        assert_eq!(product.featured_image, None);
    }

    #[test]
    fn test_resource_record_classification() {
        let product = ResourceRecord::from_json(json!({"title": "Shirt", "vendor": "Acme"})).unwrap();
        assert!(matches!(product, ResourceRecord::Product(_)));

        let collection = ResourceRecord::from_json(json!({"title": "Summer", "products": []})).unwrap();
        assert!(matches!(collection, ResourceRecord::Collection(_)));
    }

    #[test]
    fn test_storefront_url_falls_back_to_handle() {
        let product = ProductRecord {
            handle: "shirt".to_string(),
            ..Default::default()
        };
        assert_eq!(product.storefront_url(), "/products/shirt");
    }
}
