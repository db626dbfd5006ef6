use super::{empty_array, empty_object, iso_timestamp, Cached, MediaDrop, RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::{ImageRecord, ProductRecord, VariantRecord};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

/// Wraps an optional image, yielding `nil` when it is absent
pub(crate) fn image_value(image: Option<&ImageRecord>) -> Value {
    image
        .map(|image| Value::drop(ImageDrop::new(image.clone())))
        .unwrap_or_default()
}

pub struct ImageDrop {
    image: ImageRecord,
    raw: RawFields,
}

impl ImageDrop {
    pub fn new(image: ImageRecord) -> Self {
        Self {
            image,
            raw: RawFields::default(),
        }
    }
}

impl TemplateDrop for ImageDrop {
    fn type_name(&self) -> &'static str {
        "image"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let image = &self.image;
        Some(match key {
            "src" | "url" => Value::string(&image.src),
            "alt" => Value::string(&image.alt),
            "width" => Value::Int(image.width.into()),
            "height" => Value::Int(image.height.into()),
            "aspect_ratio" => {
                if image.height == 0 {
                    Value::Float(1.0)
                } else {
                    Value::Float(f64::from(image.width) / f64::from(image.height))
                }
            }
            "media_type" => Value::string("image"),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.image, key)
    }

    fn render(&self) -> String {
        self.image.src.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.image)
    }
}

pub struct VariantDrop {
    variant: VariantRecord,
    raw: RawFields,
}

impl VariantDrop {
    pub fn new(variant: VariantRecord) -> Self {
        Self {
            variant,
            raw: RawFields::default(),
        }
    }

    fn options(&self) -> Vec<Value> {
        [&self.variant.option1, &self.variant.option2, &self.variant.option3]
            .into_iter()
            .flatten()
            .map(|option| Value::string(option.as_str()))
            .collect()
    }
}

impl TemplateDrop for VariantDrop {
    fn type_name(&self) -> &'static str {
        "variant"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let variant = &self.variant;
        Some(match key {
            "id" => Value::Int(variant.id),
            "title" | "name" => Value::string(&variant.title),
            "price" => Value::Int(variant.price),
            "compare_at_price" => variant.compare_at_price.into(),
            "available" => Value::Bool(variant.available),
            "inventory_quantity" => Value::Int(variant.inventory_quantity),
            "sku" => Value::string(&variant.sku),
            "option1" => variant.option1.clone().into(),
            "option2" => variant.option2.clone().into(),
            "option3" => variant.option3.clone().into(),
            "options" => Value::Array(self.options()),
            "featured_image" | "image" => image_value(variant.featured_image.as_ref()),
            "barcode" => Value::string(""),
            "weight" => Value::Int(0),
            "requires_shipping" | "taxable" => Value::Bool(true),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.variant, key)
    }

    fn render(&self) -> String {
        self.variant.title.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.variant)
    }
}

pub struct ProductDrop {
    product: Arc<ProductRecord>,
    now: DateTime<Utc>,
    variants: Cached,
    images: Cached,
    media: Cached,
    raw: RawFields,
}

impl ProductDrop {
    pub fn new(product: impl Into<Arc<ProductRecord>>, now: DateTime<Utc>) -> Self {
        Self {
            product: product.into(),
            now,
            variants: Cached::default(),
            images: Cached::default(),
            media: Cached::default(),
            raw: RawFields::default(),
        }
    }

    fn variants(&self) -> Value {
        self.variants.get_or_init(|| {
            self.product
                .variants
                .iter()
                .map(|variant| Value::drop(VariantDrop::new(variant.clone())))
                .collect()
        })
    }

    fn images(&self) -> Value {
        self.images.get_or_init(|| {
            self.product
                .images
                .iter()
                .map(|image| Value::drop(ImageDrop::new(image.clone())))
                .collect()
        })
    }

    fn media(&self) -> Value {
        self.media.get_or_init(|| {
            self.product
                .images
                .iter()
                .enumerate()
                .map(|(idx, image)| Value::drop(MediaDrop::from_image(image, idx + 1)))
                .collect()
        })
    }

    /// First available variant, else the first variant
    fn selected_variant(&self) -> Value {
        let variants = &self.product.variants;
        variants
            .iter()
            .find(|variant| variant.available)
            .or_else(|| variants.first())
            .map(|variant| Value::drop(VariantDrop::new(variant.clone())))
            .unwrap_or_default()
    }

    fn first_available_variant(&self) -> Value {
        self.product
            .variants
            .iter()
            .find(|variant| variant.available)
            .map(|variant| Value::drop(VariantDrop::new(variant.clone())))
            .unwrap_or_default()
    }

    /// Option names paired with the distinct values variants use, in
    /// first-seen order.
    fn options_with_values(&self) -> Value {
        let product = &self.product;
        let entries = product
            .options
            .iter()
            .take(3)
            .enumerate()
            .map(|(position, name)| {
                let mut values: Vec<&str> = Vec::new();
                for variant in &product.variants {
                    let option = match position {
                        0 => &variant.option1,
                        1 => &variant.option2,
                        _ => &variant.option3,
                    };
                    if let Some(value) = option.as_deref() {
                        if !values.contains(&value) {
                            values.push(value);
                        }
                    }
                }
                Value::object([
                    ("name", Value::string(name.as_str())),
                    ("position", Value::Int(position as i64 + 1)),
                    ("values", Value::strings(&values)),
                ])
            })
            .collect();
        Value::Array(entries)
    }

    fn on_sale(&self) -> bool {
        self.product
            .compare_at_price
            .is_some_and(|compare| compare > self.product.price)
    }
}

impl TemplateDrop for ProductDrop {
    fn type_name(&self) -> &'static str {
        "product"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let product = &self.product;
        Some(match key {
            "id" => Value::Int(product.id),
            "title" => Value::string(&product.title),
            "handle" => Value::string(&product.handle),
            "description" | "content" => Value::string(&product.description),
            "vendor" => Value::string(&product.vendor),
            "type" => Value::string(&product.product_type),
            "url" => Value::string(product.storefront_url()),
            "price" => Value::Int(product.price),
            "price_min" => Value::Int(product.price_min),
            "price_max" => Value::Int(product.price_max),
            "compare_at_price" | "compare_at_price_min" | "compare_at_price_max" => {
                product.compare_at_price.into()
            }
            "available" => Value::Bool(product.available),
            "inventory_quantity" => Value::Int(product.inventory_quantity),
            "featured_image" | "featured_media" => image_value(product.featured_image.as_ref()),
            "images" => self.images(),
            "first_available_image" => image_value(product.images.first()),
            "media" => self.media(),
            "variants" => self.variants(),
            "selected_variant" | "selected_or_first_available_variant" => self.selected_variant(),
            "first_available_variant" => self.first_available_variant(),
            "has_only_default_variant" => Value::Bool(
                product.variants.len() == 1 && product.variants[0].title == "Default Title",
            ),
            "tags" => Value::strings(&product.tags),
            "options" => Value::strings(&product.options),
            "options_with_values" => self.options_with_values(),
            "on_sale" => Value::Bool(self.on_sale()),
            "price_varies" => Value::Bool(product.price_min != product.price_max),
            // Only a single compare-at price is modelled
            "compare_at_price_varies" => Value::Bool(false),
            "metafields" => empty_object(),
            "gift_card" | "gift_card?" => Value::Bool(false),
            "published_at" | "created_at" => iso_timestamp(self.now),
            "requires_selling_plan" => Value::Bool(false),
            "selling_plan_groups" => empty_array(),
            "quantity_price_breaks_configured" | "quantity_price_breaks_configured?" => {
                Value::Bool(false)
            }
            "template_suffix" => Value::string(""),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(self.product.as_ref(), key)
    }

    fn to_json(&self) -> serde_json::Value {
        let mut json = self.raw.json(self.product.as_ref());
        if let Some(map) = json.as_object_mut() {
            map.insert("url".to_string(), json!(self.product.storefront_url()));
        }
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn shirt() -> ProductRecord {
        ProductRecord {
            id: 1,
            title: "Shirt".to_string(),
            handle: "shirt".to_string(),
            price: 2000,
            price_min: 2000,
            price_max: 2500,
            compare_at_price: Some(3000),
            options: vec!["Size".to_string(), "Color".to_string()],
            variants: vec![
                VariantRecord {
                    id: 11,
                    title: "S / Red".to_string(),
                    available: false,
                    option1: Some("S".to_string()),
                    option2: Some("Red".to_string()),
                    ..Default::default()
                },
                VariantRecord {
                    id: 12,
                    title: "M / Red".to_string(),
                    available: true,
                    option1: Some("M".to_string()),
                    option2: Some("Red".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_null_featured_image_is_nil() {
        let drop = ProductDrop::new(shirt(), now());
        assert_eq!(drop.lookup("featured_image"), Value::Nil);
        assert_eq!(drop.lookup("featured_image").get("src"), Value::Nil);
    }

    #[test]
    fn test_selected_variant_prefers_available() {
        let drop = ProductDrop::new(shirt(), now());
        assert_eq!(drop.lookup("selected_variant").get("id"), Value::Int(12));
        assert_eq!(drop.lookup("first_available_variant").get("id"), Value::Int(12));
    }

    #[test]
    fn test_options_with_values_are_distinct() {
        let drop = ProductDrop::new(shirt(), now());
        let options = drop.lookup("options_with_values");
        let color = options.index(&Value::Int(1));
        assert_eq!(color.get("name"), Value::string("Color"));
        assert_eq!(color.get("values").get("size"), Value::Int(1));
    }

    #[test]
    fn test_pricing_flags() {
        let drop = ProductDrop::new(shirt(), now());
        assert_eq!(drop.lookup("on_sale"), Value::Bool(true));
        assert_eq!(drop.lookup("price_varies"), Value::Bool(true));
        assert_eq!(drop.lookup("compare_at_price_varies"), Value::Bool(false));
    }

    #[test]
    fn test_unknown_key_falls_back_to_record() {
        let mut record = shirt();
        record
            .extra
            .insert("material".to_string(), serde_json::json!("cotton"));
        let drop = ProductDrop::new(record, now());
        assert_eq!(drop.lookup("material"), Value::string("cotton"));
        assert_eq!(drop.lookup("nonexistent"), Value::Nil);
    }

    #[test]
    fn test_timestamps_use_render_clock() {
        let drop = ProductDrop::new(shirt(), now());
        assert_eq!(
            drop.lookup("published_at"),
            Value::string("2024-01-15T10:30:00.000Z")
        );
    }

    #[test]
    fn test_variants_are_cached() {
        let drop = ProductDrop::new(shirt(), now());
        let (Value::Array(first), Value::Array(second)) = (drop.lookup("variants"), drop.lookup("variants")) else {
            panic!("variants should be an array");
        };
        assert!(first[0].loose_eq(&second[0]));
    }
}
