use super::{empty_array, empty_object, RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::ShopRecord;

const PAYMENT_TYPES: [&str; 4] = ["visa", "mastercard", "american_express", "paypal"];

const POLICIES: [&str; 5] = [
    "refund_policy",
    "privacy_policy",
    "shipping_policy",
    "terms_of_service",
    "subscription_policy",
];

pub struct ShopDrop {
    shop: ShopRecord,
    raw: RawFields,
}

impl ShopDrop {
    pub fn new(shop: ShopRecord) -> Self {
        Self {
            shop,
            raw: RawFields::default(),
        }
    }

    fn secure_url(&self) -> String {
        if self.shop.url.starts_with("https://") {
            self.shop.url.clone()
        } else {
            format!("https://{}", self.shop.url)
        }
    }
}

impl TemplateDrop for ShopDrop {
    fn type_name(&self) -> &'static str {
        "shop"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let shop = &self.shop;
        Some(match key {
            "name" => Value::string(&shop.name),
            "email" => Value::string(&shop.email),
            "domain" | "permanent_domain" => Value::string(&shop.domain),
            "url" => Value::string(&shop.url),
            "secure_url" => Value::string(self.secure_url()),
            "currency" => Value::string(&shop.currency),
            "money_format" => Value::string(&shop.money_format),
            "money_with_currency_format" => {
                Value::string(format!("{} {}", shop.money_format, shop.currency))
            }
            "description" => Value::string(&shop.description),
            "taxes_included" => Value::Bool(false),
            "customer_accounts_enabled" | "customer_accounts_optional" => Value::Bool(true),
            "address" => Value::object(
                ["address1", "address2", "city", "province", "country", "zip"]
                    .map(|field| (field, Value::string(""))),
            ),
            "phone" => Value::string(""),
            "enabled_payment_types" => Value::strings(&PAYMENT_TYPES),
            "locale" => Value::string("en"),
            "brand" => Value::object([
                ("logo", Value::Nil),
                ("colors", empty_object()),
                ("short_description", Value::string(&shop.description)),
            ]),
            "metafields" => empty_object(),
            "policies" | "types" | "vendors" => empty_array(),
            policy if POLICIES.contains(&policy) => Value::Nil,
            "published_locales" => Value::Array(vec![Value::object([
                ("iso_code", Value::string("en")),
                ("primary", Value::Bool(true)),
            ])]),
            "products_count" | "collections_count" => Value::Int(0),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.shop, key)
    }

    fn render(&self) -> String {
        self.shop.name.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.shop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shop() {
        let drop = ShopDrop::new(ShopRecord::default());
        assert_eq!(drop.lookup("name"), Value::string("Demo Store"));
        assert_eq!(
            drop.lookup("money_with_currency_format"),
            Value::string("${{amount}} USD")
        );
        assert_eq!(drop.lookup("refund_policy"), Value::Nil);
        assert_eq!(drop.lookup("enabled_payment_types").get("size"), Value::Int(4));
    }

    #[test]
    fn test_secure_url_adds_scheme() {
        let drop = ShopDrop::new(ShopRecord {
            url: "shop.example".to_string(),
            ..Default::default()
        });
        assert_eq!(drop.lookup("secure_url"), Value::string("https://shop.example"));
    }
}
