use super::product::image_value;
use super::{empty_array, empty_object, Cached, RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::{CartItemRecord, CartRecord};

pub struct CartItemDrop {
    item: CartItemRecord,
    raw: RawFields,
}

impl CartItemDrop {
    pub fn new(item: CartItemRecord) -> Self {
        Self {
            item,
            raw: RawFields::default(),
        }
    }
}

impl TemplateDrop for CartItemDrop {
    fn type_name(&self) -> &'static str {
        "line_item"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let item = &self.item;
        Some(match key {
            "id" => Value::Int(item.id),
            "title" => Value::string(&item.title),
            "quantity" => Value::Int(item.quantity),
            "price" | "original_price" | "final_price" => Value::Int(item.price),
            "line_price" | "original_line_price" | "final_line_price" => Value::Int(item.line_price),
            "url" => Value::string(&item.url),
            "image" => image_value(item.image.as_ref()),
            "product" => Value::object([
                ("title", Value::string(&item.title)),
                ("url", Value::string(&item.url)),
            ]),
            "variant" => Value::object([("title", Value::string("Default"))]),
            "discounts" => empty_array(),
            "properties" => empty_object(),
            "selling_plan_allocation" => Value::Nil,
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.item, key)
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.item)
    }
}

pub struct CartDrop {
    cart: CartRecord,
    items: Cached,
    raw: RawFields,
}

impl CartDrop {
    pub fn new(cart: CartRecord) -> Self {
        Self {
            cart,
            items: Cached::default(),
            raw: RawFields::default(),
        }
    }
}

impl TemplateDrop for CartDrop {
    fn type_name(&self) -> &'static str {
        "cart"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let cart = &self.cart;
        Some(match key {
            "item_count" => Value::Int(cart.item_count),
            "total_price" | "original_total_price" | "items_subtotal_price" => {
                Value::Int(cart.total_price)
            }
            "total_discount" | "total_weight" => Value::Int(0),
            "currency" => Value::object([("iso_code", Value::string(&cart.currency))]),
            "items" => self.items.get_or_init(|| {
                cart.items
                    .iter()
                    .map(|item| Value::drop(CartItemDrop::new(item.clone())))
                    .collect()
            }),
            "requires_shipping" => Value::Bool(true),
            "note" => Value::string(""),
            "attributes" => empty_object(),
            "cart_level_discount_applications" | "discount_applications" => empty_array(),
            "empty" | "empty?" => Value::Bool(cart.item_count == 0),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.cart, key)
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart() {
        let drop = CartDrop::new(CartRecord::default());
        assert_eq!(drop.lookup("empty"), Value::Bool(true));
        assert_eq!(drop.lookup("items").get("size"), Value::Int(0));
    }

    #[test]
    fn test_item_without_image() {
        let drop = CartItemDrop::new(CartItemRecord {
            title: "Hat".to_string(),
            ..Default::default()
        });
        assert_eq!(drop.lookup("image"), Value::Nil);
        assert_eq!(drop.lookup("product").get("title"), Value::string("Hat"));
    }

    #[test]
    fn test_currency_iso_code() {
        let drop = CartDrop::new(CartRecord {
            currency: "EUR".to_string(),
            ..Default::default()
        });
        assert_eq!(drop.lookup("currency").get("iso_code"), Value::string("EUR"));
    }
}
