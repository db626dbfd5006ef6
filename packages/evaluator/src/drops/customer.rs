use super::{empty_array, RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::CustomerRecord;

/// The logged-in customer. Without one every accessor returns an empty
/// value and the drop itself is falsy, so `{% if customer %}` works.
pub struct CustomerDrop {
    customer: Option<CustomerRecord>,
    raw: RawFields,
}

impl CustomerDrop {
    pub fn new(customer: Option<CustomerRecord>) -> Self {
        Self {
            customer,
            raw: RawFields::default(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }
}

impl TemplateDrop for CustomerDrop {
    fn type_name(&self) -> &'static str {
        "customer"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let customer = self.customer.as_ref();
        let text = |field: fn(&CustomerRecord) -> &str| {
            Value::string(customer.map(field).unwrap_or_default())
        };
        Some(match key {
            "id" => customer.map(|c| c.id).into(),
            "email" => text(|c| c.email.as_str()),
            "first_name" => text(|c| c.first_name.as_str()),
            "last_name" => text(|c| c.last_name.as_str()),
            "name" => Value::string(
                customer
                    .map(|c| format!("{} {}", c.first_name, c.last_name).trim().to_string())
                    .unwrap_or_default(),
            ),
            "orders_count" => Value::Int(customer.map(|c| c.orders_count).unwrap_or(0)),
            "total_spent" => Value::Int(customer.map(|c| c.total_spent).unwrap_or(0)),
            "phone" => Value::string(""),
            "default_address" => Value::Nil,
            "addresses" | "orders" | "tags" => empty_array(),
            "tax_exempt" | "accepts_marketing" => Value::Bool(false),
            "has_account" => Value::Bool(customer.is_some()),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(self.customer.as_ref()?, key)
    }

    fn is_truthy(&self) -> bool {
        self.customer.is_some()
    }

    fn to_json(&self) -> serde_json::Value {
        match &self.customer {
            Some(customer) => self.raw.json(customer),
            None => serde_json::Value::Null,
        }
    }
}
