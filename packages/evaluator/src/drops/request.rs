use super::TemplateDrop;
use crate::value::Value;

const PREVIEW_HOST: &str = "preview.myshopify.com";

/// The storefront request. Previews always run in design mode.
#[derive(Debug, Clone)]
pub struct RequestDrop {
    page_type: String,
    path: String,
}

impl RequestDrop {
    pub fn new(page_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            page_type: page_type.into(),
            path: path.into(),
        }
    }
}

impl TemplateDrop for RequestDrop {
    fn type_name(&self) -> &'static str {
        "request"
    }

    fn get(&self, key: &str) -> Option<Value> {
        Some(match key {
            "design_mode" => Value::Bool(true),
            "page_type" => Value::string(&self.page_type),
            "path" => Value::string(&self.path),
            "host" => Value::string(PREVIEW_HOST),
            "origin" => Value::string(format!("https://{}", PREVIEW_HOST)),
            "locale" => Value::object([
                ("iso_code", Value::string("en")),
                ("primary", Value::Bool(true)),
            ]),
            _ => return None,
        })
    }
}

const ROUTES: [(&str, &str); 15] = [
    ("account_url", "/account"),
    ("account_login_url", "/account/login"),
    ("account_logout_url", "/account/logout"),
    ("account_register_url", "/account/register"),
    ("account_addresses_url", "/account/addresses"),
    ("cart_url", "/cart"),
    ("cart_add_url", "/cart/add"),
    ("cart_change_url", "/cart/change"),
    ("cart_clear_url", "/cart/clear"),
    ("cart_update_url", "/cart/update"),
    ("collections_url", "/collections"),
    ("all_products_collection_url", "/collections/all"),
    ("search_url", "/search"),
    ("predictive_search_url", "/search/suggest"),
    ("product_recommendations_url", "/recommendations/products"),
];

/// Storefront URLs under an optional locale prefix
#[derive(Debug, Clone, Default)]
pub struct RoutesDrop {
    base_url: String,
}

impl RoutesDrop {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl TemplateDrop for RoutesDrop {
    fn type_name(&self) -> &'static str {
        "routes"
    }

    fn get(&self, key: &str) -> Option<Value> {
        if key == "root_url" {
            let root = if self.base_url.is_empty() { "/" } else { self.base_url.as_str() };
            return Some(Value::string(root));
        }
        ROUTES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, path)| Value::string(format!("{}{}", self.base_url, path)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThemeDrop;

impl TemplateDrop for ThemeDrop {
    fn type_name(&self) -> &'static str {
        "theme"
    }

    fn get(&self, key: &str) -> Option<Value> {
        Some(match key {
            "id" => Value::Int(1),
            "name" => Value::string("Preview Theme"),
            "role" => Value::string("main"),
            "theme_store_id" => Value::Nil,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_with_prefix() {
        let routes = RoutesDrop::new("/fr");
        assert_eq!(routes.lookup("cart_url"), Value::string("/fr/cart"));
        assert_eq!(routes.lookup("root_url"), Value::string("/fr"));
        assert_eq!(RoutesDrop::default().lookup("root_url"), Value::string("/"));
    }

    #[test]
    fn test_request_is_design_mode() {
        let request = RequestDrop::new("product", "/");
        assert_eq!(request.lookup("design_mode"), Value::Bool(true));
        assert_eq!(request.lookup("page_type"), Value::string("product"));
    }
}
