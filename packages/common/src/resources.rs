use crate::records::{ArticleRecord, CollectionRecord, ProductRecord, ResourceRecord, ShopRecord};
use crate::result::CommonResult;
use crate::schema::ParsedSchema;
use crate::settings::SettingsState;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Source of store records looked up by handle.
pub trait ResourceFetcher {
    fn product(&self, handle: &str) -> CommonResult<Option<ProductRecord>>;

    fn collection(&self, handle: &str) -> CommonResult<Option<CollectionRecord>>;

    fn article(&self, _handle: &str) -> CommonResult<Option<ArticleRecord>> {
        Ok(None)
    }

    fn shop(&self) -> CommonResult<Option<ShopRecord>> {
        Ok(None)
    }
}

/// In-memory fetcher over a fixed set of records.
#[derive(Debug, Default, Clone)]
pub struct StaticResources {
    pub products: HashMap<String, ProductRecord>,
    pub collections: HashMap<String, CollectionRecord>,
    pub articles: HashMap<String, ArticleRecord>,
    pub shop: Option<ShopRecord>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: ProductRecord) {
        self.products.insert(product.handle.clone(), product);
    }

    pub fn add_collection(&mut self, collection: CollectionRecord) {
        self.collections.insert(collection.handle.clone(), collection);
    }

    pub fn add_article(&mut self, article: ArticleRecord) {
        self.articles.insert(article.handle.clone(), article);
    }
}

impl ResourceFetcher for StaticResources {
    fn product(&self, handle: &str) -> CommonResult<Option<ProductRecord>> {
        Ok(self.products.get(handle).cloned())
    }

    fn collection(&self, handle: &str) -> CommonResult<Option<CollectionRecord>> {
        Ok(self.collections.get(handle).cloned())
    }

    fn article(&self, handle: &str) -> CommonResult<Option<ArticleRecord>> {
        Ok(self.articles.get(handle).cloned())
    }

    fn shop(&self) -> CommonResult<Option<ShopRecord>> {
        Ok(self.shop.clone())
    }
}

/// Look up the records behind `product`/`collection` settings.
///
/// Settings whose value is not a handle, or whose record cannot be found,
/// are left out; the template then sees the raw scalar. A failing fetch is
/// logged and skipped the same way.
pub fn resolve_resource_settings(
    schema: &ParsedSchema,
    settings: &SettingsState,
    fetcher: &dyn ResourceFetcher,
) -> BTreeMap<String, ResourceRecord> {
    let mut resolved = BTreeMap::new();

    for setting in &schema.settings {
        let Some(handle) = settings.get(&setting.id).and_then(|value| value.as_str()) else {
            continue;
        };
        if handle.is_empty() {
            continue;
        }

        let record = match setting.kind.as_str() {
            "product" => fetcher
                .product(handle)
                .map(|found| found.map(ResourceRecord::Product)),
            "collection" => fetcher
                .collection(handle)
                .map(|found| found.map(ResourceRecord::Collection)),
            _ => continue,
        };

        match record {
            Ok(Some(record)) => {
                resolved.insert(setting.id.clone(), record);
            }
            Ok(None) => debug!(setting = %setting.id, handle, "no record for resource setting"),
            Err(err) => warn!(setting = %setting.id, handle, error = %err, "resource fetch failed"),
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    #[test]
    fn test_resolves_product_and_collection_settings() {
        let schema = parse_schema(
            r#"{% schema %}{"name":"Featured","settings":[
                {"type":"product","id":"featured_product"},
                {"type":"collection","id":"featured_collection"},
                {"type":"text","id":"heading"}
            ]}{% endschema %}"#,
        )
        .unwrap();

        let mut resources = StaticResources::new();
        resources.add_product(ProductRecord {
            handle: "shirt".to_string(),
            title: "Shirt".to_string(),
            ..Default::default()
        });
        resources.add_collection(CollectionRecord {
            handle: "summer".to_string(),
            ..Default::default()
        });

        let mut settings = SettingsState::new();
        settings.insert("featured_product", "shirt");
        settings.insert("featured_collection", "summer");
        settings.insert("heading", "shirt");

        let resolved = resolve_resource_settings(&schema, &settings, &resources);
        assert_eq!(resolved.len(), 2);
        assert!(matches!(
            resolved.get("featured_product"),
            Some(ResourceRecord::Product(p)) if p.title == "Shirt"
        ));
        assert!(matches!(
            resolved.get("featured_collection"),
            Some(ResourceRecord::Collection(_))
        ));
    }

    #[test]
    fn test_missing_handles_are_skipped() {
        let schema = parse_schema(
            r#"{% schema %}{"name":"Featured","settings":[{"type":"product","id":"p"}]}{% endschema %}"#,
        )
        .unwrap();

        let mut settings = SettingsState::new();
        settings.insert("p", "unknown");

        let resolved = resolve_resource_settings(&schema, &settings, &StaticResources::new());
        assert!(resolved.is_empty());
    }
}
