//! Named mock data presets for previews without a store connection.

use blocksmith_common::{
    ArticleRecord, CartItemRecord, CartRecord, CollectionRecord, CommonResult, CustomerRecord,
    ImageRecord, ProductRecord, ResourceFetcher, ShopRecord, VariantRecord,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

const PRODUCT_IMAGE: &str =
    "https://cdn.shopify.com/s/files/1/0533/2089/files/placeholder-images-product-1_large.png";
const COLLECTION_IMAGE: &str =
    "https://cdn.shopify.com/s/files/1/0533/2089/files/placeholder-images-collection-1_large.png";

/// Every preset id, in display order
pub const PRESET_IDS: [&str; 13] = [
    "product-standard",
    "product-low-stock",
    "product-sold-out",
    "product-long-title",
    "product-no-compare",
    "collection-standard",
    "collection-large",
    "collection-empty",
    "collection-no-image",
    "cart-standard",
    "cart-empty",
    "cart-large",
    "shop-default",
];

/// Global records a preview renders against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockData {
    pub product: Option<ProductRecord>,
    /// Products picked for the preview; they also fill the collection
    pub products: Vec<ProductRecord>,
    pub collection: Option<CollectionRecord>,
    pub article: Option<ArticleRecord>,
    pub shop: Option<ShopRecord>,
    pub cart: Option<CartRecord>,
    pub customer: Option<CustomerRecord>,
}

impl MockData {
    /// Data for a named preset, `None` for an unknown id.
    pub fn preset(id: &str) -> Option<Self> {
        let data = match id {
            "product-standard" => Self::with_product(base_product()),
            "product-low-stock" => {
                let mut product = base_product();
                product.inventory_quantity = 3;
                for variant in &mut product.variants {
                    variant.inventory_quantity = if variant.available { 1 } else { 0 };
                }
                Self::with_product(product)
            }
            "product-sold-out" => {
                let mut product = base_product();
                product.available = false;
                product.inventory_quantity = 0;
                for variant in &mut product.variants {
                    variant.available = false;
                    variant.inventory_quantity = 0;
                }
                Self::with_product(product)
            }
            "product-long-title" => {
                let mut product = base_product();
                product.title = "Extra Premium Deluxe Cotton T-Shirt with Extended Features and Special Edition Materials".to_string();
                product.description = concat!(
                    "This is an exceptionally detailed product description that goes on for quite a while to test how the section handles long text content. ",
                    "It includes multiple sentences and paragraphs to ensure proper text wrapping and overflow handling in the preview. ",
                    "Perfect for testing edge cases in your layout design."
                )
                .to_string();
                Self::with_product(product)
            }
            "product-no-compare" => {
                let mut product = base_product();
                product.compare_at_price = None;
                Self::with_product(product)
            }
            "collection-standard" => Self::with_collection(base_collection()),
            "collection-large" => {
                let products: Vec<ProductRecord> = (1..=12)
                    .map(|i| {
                        create_product(
                            i,
                            &format!("Product {}", i),
                            &format!("product-{}", i),
                            2999 + (i - 1) * 500,
                        )
                    })
                    .collect();
                Self::with_collection(CollectionRecord {
                    products_count: products.len(),
                    products,
                    ..base_collection()
                })
            }
            "collection-empty" => Self::with_collection(CollectionRecord {
                products: Vec::new(),
                products_count: 0,
                ..base_collection()
            }),
            "collection-no-image" => Self::with_collection(CollectionRecord {
                image: None,
                ..base_collection()
            }),
            "cart-standard" => Self::with_cart(base_cart()),
            "cart-empty" => Self::with_cart(CartRecord {
                item_count: 0,
                total_price: 0,
                items: Vec::new(),
                ..base_cart()
            }),
            "cart-large" => {
                let template = base_cart().items.remove(0);
                let items = (1..=8)
                    .map(|i| CartItemRecord {
                        id: i,
                        title: format!("Product {}", i),
                        ..template.clone()
                    })
                    .collect();
                Self::with_cart(CartRecord {
                    item_count: 8,
                    total_price: 24992,
                    items,
                    ..base_cart()
                })
            }
            "shop-default" => Self {
                shop: Some(ShopRecord::default()),
                ..Self::default()
            },
            _ => return None,
        };
        Some(data)
    }

    /// Preset data, falling back to an empty context for unknown ids
    pub fn preset_or_default(id: &str) -> Self {
        Self::preset(id).unwrap_or_else(|| {
            warn!(preset = id, "unknown mock preset");
            Self::default()
        })
    }

    fn with_product(product: ProductRecord) -> Self {
        Self {
            product: Some(product),
            ..Self::default()
        }
    }

    fn with_collection(collection: CollectionRecord) -> Self {
        Self {
            products: collection.products.clone(),
            collection: Some(collection),
            ..Self::default()
        }
    }

    fn with_cart(cart: CartRecord) -> Self {
        Self {
            cart: Some(cart),
            ..Self::default()
        }
    }

    /// Overlay `other`: fields it sets replace ours.
    pub fn merge(mut self, other: MockData) -> Self {
        if other.product.is_some() {
            self.product = other.product;
        }
        if !other.products.is_empty() {
            self.products = other.products;
        }
        if other.collection.is_some() {
            self.collection = other.collection;
        }
        if other.article.is_some() {
            self.article = other.article;
        }
        if other.shop.is_some() {
            self.shop = other.shop;
        }
        if other.cart.is_some() {
            self.cart = other.cart;
        }
        if other.customer.is_some() {
            self.customer = other.customer;
        }
        self
    }

    /// Overlay custom JSON. Unparseable input is logged and ignored.
    pub fn merge_json(self, custom: &str) -> Self {
        match serde_json::from_str::<MockData>(custom) {
            Ok(other) => self.merge(other),
            Err(err) => {
                warn!(error = %err, "ignoring custom mock data");
                self
            }
        }
    }

    /// Every product reachable from this data
    fn all_products(&self) -> impl Iterator<Item = &ProductRecord> {
        self.product
            .iter()
            .chain(self.products.iter())
            .chain(self.collection.iter().flat_map(|c| c.products.iter()))
    }
}

impl ResourceFetcher for MockData {
    fn product(&self, handle: &str) -> CommonResult<Option<ProductRecord>> {
        Ok(self.all_products().find(|p| p.handle == handle).cloned())
    }

    fn collection(&self, handle: &str) -> CommonResult<Option<CollectionRecord>> {
        Ok(self.collection.as_ref().filter(|c| c.handle == handle).cloned())
    }

    fn article(&self, handle: &str) -> CommonResult<Option<ArticleRecord>> {
        Ok(self.article.as_ref().filter(|a| a.handle == handle).cloned())
    }

    fn shop(&self) -> CommonResult<Option<ShopRecord>> {
        Ok(self.shop.clone())
    }
}

fn image(src: &str, alt: &str, width: u32, height: u32) -> ImageRecord {
    ImageRecord {
        src: src.to_string(),
        alt: alt.to_string(),
        width,
        height,
        ..Default::default()
    }
}

fn variant(id: i64, title: &str, price: i64, available: bool, stock: i64, sku: &str) -> VariantRecord {
    let mut parts = title.split(" / ").map(str::to_string);
    VariantRecord {
        id,
        title: title.to_string(),
        price,
        available,
        inventory_quantity: stock,
        sku: sku.to_string(),
        option1: parts.next(),
        option2: parts.next(),
        option3: parts.next(),
        ..Default::default()
    }
}

/// The standard demo product
pub fn base_product() -> ProductRecord {
    ProductRecord {
        id: 12345678,
        title: "Premium Cotton T-Shirt".to_string(),
        handle: "premium-cotton-t-shirt".to_string(),
        description: "A comfortable, high-quality cotton t-shirt perfect for everyday wear. Made from 100% organic cotton with a classic fit.".to_string(),
        vendor: "Demo Brand".to_string(),
        product_type: "Apparel".to_string(),
        price: 2999,
        price_min: 2999,
        price_max: 3499,
        compare_at_price: Some(3999),
        available: true,
        inventory_quantity: 50,
        featured_image: Some(image(PRODUCT_IMAGE, "Premium Cotton T-Shirt", 600, 600)),
        images: vec![
            image(PRODUCT_IMAGE, "Front view", 600, 600),
            image(PRODUCT_IMAGE, "Back view", 600, 600),
        ],
        tags: vec!["cotton".into(), "summer".into(), "casual".into()],
        options: vec!["Size".into(), "Color".into()],
        variants: vec![
            variant(1, "Small / White", 2999, true, 20, "TSHIRT-S-W"),
            variant(2, "Medium / White", 2999, true, 15, "TSHIRT-M-W"),
            variant(3, "Large / White", 2999, false, 0, "TSHIRT-L-W"),
        ],
        url: "/products/premium-cotton-t-shirt".to_string(),
        ..Default::default()
    }
}

/// A collection member with two size variants
pub fn create_product(id: i64, title: &str, handle: &str, price: i64) -> ProductRecord {
    ProductRecord {
        id,
        title: title.to_string(),
        handle: handle.to_string(),
        description: format!("Description for {}", title),
        vendor: "Demo Brand".to_string(),
        product_type: "Apparel".to_string(),
        price,
        price_min: price,
        price_max: price + 500,
        compare_at_price: Some(price + 1000),
        available: true,
        inventory_quantity: 25,
        featured_image: Some(image(PRODUCT_IMAGE, title, 600, 600)),
        images: vec![image(PRODUCT_IMAGE, title, 600, 600)],
        tags: vec!["collection".into()],
        options: vec!["Size".into()],
        variants: vec![
            variant(id * 10 + 1, "Small", price, true, 10, &format!("{}-S", handle)),
            variant(id * 10 + 2, "Medium", price, true, 10, &format!("{}-M", handle)),
        ],
        url: format!("/products/{}", handle),
        ..Default::default()
    }
}

fn base_collection() -> CollectionRecord {
    let products = vec![
        create_product(1, "Premium Cotton T-Shirt", "premium-cotton-t-shirt", 2999),
        create_product(2, "Linen Shorts", "linen-shorts", 4999),
        create_product(3, "Beach Sandals", "beach-sandals", 2499),
        create_product(4, "Sun Hat", "sun-hat", 1999),
    ];
    CollectionRecord {
        id: 98765432,
        title: "Summer Collection".to_string(),
        handle: "summer-collection".to_string(),
        description: "Our latest summer styles featuring lightweight fabrics and vibrant colors."
            .to_string(),
        image: Some(image(COLLECTION_IMAGE, "Summer Collection", 1200, 600)),
        products_count: products.len(),
        products,
        url: "/collections/summer-collection".to_string(),
        ..Default::default()
    }
}

fn cart_item(id: i64, title: &str, alt: &str, url: &str) -> CartItemRecord {
    CartItemRecord {
        id,
        title: title.to_string(),
        quantity: 1,
        price: 2999,
        line_price: 2999,
        image: Some(image(PRODUCT_IMAGE, alt, 100, 100)),
        url: url.to_string(),
        ..Default::default()
    }
}

fn base_cart() -> CartRecord {
    CartRecord {
        item_count: 2,
        total_price: 5998,
        currency: "USD".to_string(),
        items: vec![
            cart_item(
                1,
                "Premium Cotton T-Shirt - Small / White",
                "T-Shirt",
                "/products/premium-cotton-t-shirt",
            ),
            cart_item(2, "Linen Shorts - Medium", "Shorts", "/products/linen-shorts"),
        ],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_id_resolves() {
        for id in PRESET_IDS {
            assert!(MockData::preset(id).is_some(), "{} should exist", id);
        }
        assert!(MockData::preset("nope").is_none());
    }

    #[test]
    fn test_base_product_variants() {
        let product = base_product();
        assert_eq!(product.variants.len(), 3);
        assert_eq!(product.variants[0].option1.as_deref(), Some("Small"));
        assert_eq!(product.variants[0].option2.as_deref(), Some("White"));
        assert_eq!(product.variants[0].option3, None);
    }

    #[test]
    fn test_sold_out_preset() {
        let data = MockData::preset("product-sold-out").unwrap();
        let product = data.product.unwrap();
        assert!(!product.available);
        assert!(product.variants.iter().all(|v| !v.available && v.inventory_quantity == 0));
    }

    #[test]
    fn test_collection_presets() {
        let standard = MockData::preset("collection-standard").unwrap();
        assert_eq!(standard.collection.as_ref().unwrap().products_count, 4);
        assert_eq!(standard.products.len(), 4);

        let large = MockData::preset("collection-large").unwrap();
        let last = large.products.last().unwrap();
        assert_eq!(last.price, 2999 + 11 * 500);

        let empty = MockData::preset("collection-empty").unwrap();
        assert!(empty.products.is_empty());
    }

    #[test]
    fn test_cart_large() {
        let cart = MockData::preset("cart-large").unwrap().cart.unwrap();
        assert_eq!(cart.items.len(), 8);
        assert_eq!(cart.items[7].title, "Product 8");
        assert_eq!(cart.total_price, 24992);
    }

    #[test]
    fn test_fetcher_finds_collection_products() {
        let data = MockData::preset("collection-standard").unwrap();
        let found = data.product("sun-hat").unwrap().unwrap();
        assert_eq!(found.title, "Sun Hat");
        assert!(data.collection("summer-collection").unwrap().is_some());
        assert!(data.collection("winter").unwrap().is_none());
    }

    #[test]
    fn test_merge_json_overrides_and_ignores_garbage() {
        let data = MockData::preset("product-standard")
            .unwrap()
            .merge_json(r#"{"shop": {"name": "Custom"}}"#)
            .merge_json("{not json");
        assert_eq!(data.shop.unwrap().name, "Custom");
        assert!(data.product.is_some());
    }
}
