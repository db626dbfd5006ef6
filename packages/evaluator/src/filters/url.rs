//! Storefront URL and image URL filters.

use super::{FilterArgs, Registry};
use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::value::Value;

/// Stand-in URL for image filters given no image
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300";

pub(super) fn register(filters: &mut Registry) {
    filters.insert("img_url", image_url);
    filters.insert("image_url", image_url);
    filters.insert("asset_url", |v, _, _| Ok(Value::Str(format!("/assets/{}", v.render()))));
    filters.insert("file_url", |v, _, _| Ok(Value::Str(format!("/files/{}", v.render()))));
    filters.insert("img_tag", img_tag);
    filters.insert("link_to", link_to);
    filters.insert("product_url", product_url);
    filters.insert("collection_url", collection_url);
    filters.insert("url_for_type", |v, _, _| {
        Ok(Value::Str(format!(
            "/collections/types?q={}",
            urlencoding::encode(&v.render())
        )))
    });
    filters.insert("url_for_vendor", |v, _, _| {
        Ok(Value::Str(format!(
            "/collections/vendors?q={}",
            urlencoding::encode(&v.render())
        )))
    });
}

/// URL of an image value: strings pass through, objects answer `src`.
fn image_url(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let url = match &input {
        Value::Nil | Value::Bool(false) => String::new(),
        Value::Str(s) => s.clone(),
        other => other.get("src").render(),
    };
    Ok(Value::Str(if url.is_empty() {
        PLACEHOLDER_IMAGE_URL.to_string()
    } else {
        url
    }))
}

fn img_tag(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(format!(
        r#"<img src="{}" alt="{}" />"#,
        input.render(),
        args.text(0)
    )))
}

/// The input is the URL and the argument the link text
fn link_to(input: Value, args: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(format!(
        r#"<a href="{}">{}</a>"#,
        input.render(),
        args.text(0)
    )))
}

fn resource_url(input: &Value, prefix: &str, fallback: &str) -> String {
    let url = input.get("url").render();
    if !url.is_empty() {
        return url;
    }
    let handle = input.get("handle").render();
    let handle = if handle.is_empty() { fallback } else { handle.as_str() };
    format!("/{}/{}", prefix, handle)
}

fn product_url(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(resource_url(&input, "products", "product")))
}

fn collection_url(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(Value::Str(resource_url(&input, "collections", "collection")))
}

#[cfg(test)]
mod tests {
    use super::PLACEHOLDER_IMAGE_URL;
    use crate::filters::test_support::run_text;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_image_url_variants() {
        assert_eq!(run_text("img_url", Value::Nil, vec![]), PLACEHOLDER_IMAGE_URL);
        assert_eq!(run_text("image_url", "/a.png", vec![]), "/a.png");
        assert_eq!(
            run_text("img_url", Value::from(json!({"src": "/b.png"})), vec![Value::string("300x")]),
            "/b.png"
        );
    }

    #[test]
    fn test_link_to_and_img_tag() {
        assert_eq!(
            run_text("link_to", "/cart", vec![Value::string("Cart")]),
            r#"<a href="/cart">Cart</a>"#
        );
        assert_eq!(run_text("img_tag", "/x.png", vec![]), r#"<img src="/x.png" alt="" />"#);
    }

    #[test]
    fn test_resource_urls() {
        assert_eq!(
            run_text("product_url", Value::from(json!({"handle": "shirt"})), vec![]),
            "/products/shirt"
        );
        assert_eq!(run_text("product_url", Value::Nil, vec![]), "/products/product");
        assert_eq!(
            run_text("collection_url", Value::from(json!({"url": "/collections/all"})), vec![]),
            "/collections/all"
        );
        assert_eq!(
            run_text("url_for_vendor", "Acme & Co", vec![]),
            "/collections/vendors?q=Acme%20%26%20Co"
        );
    }

    #[test]
    fn test_asset_url() {
        assert_eq!(run_text("asset_url", "theme.css", vec![]), "/assets/theme.css");
        assert_eq!(run_text("file_url", "guide.pdf", vec![]), "/files/guide.pdf");
    }
}
