//! Section render pipeline: schema stripping, CSS extraction, context
//! assembly, then one interpreter pass over the CSS and one over the HTML.

use crate::context::RenderContext;
use crate::drops::{
    ArticleDrop, CartDrop, CollectionDrop, CollectionsDrop, CustomerDrop, ProductDrop,
    RequestDrop, RoutesDrop, SectionDrop, ShopDrop, ThemeDrop,
};
use crate::error::RenderResult;
use crate::mock::MockData;
use crate::renderer::Renderer;
use crate::value::Value;
use blocksmith_common::{
    parse_schema, resolve_resource_settings, strip_schema, BlockInstance, CollectionRecord,
    ResourceRecord, SettingsState,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, instrument};

pub const DEFAULT_SECTION_ID: &str = "preview-section";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub section_id: String,
    /// Clock for every timestamp the render produces
    pub now: DateTime<Utc>,
    pub data: MockData,
}

impl RenderOptions {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            section_id: DEFAULT_SECTION_ID.to_string(),
            now,
            data: MockData::default(),
        }
    }

    pub fn with_data(mut self, data: MockData) -> Self {
        self.data = data;
        self
    }

    pub fn with_section_id(mut self, id: impl Into<String>) -> Self {
        self.section_id = id.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    pub html: String,
    pub css: String,
}

fn style_tag_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\{%-?\s*style\s*-?%\}(.*?)\{%-?\s*endstyle\s*-?%\}").expect("static regex")
    })
}

fn style_element() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("static regex"))
}

/// Pull every match body of `pattern` out of `source`.
fn extract(pattern: &Regex, source: &str) -> (String, String) {
    let bodies: Vec<&str> = pattern
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    let rest = pattern.replace_all(source, "").into_owned();
    (bodies.join("\n"), rest)
}

/// Split a template into its CSS buffer and its HTML body
pub fn extract_css(source: &str) -> (String, String) {
    let (tag_css, html) = extract(style_tag_block(), source);
    let (element_css, html) = extract(style_element(), &html);
    let css = [tag_css, element_css]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (css, html)
}

fn page_type(data: &MockData) -> &'static str {
    if data.product.is_some() {
        "product"
    } else if data.collection.is_some() {
        "collection"
    } else if data.article.is_some() {
        "article"
    } else {
        "index"
    }
}

/// The collection the section sees. Picked products fill it, or stand in
/// for it when no collection was chosen.
fn effective_collection(data: &MockData) -> Option<CollectionRecord> {
    match (&data.collection, data.products.is_empty()) {
        (Some(collection), true) => Some(collection.clone()),
        (Some(collection), false) => Some(CollectionRecord {
            products: data.products.clone(),
            products_count: data.products.len(),
            ..collection.clone()
        }),
        (None, false) => Some(CollectionRecord {
            id: 1,
            title: "Selected Products".to_string(),
            handle: "selected-products".to_string(),
            products: data.products.clone(),
            products_count: data.products.len(),
            url: "/collections/selected-products".to_string(),
            ..Default::default()
        }),
        (None, true) => None,
    }
}

fn merged_settings(
    settings: &SettingsState,
    resources: &BTreeMap<String, ResourceRecord>,
    now: DateTime<Utc>,
) -> BTreeMap<String, Value> {
    let mut merged: BTreeMap<String, Value> = settings
        .iter()
        .map(|(id, value)| (id.clone(), Value::from(value)))
        .collect();
    for (id, record) in resources {
        let drop = match record {
            ResourceRecord::Product(product) => Value::drop(ProductDrop::new(product.clone(), now)),
            ResourceRecord::Collection(collection) => {
                Value::drop(CollectionDrop::new(collection.clone(), now))
            }
        };
        merged.insert(id.clone(), drop);
    }
    merged
}

/// Global objects for one render
pub fn build_globals(
    settings: &SettingsState,
    blocks: &[BlockInstance],
    resources: &BTreeMap<String, ResourceRecord>,
    options: &RenderOptions,
) -> BTreeMap<String, Value> {
    let data = &options.data;
    let now = options.now;
    let mut globals = BTreeMap::new();

    globals.insert(
        "shop".to_string(),
        Value::drop(ShopDrop::new(data.shop.clone().unwrap_or_default())),
    );
    globals.insert(
        "request".to_string(),
        Value::drop(RequestDrop::new(page_type(data), "/")),
    );
    globals.insert("routes".to_string(), Value::drop(RoutesDrop::default()));
    globals.insert("theme".to_string(), Value::drop(ThemeDrop));
    globals.insert(
        "customer".to_string(),
        Value::drop(CustomerDrop::new(data.customer.clone())),
    );

    if let Some(cart) = &data.cart {
        globals.insert("cart".to_string(), Value::drop(CartDrop::new(cart.clone())));
    }
    if let Some(product) = data.product.as_ref().or_else(|| data.products.first()) {
        globals.insert(
            "product".to_string(),
            Value::drop(ProductDrop::new(product.clone(), now)),
        );
    }
    if let Some(collection) = effective_collection(data) {
        globals.insert(
            "collections".to_string(),
            Value::drop(CollectionsDrop::new(vec![collection.clone()], now)),
        );
        globals.insert(
            "collection".to_string(),
            Value::drop(CollectionDrop::new(collection, now)),
        );
    }
    if let Some(article) = &data.article {
        globals.insert(
            "article".to_string(),
            Value::drop(ArticleDrop::new(article.clone(), now)),
        );
    }

    let section = SectionDrop::new(
        options.section_id.clone(),
        merged_settings(settings, resources, now),
        blocks,
    );
    globals.insert("settings".to_string(), section.settings());
    globals.insert("section".to_string(), Value::drop(section));
    globals
}

/// Render a section template.
///
/// Both halves are parsed before anything is rendered, and either failing
/// aborts the call; no partial output is returned.
#[instrument(skip_all, fields(len = source.len(), blocks = blocks.len()))]
pub fn render_section(
    source: &str,
    settings: &SettingsState,
    blocks: &[BlockInstance],
    resources: &BTreeMap<String, ResourceRecord>,
    options: &RenderOptions,
) -> RenderResult<RenderOutput> {
    let (css_source, html_source) = extract_css(&strip_schema(source));
    debug!(css_len = css_source.len(), "extracted section css");

    let css_template = blocksmith_parser::parse(&css_source)?;
    let html_template = blocksmith_parser::parse(&html_source)?;

    let globals = build_globals(settings, blocks, resources, options);
    let mut renderer = Renderer::new(RenderContext::new(globals, options.now));
    let css = if css_source.is_empty() {
        String::new()
    } else {
        renderer.render(&css_template)?
    };
    let html = renderer.render(&html_template)?;

    Ok(RenderOutput { html, css })
}

/// Render against the option's mock data, resolving resource settings from
/// it and dropping settings the schema does not declare.
pub fn render_with_mock(
    source: &str,
    settings: &SettingsState,
    blocks: &[BlockInstance],
    options: &RenderOptions,
) -> RenderResult<RenderOutput> {
    let schema = parse_schema(source);
    let mut settings = settings.clone();
    let resources = match &schema {
        Some(schema) => {
            settings.retain_declared(schema);
            resolve_resource_settings(schema, &settings, &options.data)
        }
        None => BTreeMap::new(),
    };
    render_section(source, &settings, blocks, &resources, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn options() -> RenderOptions {
        RenderOptions::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap())
    }

    fn render(source: &str) -> RenderOutput {
        render_section(
            source,
            &SettingsState::new(),
            &[],
            &BTreeMap::new(),
            &options(),
        )
        .unwrap()
    }

    #[test]
    fn test_extract_css_collects_both_forms() {
        let (css, html) = extract_css(
            "<div>a</div>{% style %}.a{color:red}{% endstyle %}<style media=\"all\">.b{}</style>",
        );
        assert_eq!(css, ".a{color:red}\n.b{}");
        assert_eq!(html, "<div>a</div>");
    }

    #[test]
    fn test_schema_is_never_rendered() {
        let out = render("<p>hi</p>{% schema %}{\"name\":\"X\"}{% endschema %}");
        assert_eq!(out.html, "<p>hi</p>");
        assert_eq!(out.css, "");
    }

    #[test]
    fn test_css_sees_settings() {
        let mut settings = SettingsState::new();
        settings.insert("color", "#ff0000");
        let out = render_section(
            "{% style %}.x{color:{{ section.settings.color }}}{% endstyle %}<b>{{ settings.color }}</b>",
            &settings,
            &[],
            &BTreeMap::new(),
            &options(),
        )
        .unwrap();
        assert_eq!(out.css, ".x{color:#ff0000}");
        assert_eq!(out.html, "<b>#ff0000</b>");
    }

    #[test]
    fn test_blocks_are_exposed() {
        let blocks = vec![
            BlockInstance::new("block-1", "text").with_setting("text", "One"),
            BlockInstance::new("block-2", "text").with_setting("text", "Two"),
        ];
        let out = render_section(
            "{% for block in section.blocks %}[{{ block.id }}:{{ block.settings.text }}]{% endfor %}",
            &SettingsState::new(),
            &blocks,
            &BTreeMap::new(),
            &options(),
        )
        .unwrap();
        assert_eq!(out.html, "[block-1:One][block-2:Two]");
    }

    #[test]
    fn test_section_id_and_request() {
        let out = render("{{ section.id }} {{ request.page_type }}");
        assert_eq!(out.html, "preview-section index");
    }

    #[test]
    fn test_products_without_collection_build_selection() {
        let data = MockData {
            products: vec![crate::mock::create_product(7, "Mug", "mug", 1200)],
            ..MockData::default()
        };
        let out = render_section(
            "{{ collection.title }}:{{ collection.products_count }}:{{ product.title }}",
            &SettingsState::new(),
            &[],
            &BTreeMap::new(),
            &options().with_data(data),
        )
        .unwrap();
        assert_eq!(out.html, "Selected Products:1:Mug");
    }

    #[test]
    fn test_resource_setting_resolves_through_mock() {
        let source = r#"{{ section.settings.featured.title }}{% schema %}{"name":"F","settings":[{"type":"product","id":"featured","label":"P"}]}{% endschema %}"#;
        let mut settings = SettingsState::new();
        settings.insert("featured", "sun-hat");
        settings.insert("stale", "gone");
        let data = MockData::preset("collection-standard").unwrap();
        let out = render_with_mock(source, &settings, &[], &options().with_data(data)).unwrap();
        assert_eq!(out.html, "Sun Hat");
    }

    #[test]
    fn test_eval_error_aborts() {
        let err = render_section(
            "before {{ 1 | divided_by: 0 }}",
            &SettingsState::new(),
            &[],
            &BTreeMap::new(),
            &options(),
        );
        assert!(err.is_err());
    }
}
