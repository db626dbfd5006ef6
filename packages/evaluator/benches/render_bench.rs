use blocksmith_common::SettingsState;
use blocksmith_evaluator::{render_with_mock, MockData, RenderOptions};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const PRODUCT_CARD: &str = r#"
<div class="product-card">
  <h2>{{ product.title | escape }}</h2>
  {% if product.compare_at_price > product.price %}
    <s>{{ product.compare_at_price | money }}</s>
  {% endif %}
  <span>{{ product.price | money }}</span>
  {% for variant in product.variants %}
    <option value="{{ variant.id }}"{% unless variant.available %} disabled{% endunless %}>{{ variant.title }}</option>
  {% endfor %}
  {{ product.featured_image | image_url: width: 600 | image_tag: alt: product.title }}
</div>
{% style %}.product-card h2 { color: {{ section.settings.color }}; }{% endstyle %}
{% schema %}{"name":"Card","settings":[{"type":"color","id":"color","label":"Color","default":"#111111"}]}{% endschema %}
"#;

const COLLECTION_GRID: &str = r#"
{% paginate collection.products by 4 %}
{% tablerow item in collection.products cols: 3 %}
  <a href="{{ item.url }}">{{ item.title | truncate: 20 }}</a> {{ item.price | money_with_currency }}
{% endtablerow %}
{% endpaginate %}
"#;

fn options(preset: &str) -> RenderOptions {
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    RenderOptions::new(now).with_data(MockData::preset(preset).unwrap())
}

fn render_product_card(c: &mut Criterion) {
    let opts = options("product-standard");
    let mut settings = SettingsState::new();
    settings.insert("color", "#ff0000");

    c.bench_function("render_product_card", |b| {
        b.iter(|| render_with_mock(black_box(PRODUCT_CARD), &settings, &[], &opts))
    });
}

fn render_collection_grid(c: &mut Criterion) {
    let opts = options("collection-large");
    let settings = SettingsState::new();

    c.bench_function("render_collection_grid", |b| {
        b.iter(|| render_with_mock(black_box(COLLECTION_GRID), &settings, &[], &opts))
    });
}

criterion_group!(benches, render_product_card, render_collection_grid);
criterion_main!(benches);
