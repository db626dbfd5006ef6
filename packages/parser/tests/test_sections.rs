use blocksmith_parser::{parse, Node, ParseError, Tag};
use pretty_assertions::assert_eq;

const FEATURED_PRODUCT: &str = r#"
{%- assign product = section.settings.product -%}
<div class="featured">
  {% if product != blank %}
    <h2>{{ product.title | escape }}</h2>
    {% unless product.available %}<span>Sold out</span>{% endunless %}
  {% else %}
    <p>{{ 'Select a product' }}</p>
  {% endif %}
  {% tablerow item in product.images cols: 2 %}{{ item.alt }}{% endtablerow %}
  {% form 'product', product %}
    <button>Add</button>
  {% endform %}
  {% render 'price', product: product %}
  {% style %}.featured { color: {{ section.settings.color }}; }{% endstyle %}
</div>
{% schema %}
{ "name": "Featured product", "settings": [{ "type": "product", "id": "product", "label": "Product" }] }
{% endschema %}
"#;

#[test]
fn test_parses_realistic_section() {
    let template = parse(FEATURED_PRODUCT).expect("section should parse");
    let tags: Vec<&Tag> = template
        .nodes
        .iter()
        .filter_map(|node| match node {
            Node::Tag(tag, _) => Some(tag),
            _ => None,
        })
        .collect();

    assert!(matches!(tags[0], Tag::Assign { .. }));
    assert!(tags.iter().any(|tag| matches!(tag, Tag::Tablerow(_))));
    assert!(tags.iter().any(|tag| matches!(tag, Tag::Form { .. })));
    assert!(tags.iter().any(|tag| matches!(tag, Tag::Style(_))));
}

#[test]
fn test_schema_block_is_not_output() {
    let template = parse(FEATURED_PRODUCT).unwrap();
    let text: String = template
        .nodes
        .iter()
        .filter_map(|node| match node {
            Node::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(!text.contains("Featured product"));
}

#[test]
fn test_unclosed_block_reports_tag_name() {
    let source = "<ul>\n{% for item in list %}\n<li>{{ item }}</li>\n";
    match parse(source) {
        Err(ParseError::UnclosedTag { pos, tag }) => {
            assert_eq!(tag, "for");
            assert_eq!(pos, 5);
        }
        other => panic!("expected unclosed tag error, got {:?}", other),
    }
}

#[test]
fn test_mismatched_end_tag() {
    let err = parse("{% if a %}x{% endfor %}").unwrap_err();
    assert_eq!(err, ParseError::unexpected_tag(11, "endfor"));
}

#[test]
fn test_bad_expression_is_an_error() {
    assert!(parse("{{ product. }}").is_err());
    assert!(parse("{% assign = 1 %}").is_err());
}

#[test]
fn test_whitespace_control_in_output() {
    let template = parse("a  {{- 'b' -}}  c").unwrap();
    assert_eq!(template.nodes.len(), 3);
    assert_eq!(template.nodes[0], Node::Text("a".to_string()));
    assert_eq!(template.nodes[2], Node::Text("c".to_string()));
}

#[test]
fn test_parse_is_deterministic() {
    let first = parse(FEATURED_PRODUCT).unwrap();
    for _ in 0..10 {
        assert_eq!(parse(FEATURED_PRODUCT).unwrap(), first);
    }
}
