//! Image, video and 3D model markup.

use super::html::escape_attr;
use super::{FilterArgs, Registry};
use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::value::Value;
use std::sync::OnceLock;

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 200"><rect fill="#f0f0f0" width="300" height="200"/><text x="150" y="105" text-anchor="middle" fill="#999" font-family="sans-serif">No Image</text></svg>"##;

/// Inline "No Image" SVG as a data URI, usable offline
pub fn placeholder_image_uri() -> &'static str {
    static URI: OnceLock<String> = OnceLock::new();
    URI.get_or_init(|| format!("data:image/svg+xml,{}", urlencoding::encode(PLACEHOLDER_SVG)))
}

pub(super) fn register(filters: &mut Registry) {
    filters.insert("image_tag", |v, args, _| Ok(Value::Str(image_tag(&v, args))));
    filters.insert("media_tag", media_tag);
    filters.insert("video_tag", |v, args, _| Ok(Value::Str(video_tag(&v, args))));
    filters.insert("external_video_tag", |v, _, _| Ok(Value::Str(external_video_tag(&v))));
    filters.insert("external_video_url", |v, _, _| Ok(Value::Str(external_video_url(&v))));
    filters.insert("model_viewer_tag", |v, _, _| Ok(Value::Str(model_viewer_tag(&v))));
    filters.insert("placeholder_svg_tag", placeholder_svg_tag);
}

/// Property as text, empty for `nil`
fn prop(value: &Value, key: &str) -> String {
    value.get(key).render()
}

fn first_non_empty(candidates: impl IntoIterator<Item = String>) -> Option<String> {
    candidates.into_iter().find(|s| !s.is_empty())
}

fn image_tag(image: &Value, args: &FilterArgs) -> String {
    let mut alt = args.keyword("alt").map(Value::render).unwrap_or_default();
    let src = match image {
        Value::Str(s) => s.clone(),
        Value::Nil | Value::Bool(false) => placeholder_image_uri().to_string(),
        other => {
            if alt.is_empty() {
                alt = prop(other, "alt");
            }
            first_non_empty([prop(other, "src"), prop(other, "url")])
                .unwrap_or_else(|| placeholder_image_uri().to_string())
        }
    };

    let mut attrs = vec![
        format!(r#"src="{}""#, escape_attr(&src)),
        format!(r#"alt="{}""#, escape_attr(&alt)),
    ];
    if let Some(class) = args.keyword("class") {
        attrs.push(format!(r#"class="{}""#, escape_attr(&class.render())));
    }
    if let Some(loading) = args.keyword("loading") {
        attrs.push(format!(r#"loading="{}""#, loading.render()));
    }
    for dimension in ["width", "height"] {
        if let Some(value) = args.keyword(dimension).filter(|v| v.is_truthy()) {
            attrs.push(format!(r#"{}="{}""#, dimension, value.render()));
        }
    }
    if let Some(sizes) = args.keyword("sizes") {
        attrs.push(format!(r#"sizes="{}""#, escape_attr(&sizes.render())));
    }
    format!("<img {}>", attrs.join(" "))
}

/// Dispatch on `media_type`, defaulting to an image
fn media_tag(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    if !input.is_truthy() {
        return Ok(Value::string(""));
    }
    let none = FilterArgs::default();
    Ok(Value::Str(match prop(&input, "media_type").as_str() {
        "video" => video_tag(&input, &none),
        "external_video" => external_video_tag(&input),
        "model" => model_viewer_tag(&input),
        _ => image_tag(&input, &none),
    }))
}

fn video_tag(video: &Value, args: &FilterArgs) -> String {
    if !video.is_truthy() {
        return String::new();
    }
    let flag = |name: &str| args.keyword(name).is_some_and(Value::is_truthy);

    let mut attrs = Vec::new();
    for name in ["autoplay", "loop", "muted"] {
        if flag(name) {
            attrs.push(name.to_string());
        }
    }
    if !matches!(args.keyword("controls"), Some(Value::Bool(false))) {
        attrs.push("controls".to_string());
    }
    if let Some(poster) = args.keyword("poster") {
        attrs.push(format!(r#"poster="{}""#, escape_attr(&poster.render())));
    }

    let sources = video.get("sources").iter_items();
    if sources.is_empty() {
        return format!(
            r#"<video {} src="{}"></video>"#,
            attrs.join(" "),
            escape_attr(&prop(video, "src"))
        );
    }
    let tags: String = sources
        .iter()
        .map(|source| {
            format!(
                r#"<source src="{}" type="{}">"#,
                escape_attr(&prop(source, "url")),
                escape_attr(&prop(source, "mime_type"))
            )
        })
        .collect();
    format!("<video {}>{}</video>", attrs.join(" "), tags)
}

fn external_video_url(video: &Value) -> String {
    if !video.is_truthy() {
        return String::new();
    }
    let embed = prop(video, "embed_url");
    if !embed.is_empty() {
        return embed;
    }
    let host = first_non_empty([prop(video, "host")]).unwrap_or_else(|| "youtube".to_string());
    let id = prop(video, "id");
    match host.as_str() {
        "youtube" => format!("https://www.youtube.com/embed/{}", id),
        "vimeo" => format!("https://player.vimeo.com/video/{}", id),
        _ => String::new(),
    }
}

fn external_video_tag(video: &Value) -> String {
    if !video.is_truthy() {
        return String::new();
    }
    let host = first_non_empty([prop(video, "host")]).unwrap_or_else(|| "youtube".to_string());
    format!(
        r#"<iframe src="{}" class="external-video external-video--{}" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen loading="lazy"></iframe>"#,
        escape_attr(&external_video_url(video)),
        host
    )
}

fn model_viewer_tag(model: &Value) -> String {
    if !model.is_truthy() {
        return String::new();
    }
    let alt = first_non_empty([prop(model, "alt")]).unwrap_or_else(|| "3D Model".to_string());
    format!(
        r#"<model-viewer src="{}" alt="{}" poster="{}" camera-controls auto-rotate loading="lazy"></model-viewer>"#,
        escape_attr(&prop(model, "src")),
        escape_attr(&alt),
        escape_attr(&prop(model, "poster"))
    )
}

fn placeholder_svg_tag(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    let kind = input.render();
    let (w, h) = match kind.as_str() {
        "collection" => (4.0, 3.0),
        "image" => (16.0, 9.0),
        "lifestyle" => (3.0, 2.0),
        _ => (1.0, 1.0),
    };
    let width = 300u32;
    let height = (f64::from(width) * (h / w)).round() as u32;
    let half_height = f64::from(height) / 2.0;
    Ok(Value::Str(format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" class="placeholder-svg placeholder-svg--{kind}"><rect fill="#f0f0f0" width="{w}" height="{h}"/><text x="{x}" y="{y}" text-anchor="middle" fill="#999" font-family="sans-serif" font-size="14">{kind}</text></svg>"##,
        w = width,
        h = height,
        x = width / 2,
        y = half_height,
        kind = kind
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{run, run_text};
    use serde_json::json;

    #[test]
    fn test_image_tag_nil_uses_placeholder() {
        let tag = run_text("image_tag", Value::Nil, vec![]);
        assert!(tag.starts_with(r#"<img src="data:image/svg+xml,%3Csvg"#));
        assert!(tag.ends_with(r#"alt="">"#));
    }

    #[test]
    fn test_image_tag_options() {
        let args = FilterArgs::default()
            .with_keyword("class", Value::string("hero"))
            .with_keyword("loading", Value::string("lazy"))
            .with_keyword("width", Value::Int(400));
        let image = Value::from(json!({"src": "/a.jpg", "alt": "A \"shirt\""}));
        let ctx = crate::filters::test_support::ctx();
        let tag = crate::filters::apply("image_tag", image, &args, &ctx).unwrap().render();
        assert_eq!(
            tag,
            r#"<img src="/a.jpg" alt="A &quot;shirt&quot;" class="hero" loading="lazy" width="400">"#
        );
    }

    #[test]
    fn test_media_tag_dispatch() {
        let video = Value::from(json!({
            "media_type": "video",
            "sources": [{"url": "/v.mp4", "mime_type": "video/mp4"}]
        }));
        assert_eq!(
            run_text("media_tag", video, vec![]),
            r#"<video controls><source src="/v.mp4" type="video/mp4"></video>"#
        );
        let model = Value::from(json!({"media_type": "model", "src": "/m.glb"}));
        assert!(run_text("media_tag", model, vec![]).contains(r#"alt="3D Model""#));
        assert_eq!(run("media_tag", Value::Nil, vec![]), Value::string(""));
    }

    #[test]
    fn test_external_video() {
        let video = Value::from(json!({"host": "vimeo", "id": "42"}));
        assert_eq!(
            run_text("external_video_url", video.clone(), vec![]),
            "https://player.vimeo.com/video/42"
        );
        assert!(run_text("external_video_tag", video, vec![])
            .contains(r#"class="external-video external-video--vimeo""#));
        let youtube = Value::from(json!({"id": "abc"}));
        assert_eq!(
            run_text("external_video_url", youtube, vec![]),
            "https://www.youtube.com/embed/abc"
        );
    }

    #[test]
    fn test_placeholder_svg_ratio() {
        let svg = run_text("placeholder_svg_tag", "collection", vec![]);
        assert!(svg.contains(r#"viewBox="0 0 300 225""#));
        assert!(svg.contains(r#"x="150" y="112.5""#));
        assert!(svg.contains("placeholder-svg--collection"));
        assert!(run_text("placeholder_svg_tag", "product", vec![]).contains(r#"y="150""#));
    }
}
