use super::{RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::ImageRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub preview_image: Option<ImageRecord>,
    #[serde(default)]
    pub sources: Vec<MediaSource>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub embed_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaSource {
    pub url: String,
    pub mime_type: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

fn default_media_type() -> String {
    "image".to_string()
}

/// Product media: images, videos, external videos and 3D models
pub struct MediaDrop {
    media: MediaRecord,
    raw: RawFields,
}

impl MediaDrop {
    pub fn new(media: MediaRecord) -> Self {
        Self {
            media,
            raw: RawFields::default(),
        }
    }

    /// Image media at a 1-based position
    pub fn from_image(image: &ImageRecord, position: usize) -> Self {
        Self::new(MediaRecord {
            id: position as i64,
            media_type: default_media_type(),
            position: position as i64,
            alt: image.alt.clone(),
            src: image.src.clone(),
            preview_image: Some(image.clone()),
            ..Default::default()
        })
    }
}

impl TemplateDrop for MediaDrop {
    fn type_name(&self) -> &'static str {
        "media"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let media = &self.media;
        Some(match key {
            "id" => Value::Int(media.id),
            "media_type" => Value::string(&media.media_type),
            "position" => Value::Int(media.position),
            "alt" => Value::string(&media.alt),
            "src" => Value::string(&media.src),
            "preview_image" => super::product::image_value(media.preview_image.as_ref()),
            "sources" => Value::Array(
                media
                    .sources
                    .iter()
                    .map(|source| {
                        Value::object([
                            ("url", Value::string(&source.url)),
                            ("mime_type", Value::string(&source.mime_type)),
                            ("width", Value::Int(source.width.into())),
                            ("height", Value::Int(source.height.into())),
                        ])
                    })
                    .collect(),
            ),
            "host" => Value::string(&media.host),
            "embed_url" => Value::string(&media.embed_url),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.media, key)
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_from_image() {
        let image = ImageRecord {
            src: "a.png".to_string(),
            alt: "A".to_string(),
            ..Default::default()
        };
        let media = MediaDrop::from_image(&image, 2);
        assert_eq!(media.lookup("media_type"), Value::string("image"));
        assert_eq!(media.lookup("position"), Value::Int(2));
        assert_eq!(media.lookup("preview_image").get("src"), Value::string("a.png"));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let record: MediaRecord = serde_json::from_value(serde_json::json!({"id": 3})).unwrap();
        let media = MediaDrop::new(record);
        assert_eq!(media.lookup("embed_url"), Value::string(""));
        assert_eq!(media.lookup("preview_image"), Value::Nil);
    }
}
