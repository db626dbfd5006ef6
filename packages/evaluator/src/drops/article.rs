use super::product::image_value;
use super::{empty_array, iso_timestamp, RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::ArticleRecord;
use chrono::{DateTime, Utc};

pub struct ArticleDrop {
    article: ArticleRecord,
    now: DateTime<Utc>,
    raw: RawFields,
}

impl ArticleDrop {
    pub fn new(article: ArticleRecord, now: DateTime<Utc>) -> Self {
        Self {
            article,
            now,
            raw: RawFields::default(),
        }
    }
}

impl TemplateDrop for ArticleDrop {
    fn type_name(&self) -> &'static str {
        "article"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let article = &self.article;
        Some(match key {
            "id" => Value::Int(article.id),
            "title" => Value::string(&article.title),
            "handle" => Value::string(&article.handle),
            "content" => Value::string(&article.content),
            "excerpt" => Value::string(&article.excerpt),
            "excerpt_or_content" => {
                if article.excerpt.is_empty() {
                    Value::string(&article.content)
                } else {
                    Value::string(&article.excerpt)
                }
            }
            "author" => Value::string(&article.author),
            "published_at" | "created_at" => match &article.published_at {
                Some(published) => Value::string(published),
                None => iso_timestamp(self.now),
            },
            "image" => image_value(article.image.as_ref()),
            "tags" => Value::strings(&article.tags),
            "url" => Value::string(&article.url),
            "comments" => empty_array(),
            "comments_count" => Value::Int(0),
            "comments_enabled?" => Value::Bool(false),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.article, key)
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.article)
    }
}
