//! Article records as returned by the news backend.
//!
//! Upstream feeds disagree on field names (`description` vs `content`,
//! `urlToImage` vs `imageUrl`, ...) and any field may be missing or of the
//! wrong type. Deserialization is therefore lenient: an [`Article`] is built
//! from any JSON value, keeping only fields that hold usable text.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A news article. Every field is optional; accessors pick the first
/// populated alternative the way the backend's different upstreams name it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url_to_image: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub read_more_url: Option<String>,
}

/// Text-like JSON value → `Some(text)`. Empty strings count as absent.
fn text_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<Value> for Article {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };
        Self {
            title: text_field(&obj, "title"),
            description: text_field(&obj, "description"),
            content: text_field(&obj, "content"),
            url_to_image: text_field(&obj, "urlToImage"),
            image_url: text_field(&obj, "imageUrl"),
            published_at: text_field(&obj, "publishedAt"),
            date: text_field(&obj, "date"),
            url: text_field(&obj, "url"),
            read_more_url: text_field(&obj, "readMoreUrl"),
        }
    }
}

impl Article {
    /// Convenience constructor for a titled article.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// `description`, else `content`.
    pub fn body(&self) -> Option<&str> {
        self.description.as_deref().or(self.content.as_deref())
    }

    /// `urlToImage`, else `imageUrl`.
    pub fn image(&self) -> Option<&str> {
        self.url_to_image.as_deref().or(self.image_url.as_deref())
    }

    /// `publishedAt`, else `date`.
    pub fn published(&self) -> Option<&str> {
        self.published_at.as_deref().or(self.date.as_deref())
    }

    /// `url`, else `readMoreUrl`.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().or(self.read_more_url.as_deref())
    }
}
