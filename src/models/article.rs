//! News article model
//!
//! This module provides:
//! - `Article` entity representing a news article
//! - Input types for creating and patching articles
//! - Tag list parsing for comma-separated form input

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// News article entity
///
/// Serialized with camelCase keys, which is the shape the site front-end reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Opaque unique identifier (UUID v4), assigned on creation
    pub id: String,
    /// Article title
    pub title: String,
    /// Body text
    pub content: String,
    /// Public reference to the stored image (`/uploads/...`)
    pub image_path: String,
    /// Optional external video URL
    #[serde(default)]
    pub video_url: Option<String>,
    /// Ordered tags, duplicates allowed
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the article is shown in the featured section
    #[serde(default)]
    pub is_featured: bool,
    /// Creation timestamp, never modified
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new article
///
/// The image is passed separately since it goes through the upload storage.
#[derive(Debug, Clone, Default)]
pub struct CreateArticleInput {
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub tags: Vec<String>,
    pub is_featured: bool,
}

impl CreateArticleInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_video_url(mut self, video_url: impl Into<String>) -> Self {
        self.video_url = Some(video_url.into());
        self
    }

    pub fn featured(mut self, is_featured: bool) -> Self {
        self.is_featured = is_featured;
        self
    }
}

/// Partial update for an existing article
///
/// Only fields that are `Some` change. `video_url: Some(None)` clears the video.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
}

impl UpdateArticleInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_featured(mut self, is_featured: bool) -> Self {
        self.is_featured = Some(is_featured);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.video_url.is_some()
            || self.tags.is_some()
            || self.is_featured.is_some()
    }

    /// Merge the provided fields into `article`
    pub fn apply_to(self, article: &mut Article) {
        if let Some(title) = self.title {
            article.title = title;
        }
        if let Some(content) = self.content {
            article.content = content;
        }
        if let Some(video_url) = self.video_url {
            article.video_url = video_url;
        }
        if let Some(tags) = self.tags {
            article.tags = tags;
        }
        if let Some(is_featured) = self.is_featured {
            article.is_featured = is_featured;
        }
    }
}

/// Split comma-separated tag text into an ordered list.
///
/// Entries are trimmed and empty entries dropped, so `"a, b, c"` becomes
/// `["a", "b", "c"]` and `""` becomes `[]`.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> Article {
        Article {
            id: "a1".to_string(),
            title: "Launch".to_string(),
            content: "We launched".to_string(),
            image_path: "/uploads/1-x.png".to_string(),
            video_url: Some("https://youtu.be/x".to_string()),
            tags: vec!["web3".to_string()],
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_tags_trims_entries() {
        assert_eq!(parse_tags("a, b, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_tags_drops_empty_entries() {
        assert_eq!(parse_tags(""), Vec::<String>::new());
        assert_eq!(parse_tags(" , a,,b , "), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_tags_keeps_duplicates_and_order() {
        assert_eq!(parse_tags("z, a, z"), vec!["z", "a", "z"]);
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let json = serde_json::to_value(sample_article()).unwrap();
        assert_eq!(json["imagePath"], "/uploads/1-x.png");
        assert_eq!(json["videoUrl"], "https://youtu.be/x");
        assert_eq!(json["isFeatured"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image_path").is_none());
    }

    #[test]
    fn test_update_applies_only_provided_fields() {
        let mut article = sample_article();
        let before = article.clone();

        UpdateArticleInput::new().with_title("X").apply_to(&mut article);

        assert_eq!(article.title, "X");
        assert_eq!(article.content, before.content);
        assert_eq!(article.image_path, before.image_path);
        assert_eq!(article.video_url, before.video_url);
        assert_eq!(article.tags, before.tags);
        assert_eq!(article.is_featured, before.is_featured);
        assert_eq!(article.created_at, before.created_at);
    }

    #[test]
    fn test_update_can_clear_video() {
        let mut article = sample_article();
        let input = UpdateArticleInput {
            video_url: Some(None),
            ..Default::default()
        };
        assert!(input.has_changes());
        input.apply_to(&mut article);
        assert!(article.video_url.is_none());
    }

    #[test]
    fn test_empty_update_has_no_changes() {
        assert!(!UpdateArticleInput::new().has_changes());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Joining tags with ", " and parsing them back gives the same list.
        #[test]
        fn tags_survive_comma_join(tags in prop::collection::vec("[a-zA-Z0-9][a-zA-Z0-9 _-]{0,10}[a-zA-Z0-9]", 0..8)) {
            let raw = tags.join(", ");
            prop_assert_eq!(parse_tags(&raw), tags);
        }

        /// Parsed tags never carry surrounding whitespace or empties.
        #[test]
        fn parsed_tags_are_trimmed(raw in "[a-z ,]{0,40}") {
            for tag in parse_tags(&raw) {
                prop_assert!(!tag.is_empty());
                prop_assert_eq!(tag.trim(), tag.as_str());
            }
        }
    }
}
