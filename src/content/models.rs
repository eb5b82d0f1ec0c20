/// Content item models
use crate::{
    error::{FeedError, FeedResult},
    validation::ContentId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of content allowed into the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Audio,
    Image,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Audio => "audio",
            ContentType::Image => "image",
        }
    }

    pub fn from_str(s: &str) -> FeedResult<Self> {
        match s.to_lowercase().as_str() {
            "video" => Ok(ContentType::Video),
            "audio" => Ok(ContentType::Audio),
            "image" => Ok(ContentType::Image),
            _ => Err(FeedError::Validation(format!("Invalid content type: {}", s))),
        }
    }
}

/// One rendition of a thumbnail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailVariant {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Thumbnail renditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ThumbnailVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<ThumbnailVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<ThumbnailVariant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    pub region: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
}

/// Where the content comes from and how to play it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProps {
    pub owner: String,
    pub source: Option<String>,
    /// Identifier on the source platform
    pub content_id: Option<String>,
    pub media_url: Option<String>,
    pub duration_in_seconds: Option<u32>,
    pub published_at_source: Option<String>,
    #[serde(default)]
    pub content_tags: Vec<String>,
    #[serde(default)]
    pub locale: Locale,
}

/// Counters maintained by this service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
}

/// Counters reported by the source platform, passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub rating: Option<f64>,
    pub subscribers: Option<u64>,
    pub likes: Option<u64>,
    pub views: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub dislikes: Option<u64>,
}

/// Editorial validation stamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validations {
    pub userid: Option<String>,
    pub validated_on: Option<String>,
}

/// A publishable content item as stored
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub content_type: ContentType,
    pub is_active: bool,
    pub is_public: bool,
    pub is_deleted: bool,
    pub thumbnail: Thumbnail,
    pub content_props: ContentProps,
    pub activity_stats: ActivityStats,
    pub source_stats: SourceStats,
    pub validations: Option<Validations>,
    pub created_on: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
