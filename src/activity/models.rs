/// Activity log models
use crate::{
    error::{FeedError, FeedResult},
    validation::{ContentId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kinds of engagement recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityType {
    /// A like
    Clap,
    Comment,
    /// Reserved; stored but not aggregated
    View,
    /// Reserved; stored but not aggregated
    Share,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Clap => "CLAP",
            ActivityType::Comment => "COMMENT",
            ActivityType::View => "VIEW",
            ActivityType::Share => "SHARE",
        }
    }

    pub fn from_str(s: &str) -> FeedResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "CLAP" | "LIKE" => Ok(ActivityType::Clap),
            "COMMENT" => Ok(ActivityType::Comment),
            "VIEW" => Ok(ActivityType::View),
            "SHARE" => Ok(ActivityType::Share),
            _ => Err(FeedError::Validation(format!("Invalid activity type: {}", s))),
        }
    }
}

/// A persisted activity log row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Insertion order, strictly increasing
    #[serde(skip)]
    pub seq: i64,
    pub id: String,
    pub activity_type: ActivityType,
    #[serde(rename = "mediaId")]
    pub subject_id: ContentId,
    #[serde(rename = "userId")]
    pub actor_id: UserId,
    #[serde(rename = "comments")]
    pub comment_text: Option<String>,
    pub publisher_name: Option<String>,
    pub publisher_image_url: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub is_deleted: bool,
}

/// An entry ready to append; the store assigns `seq`
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub id: String,
    pub activity_type: ActivityType,
    pub subject_id: ContentId,
    pub actor_id: UserId,
    pub comment_text: Option<String>,
    pub publisher_name: Option<String>,
    pub publisher_image_url: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub is_deleted: bool,
}

impl NewActivity {
    pub fn into_entry(self, seq: i64) -> ActivityEntry {
        ActivityEntry {
            seq,
            id: self.id,
            activity_type: self.activity_type,
            subject_id: self.subject_id,
            actor_id: self.actor_id,
            comment_text: self.comment_text,
            publisher_name: self.publisher_name,
            publisher_image_url: self.publisher_image_url,
            created_on: self.created_on,
            updated_on: self.updated_on,
            is_deleted: self.is_deleted,
        }
    }
}

/// The slice of a CLAP row the aggregator needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClapRecord {
    pub subject_id: ContentId,
    pub actor_id: UserId,
    pub created_on: DateTime<Utc>,
    pub seq: i64,
    pub is_deleted: bool,
}

/// Body of an activity recording request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    #[validate(required(message = "activityType is required"), length(min = 1))]
    pub activity_type: Option<String>,

    #[validate(required(message = "mediaId is required"), length(min = 1))]
    pub media_id: Option<String>,

    #[validate(required(message = "userId is required"), length(min = 1))]
    pub user_id: Option<String>,

    #[validate(length(min = 1, max = 2000, message = "comments must be 1-2000 characters"))]
    pub comments: Option<String>,

    #[validate(
        required(message = "publisherName is required"),
        length(min = 1, max = 200, message = "publisherName must be 1-200 characters")
    )]
    pub publisher_name: Option<String>,

    #[validate(url(message = "publisherImageUrl must be a URL"))]
    pub publisher_image_url: Option<String>,
}

/// Request types beyond the stored activity types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedAction {
    Record(ActivityType),
    /// Withdraw an earlier like
    Unclap,
}

impl RequestedAction {
    pub fn from_str(s: &str) -> FeedResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "UNCLAP" | "UNLIKE" => Ok(RequestedAction::Unclap),
            other => ActivityType::from_str(other).map(RequestedAction::Record),
        }
    }
}
