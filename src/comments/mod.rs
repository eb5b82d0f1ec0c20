/// Comment Query Service
///
/// Pages through live comment entries for a subject and denormalizes each
/// author's name and avatar from the profile directory at read time.
///
/// When an author's profile cannot be resolved the comment is still
/// returned: author fields fall back to the name/avatar captured when the
/// comment was written, and are `null` if none was captured.
use crate::{
    activity::{ActivityEntry, ActivityLog, ActivityType},
    error::{FeedError, FeedResult},
    guard::QueryGuard,
    metrics,
    profile::{ProfileDirectory, UserProfile},
    validation::{ContentId, Page, UserId},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{error, info, warn};

/// A comment with its author denormalized
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub activity_type: ActivityType,
    pub media_id: ContentId,
    pub user_id: UserId,
    pub comments: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub publisher_name: Option<String>,
    pub publisher_image_url: Option<String>,
}

impl CommentView {
    fn new(entry: ActivityEntry, author: Option<&UserProfile>) -> Self {
        let (publisher_name, publisher_image_url) = match author {
            Some(profile) => {
                let name = profile.display_name();
                (
                    Some(name).filter(|n| !n.is_empty()).or(entry.publisher_name),
                    profile.profile_pic.clone().or(entry.publisher_image_url),
                )
            }
            None => (entry.publisher_name, entry.publisher_image_url),
        };

        Self {
            id: entry.id,
            activity_type: entry.activity_type,
            media_id: entry.subject_id,
            user_id: entry.actor_id,
            comments: entry.comment_text,
            created_on: entry.created_on,
            updated_on: entry.updated_on,
            publisher_name,
            publisher_image_url,
        }
    }
}

/// Lists comment threads
#[derive(Clone)]
pub struct CommentService {
    log: Arc<dyn ActivityLog>,
    profiles: Arc<dyn ProfileDirectory>,
}

impl CommentService {
    pub fn new(log: Arc<dyn ActivityLog>, profiles: Arc<dyn ProfileDirectory>) -> Self {
        Self { log, profiles }
    }

    /// One page of live entries of `activity_type` on `subject`, oldest first
    pub async fn list_comments(
        &self,
        subject: &ContentId,
        activity_type: ActivityType,
        page: Page,
        guard: &QueryGuard,
    ) -> FeedResult<Vec<CommentView>> {
        let result = async {
            let entries = guard
                .run(
                    "list_comment_entries",
                    self.log
                        .list_by_subject(subject, activity_type, page.offset(), page.limit()),
                )
                .await?;

            let actors: Vec<UserId> = entries
                .iter()
                .map(|e| e.actor_id.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let authors: HashMap<UserId, UserProfile> = guard
                .run("resolve_comment_authors", self.profiles.resolve(&actors))
                .await?;

            Ok::<_, FeedError>(entries
                .into_iter()
                .map(|entry| {
                    let author = authors.get(&entry.actor_id);
                    if author.is_none() {
                        metrics::record_join_inconsistency();
                        warn!(
                            operation = "list_comments",
                            media_id = %subject,
                            comment_id = %entry.id,
                            user_id = %entry.actor_id,
                            "Comment author profile not found"
                        );
                    }
                    CommentView::new(entry, author)
                })
                .collect::<Vec<_>>())
        }
        .await;

        match &result {
            Ok(comments) => info!(
                operation = "list_comments",
                media_id = %subject,
                page_num = page.num,
                returned = comments.len(),
                "Comments served"
            ),
            Err(e) => error!(
                operation = "list_comments",
                media_id = %subject,
                page_num = page.num,
                page_size = page.size,
                error = %e,
                "Failed to fetch comments"
            ),
        }

        result
    }
}
