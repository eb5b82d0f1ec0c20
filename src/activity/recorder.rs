/// Activity Recorder: validate and append
use crate::{
    activity::{ActivityEntry, ActivityLog, ActivityRequest, ActivityType, NewActivity, RequestedAction},
    error::{FeedError, FeedResult},
    guard::QueryGuard,
    metrics,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

/// Writes new entries into the activity log
#[derive(Clone)]
pub struct ActivityRecorder {
    log: Arc<dyn ActivityLog>,
}

impl ActivityRecorder {
    pub fn new(log: Arc<dyn ActivityLog>) -> Self {
        Self { log }
    }

    /// Validate a request and turn it into an entry, stamping server-side timestamps
    pub fn prepare(mut request: ActivityRequest) -> FeedResult<NewActivity> {
        // An empty avatar URL means "no avatar"
        if request
            .publisher_image_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            request.publisher_image_url = None;
        }

        request
            .validate()
            .map_err(|e| FeedError::Validation(e.to_string()))?;

        // Fields below are guaranteed present by `validate`
        let missing = |field: &str| FeedError::Validation(format!("{} is required", field));
        let action = RequestedAction::from_str(
            request.activity_type.as_deref().ok_or_else(|| missing("activityType"))?,
        )?;
        let subject_id = request
            .media_id
            .as_deref()
            .ok_or_else(|| missing("mediaId"))?
            .parse()?;
        let actor_id = request
            .user_id
            .as_deref()
            .ok_or_else(|| missing("userId"))?
            .parse()?;

        let publisher_name = request
            .publisher_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FeedError::Validation("publisherName cannot be blank".to_string()))?
            .to_string();

        let (activity_type, is_deleted) = match action {
            RequestedAction::Record(kind) => (kind, false),
            RequestedAction::Unclap => (ActivityType::Clap, true),
        };

        let comment_text = request.comments.map(|c| c.trim().to_string());
        match (activity_type, &comment_text) {
            (ActivityType::Comment, None) => {
                return Err(FeedError::Validation(
                    "comments are required for COMMENT activities".to_string(),
                ));
            }
            (ActivityType::Comment, Some(text)) if text.is_empty() => {
                return Err(FeedError::Validation("comments cannot be blank".to_string()));
            }
            (ActivityType::Comment, Some(_)) => {}
            (other, Some(_)) => {
                return Err(FeedError::Validation(format!(
                    "comments are only allowed on COMMENT activities, not {}",
                    other.as_str()
                )));
            }
            (_, None) => {}
        }

        let now = Utc::now();
        Ok(NewActivity {
            id: uuid::Uuid::new_v4().to_string(),
            activity_type,
            subject_id,
            actor_id,
            comment_text,
            publisher_name: Some(publisher_name),
            publisher_image_url: request.publisher_image_url,
            created_on: now,
            updated_on: now,
            is_deleted,
        })
    }

    /// Validate and append one activity. Failures are reported, never retried.
    pub async fn record(
        &self,
        request: ActivityRequest,
        guard: &QueryGuard,
    ) -> FeedResult<ActivityEntry> {
        let entry = Self::prepare(request).map_err(|e| {
            warn!(operation = "record_activity", error = %e, "Activity request rejected");
            e
        })?;
        let (subject_id, actor_id) = (entry.subject_id.clone(), entry.actor_id.clone());

        let saved = guard
            .run("record_activity", self.log.append(entry))
            .await
            .map_err(|e| {
                error!(
                    operation = "record_activity",
                    media_id = %subject_id,
                    user_id = %actor_id,
                    error = %e,
                    "Failed to save activity"
                );
                e
            })?;

        metrics::record_activity(saved.activity_type.as_str());
        info!(
            operation = "record_activity",
            id = %saved.id,
            activity_type = saved.activity_type.as_str(),
            media_id = %saved.subject_id,
            retracted = saved.is_deleted,
            "Activity saved"
        );

        Ok(saved)
    }
}
