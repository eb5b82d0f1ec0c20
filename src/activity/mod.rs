/// Activity Log Store and Activity Recorder
///
/// The log is append-only: rows are never updated or removed. Toggling a
/// like off appends a new CLAP row with `is_deleted = true`, and readers
/// resolve the current state with latest-wins (`created_on`, then `seq`).

pub mod models;
pub mod recorder;
pub mod store;

pub use models::*;
pub use recorder::ActivityRecorder;
pub use store::SqliteActivityLog;

use crate::{error::FeedResult, validation::ContentId};
use async_trait::async_trait;

/// Append-only activity storage
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append one entry in a single insert
    async fn append(&self, entry: NewActivity) -> FeedResult<ActivityEntry>;

    /// Full CLAP history (including soft-deleted rows) for the given subjects
    async fn scan_claps(&self, subjects: &[ContentId]) -> FeedResult<Vec<ClapRecord>>;

    /// Live (not deleted) entries of one type for a subject, oldest first
    async fn list_by_subject(
        &self,
        subject: &ContentId,
        activity_type: ActivityType,
        offset: i64,
        limit: i64,
    ) -> FeedResult<Vec<ActivityEntry>>;
}
