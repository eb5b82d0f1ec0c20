/// Engagement Aggregator
///
/// Derives like counts and the viewer's "liked" flag from the full CLAP
/// history of each subject. Every actor's history on a subject collapses to
/// its latest row, ordered by `created_on` and then by insertion `seq`; the
/// actor counts as a liker only when that row is not soft-deleted.
use crate::{
    activity::{ActivityLog, ClapRecord},
    error::FeedResult,
    guard::QueryGuard,
    validation::{ContentId, UserId},
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error};

/// Engagement state of one subject for one viewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementView {
    pub like_count: u64,
    pub is_liked_by_viewer: bool,
}

/// Resolve raw CLAP history into per-subject engagement.
///
/// The result has an entry for every requested subject, including those with
/// no history. Records for subjects outside `subjects` are ignored.
pub fn resolve_engagement(
    subjects: &[ContentId],
    history: &[ClapRecord],
    viewer: Option<&UserId>,
) -> HashMap<ContentId, EngagementView> {
    let mut views: HashMap<ContentId, EngagementView> = subjects
        .iter()
        .map(|id| (id.clone(), EngagementView::default()))
        .collect();

    let mut latest: HashMap<(&ContentId, &UserId), &ClapRecord> = HashMap::new();
    for record in history {
        latest
            .entry((&record.subject_id, &record.actor_id))
            .and_modify(|current| {
                if (record.created_on, record.seq) > (current.created_on, current.seq) {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    for ((subject, actor), record) in latest {
        if record.is_deleted {
            continue;
        }
        if let Some(view) = views.get_mut(subject) {
            view.like_count += 1;
            if viewer == Some(actor) {
                view.is_liked_by_viewer = true;
            }
        }
    }

    views
}

/// Computes engagement views from the activity log
#[derive(Clone)]
pub struct EngagementAggregator {
    log: Arc<dyn ActivityLog>,
}

impl EngagementAggregator {
    pub fn new(log: Arc<dyn ActivityLog>) -> Self {
        Self { log }
    }

    /// Engagement for each of `subjects`, as seen by `viewer` (anonymous when `None`)
    pub async fn compute(
        &self,
        subjects: &[ContentId],
        viewer: Option<&UserId>,
        guard: &QueryGuard,
    ) -> FeedResult<HashMap<ContentId, EngagementView>> {
        let mut seen = HashSet::with_capacity(subjects.len());
        let unique: Vec<ContentId> = subjects
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();

        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let history = guard
            .run("scan_claps", self.log.scan_claps(&unique))
            .await
            .map_err(|e| {
                error!(
                    operation = "compute_engagement",
                    subjects = unique.len(),
                    viewer = viewer.map(UserId::as_str),
                    error = %e,
                    "Failed to scan like history"
                );
                e
            })?;

        debug!(
            subjects = unique.len(),
            rows = history.len(),
            "Resolving engagement"
        );

        Ok(resolve_engagement(&unique, &history, viewer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityType, NewActivity, SqliteActivityLog};
    use crate::db::create_memory_pool;
    use crate::error::FeedError;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn rec(subject: &str, actor: &str, minutes: i64, seq: i64, deleted: bool) -> ClapRecord {
        ClapRecord {
            subject_id: subject.parse().unwrap(),
            actor_id: actor.parse().unwrap(),
            created_on: at(minutes),
            seq,
            is_deleted: deleted,
        }
    }

    fn ids(raw: &[&str]) -> Vec<ContentId> {
        raw.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn user(raw: &str) -> UserId {
        raw.parse().unwrap()
    }

    #[test]
    fn test_repeated_claps_count_once() {
        let subjects = ids(&["m1"]);
        let history = vec![rec("m1", "u1", 0, 1, false), rec("m1", "u1", 5, 2, false)];

        let u1 = user("u1");
        let views = resolve_engagement(&subjects, &history, Some(&u1));
        assert_eq!(
            views[&subjects[0]],
            EngagementView {
                like_count: 1,
                is_liked_by_viewer: true
            }
        );

        let u2 = user("u2");
        let views = resolve_engagement(&subjects, &history, Some(&u2));
        assert_eq!(views[&subjects[0]].like_count, 1);
        assert!(!views[&subjects[0]].is_liked_by_viewer);
    }

    #[test]
    fn test_latest_retraction_wins() {
        let subjects = ids(&["m1"]);
        let history = vec![
            rec("m1", "u1", 0, 1, false),
            rec("m1", "u1", 1, 2, true),
            rec("m1", "u2", 0, 3, false),
        ];

        let u1 = user("u1");
        let views = resolve_engagement(&subjects, &history, Some(&u1));
        assert_eq!(views[&subjects[0]].like_count, 1);
        assert!(!views[&subjects[0]].is_liked_by_viewer);
    }

    #[test]
    fn test_relike_after_retraction() {
        let subjects = ids(&["m1"]);
        let history = vec![
            rec("m1", "u1", 2, 3, false),
            rec("m1", "u1", 0, 1, false),
            rec("m1", "u1", 1, 2, true),
        ];

        let u1 = user("u1");
        let views = resolve_engagement(&subjects, &history, Some(&u1));
        assert_eq!(views[&subjects[0]].like_count, 1);
        assert!(views[&subjects[0]].is_liked_by_viewer);
    }

    #[test]
    fn test_same_timestamp_breaks_tie_on_seq() {
        let subjects = ids(&["m1"]);
        let like_then_unlike = vec![rec("m1", "u1", 0, 7, false), rec("m1", "u1", 0, 8, true)];
        let unlike_then_like = vec![rec("m1", "u1", 0, 8, false), rec("m1", "u1", 0, 7, true)];

        assert_eq!(
            resolve_engagement(&subjects, &like_then_unlike, None)[&subjects[0]].like_count,
            0
        );
        assert_eq!(
            resolve_engagement(&subjects, &unlike_then_like, None)[&subjects[0]].like_count,
            1
        );
    }

    #[test]
    fn test_timestamp_outranks_seq() {
        let subjects = ids(&["m1"]);
        // A later-inserted row with an older timestamp does not supersede
        let history = vec![rec("m1", "u1", 5, 1, false), rec("m1", "u1", 0, 2, true)];
        assert_eq!(
            resolve_engagement(&subjects, &history, None)[&subjects[0]].like_count,
            1
        );
    }

    #[test]
    fn test_anonymous_viewer_and_untouched_subjects() {
        let subjects = ids(&["m1", "m2"]);
        let history = vec![rec("m1", "u1", 0, 1, false), rec("m1", "u2", 0, 2, false)];

        let views = resolve_engagement(&subjects, &history, None);
        assert_eq!(views.len(), 2);
        assert_eq!(views[&subjects[0]].like_count, 2);
        assert!(!views[&subjects[0]].is_liked_by_viewer);
        assert_eq!(views[&subjects[1]], EngagementView::default());
    }

    #[test]
    fn test_history_outside_request_is_ignored() {
        let subjects = ids(&["m1"]);
        let history = vec![rec("m9", "u1", 0, 1, false)];
        let views = resolve_engagement(&subjects, &history, None);
        assert_eq!(views.len(), 1);
        assert_eq!(views[&subjects[0]].like_count, 0);
    }

    #[test]
    fn test_many_actors_many_toggles() {
        let subjects = ids(&["m1", "m2"]);
        let mut history = Vec::new();
        let mut seq = 0;
        // u0..u9 each toggle m1 i+1 times; odd number of toggles leaves a like
        for actor in 0..10 {
            for toggle in 0..=actor {
                seq += 1;
                history.push(rec("m1", &format!("u{}", actor), toggle, seq, toggle % 2 == 1));
            }
        }
        seq += 1;
        history.push(rec("m2", "u3", 0, seq, false));

        let u4 = user("u4");
        let views = resolve_engagement(&subjects, &history, Some(&u4));
        // Actors with an even index end on a like: u0, u2, u4, u6, u8
        assert_eq!(views[&subjects[0]].like_count, 5);
        assert!(views[&subjects[0]].is_liked_by_viewer);
        assert_eq!(views[&subjects[1]].like_count, 1);
        assert!(!views[&subjects[1]].is_liked_by_viewer);
    }

    struct FailingLog;

    #[async_trait]
    impl ActivityLog for FailingLog {
        async fn append(&self, _entry: NewActivity) -> FeedResult<crate::activity::ActivityEntry> {
            Err(FeedError::Database(sqlx::Error::PoolClosed))
        }

        async fn scan_claps(&self, _subjects: &[ContentId]) -> FeedResult<Vec<ClapRecord>> {
            Err(FeedError::Database(sqlx::Error::PoolClosed))
        }

        async fn list_by_subject(
            &self,
            _subject: &ContentId,
            _activity_type: ActivityType,
            _offset: i64,
            _limit: i64,
        ) -> FeedResult<Vec<crate::activity::ActivityEntry>> {
            Err(FeedError::Database(sqlx::Error::PoolClosed))
        }
    }

    fn guard() -> QueryGuard {
        QueryGuard::with_timeout(std::time::Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_empty_subjects_skip_storage() {
        let aggregator = EngagementAggregator::new(Arc::new(FailingLog));
        let views = aggregator.compute(&[], None, &guard()).await.unwrap();
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let aggregator = EngagementAggregator::new(Arc::new(FailingLog));
        let result = aggregator.compute(&ids(&["m1"]), None, &guard()).await;
        assert!(matches!(result, Err(FeedError::Database(_))));
    }

    #[tokio::test]
    async fn test_compute_over_sqlite_history() {
        let log = Arc::new(SqliteActivityLog::new(create_memory_pool().await.unwrap()));
        for (actor, deleted) in [("u1", false), ("u1", false), ("u2", false), ("u2", true)] {
            log.append(NewActivity {
                id: uuid::Uuid::new_v4().to_string(),
                activity_type: ActivityType::Clap,
                subject_id: "m1".parse().unwrap(),
                actor_id: actor.parse().unwrap(),
                comment_text: None,
                publisher_name: None,
                publisher_image_url: None,
                // Same instant for every row: only seq orders them
                created_on: at(0),
                updated_on: at(0),
                is_deleted: deleted,
            })
            .await
            .unwrap();
        }

        let aggregator = EngagementAggregator::new(log);
        let subjects = ids(&["m1", "m1"]);
        let u2 = user("u2");
        let views = aggregator.compute(&subjects, Some(&u2), &guard()).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[&subjects[0]].like_count, 1);
        assert!(!views[&subjects[0]].is_liked_by_viewer);
    }
}
