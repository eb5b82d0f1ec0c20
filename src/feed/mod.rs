/// Feed Query Service and Item-by-ID Query
///
/// Selects eligible content, enriches it with live engagement for the
/// requesting viewer and projects the public response shape.
use crate::{
    content::{
        ActivityStats, ContentItem, ContentProps, ContentStore, ContentType, SourceStats,
        Thumbnail, Validations,
    },
    engagement::{EngagementAggregator, EngagementView},
    error::{FeedError, FeedResult},
    guard::QueryGuard,
    validation::{ContentId, Page, UserId},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// A content item merged with its engagement view for one viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedItem {
    pub id: ContentId,
    pub title: String,
    pub thumbnail: Thumbnail,
    pub content_type: ContentType,
    pub created_on: DateTime<Utc>,
    pub content_props: ContentProps,
    pub is_public: bool,
    pub is_active: bool,
    pub is_deleted: bool,
    pub activity_stats: ActivityStats,
    pub source_stats: SourceStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations: Option<Validations>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_liked: bool,
}

impl EnrichedItem {
    pub fn new(item: ContentItem, engagement: EngagementView) -> Self {
        Self {
            id: item.id,
            title: item.title,
            thumbnail: item.thumbnail,
            content_type: item.content_type,
            created_on: item.created_on,
            content_props: item.content_props,
            is_public: item.is_public,
            is_active: item.is_active,
            is_deleted: item.is_deleted,
            activity_stats: ActivityStats {
                likes: engagement.like_count,
                ..item.activity_stats
            },
            source_stats: item.source_stats,
            validations: item.validations,
            updated_at: item.updated_at,
            is_liked: engagement.is_liked_by_viewer,
        }
    }
}

fn enrich(
    item: ContentItem,
    views: &HashMap<ContentId, EngagementView>,
) -> FeedResult<EnrichedItem> {
    let view = views.get(&item.id).copied().ok_or_else(|| {
        FeedError::Internal(format!("No engagement computed for media {}", item.id))
    })?;
    Ok(EnrichedItem::new(item, view))
}

/// Orchestrates content selection and engagement enrichment
#[derive(Clone)]
pub struct FeedService {
    content: Arc<dyn ContentStore>,
    engagement: EngagementAggregator,
}

impl FeedService {
    pub fn new(content: Arc<dyn ContentStore>, engagement: EngagementAggregator) -> Self {
        Self { content, engagement }
    }

    /// One page of the feed, newest first
    pub async fn list_feed(
        &self,
        page: Page,
        viewer: Option<&UserId>,
        guard: &QueryGuard,
    ) -> FeedResult<Vec<EnrichedItem>> {
        let result = async {
            let items = guard
                .run(
                    "list_eligible_media",
                    self.content.list_eligible(page.offset(), page.limit()),
                )
                .await?;

            let ids: Vec<ContentId> = items.iter().map(|item| item.id.clone()).collect();
            let views = self.engagement.compute(&ids, viewer, guard).await?;

            items
                .into_iter()
                .map(|item| enrich(item, &views))
                .collect::<FeedResult<Vec<_>>>()
        }
        .await;

        match &result {
            Ok(items) => info!(
                operation = "list_feed",
                page_num = page.num,
                page_size = page.size,
                returned = items.len(),
                "Feed page served"
            ),
            Err(e) => error!(
                operation = "list_feed",
                page_num = page.num,
                page_size = page.size,
                viewer = viewer.map(UserId::as_str),
                error = %e,
                "Failed to fetch feed"
            ),
        }

        result
    }

    /// A single eligible item, `None` when absent or ineligible.
    ///
    /// The content lookup and the like scan run concurrently; either leg
    /// failing aborts the other and fails the call.
    pub async fn get_by_id(
        &self,
        id: &ContentId,
        viewer: Option<&UserId>,
        guard: &QueryGuard,
    ) -> FeedResult<Option<EnrichedItem>> {
        let lookup_guard = guard.child();
        let scan_guard = guard.child();
        let subjects = [id.clone()];

        let result = tokio::try_join!(
            lookup_guard.run("get_eligible_media", self.content.get_eligible(id)),
            self.engagement.compute(&subjects, viewer, &scan_guard),
        )
        .and_then(|(item, views)| item.map(|item| enrich(item, &views)).transpose());

        if let Err(e) = &result {
            error!(
                operation = "get_media_by_id",
                media_id = %id,
                viewer = viewer.map(UserId::as_str),
                error = %e,
                "Failed to fetch media"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{
        ActivityEntry, ActivityLog, ActivityType, ClapRecord, NewActivity, SqliteActivityLog,
    };
    use crate::content::store::fixtures::{base_time, item};
    use crate::content::SqliteContentStore;
    use crate::db::create_memory_pool;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    struct Fixture {
        content: Arc<SqliteContentStore>,
        log: Arc<SqliteActivityLog>,
        service: FeedService,
    }

    async fn fixture() -> Fixture {
        let pool = create_memory_pool().await.unwrap();
        let content = Arc::new(SqliteContentStore::new(pool.clone()));
        let log = Arc::new(SqliteActivityLog::new(pool));
        let service = FeedService::new(content.clone(), EngagementAggregator::new(log.clone()));
        Fixture {
            content,
            log,
            service,
        }
    }

    async fn clap(log: &SqliteActivityLog, subject: &str, actor: &str, minutes: i64, deleted: bool) {
        let at = base_time() + ChronoDuration::minutes(minutes);
        log.append(NewActivity {
            id: uuid::Uuid::new_v4().to_string(),
            activity_type: ActivityType::Clap,
            subject_id: subject.parse().unwrap(),
            actor_id: actor.parse().unwrap(),
            comment_text: None,
            publisher_name: None,
            publisher_image_url: None,
            created_on: at,
            updated_on: at,
            is_deleted: deleted,
        })
        .await
        .unwrap();
    }

    fn guard() -> QueryGuard {
        QueryGuard::with_timeout(Duration::from_secs(5))
    }

    fn page(num: i64, size: i64) -> Page {
        Page::new(num, size, 100).unwrap()
    }

    #[tokio::test]
    async fn test_feed_enriches_with_live_likes() {
        let f = fixture().await;
        f.content.upsert(&item("m1", 0)).await.unwrap();
        clap(&f.log, "m1", "u1", 1, false).await;
        clap(&f.log, "m1", "u1", 2, false).await;

        let u1: UserId = "u1".parse().unwrap();
        let items = f.service.list_feed(page(1, 10), Some(&u1), &guard()).await.unwrap();
        assert_eq!(items.len(), 1);
        // Stored counter is replaced by the computed one
        assert_eq!(items[0].activity_stats.likes, 1);
        assert_eq!(items[0].activity_stats.views, 12);
        assert!(items[0].is_liked);

        let u2: UserId = "u2".parse().unwrap();
        let items = f.service.list_feed(page(1, 10), Some(&u2), &guard()).await.unwrap();
        assert_eq!(items[0].activity_stats.likes, 1);
        assert!(!items[0].is_liked);
    }

    #[tokio::test]
    async fn test_second_page_of_one_returns_older_item() {
        let f = fixture().await;
        f.content.upsert(&item("older", 0)).await.unwrap();
        f.content.upsert(&item("newer", 10)).await.unwrap();

        let items = f.service.list_feed(page(2, 1), None, &guard()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "older");
    }

    #[tokio::test]
    async fn test_pages_neither_repeat_nor_skip() {
        let f = fixture().await;
        for n in 0..7 {
            f.content.upsert(&item(&format!("m{}", n), n % 3)).await.unwrap();
        }
        let mut hidden = item("hidden", 99);
        hidden.is_public = false;
        f.content.upsert(&hidden).await.unwrap();

        let mut seen = Vec::new();
        for num in 1..=4 {
            let items = f.service.list_feed(page(num, 2), None, &guard()).await.unwrap();
            assert!(items.len() <= 2);
            seen.extend(items.into_iter().map(|i| i.id.to_string()));
        }

        let mut unique = seen.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(seen.len(), 7);
        assert_eq!(unique.len(), 7);
        assert!(!seen.contains(&"hidden".to_string()));
    }

    #[tokio::test]
    async fn test_get_by_id_found_and_not_found() {
        let f = fixture().await;
        f.content.upsert(&item("m1", 0)).await.unwrap();
        let mut inactive = item("m2", 0);
        inactive.is_active = false;
        f.content.upsert(&inactive).await.unwrap();
        clap(&f.log, "m1", "u1", 0, false).await;
        clap(&f.log, "m1", "u1", 1, true).await;
        clap(&f.log, "m1", "u2", 0, false).await;

        let u1: UserId = "u1".parse().unwrap();
        let found = f
            .service
            .get_by_id(&"m1".parse().unwrap(), Some(&u1), &guard())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.activity_stats.likes, 1);
        assert!(!found.is_liked);

        for id in ["m2", "missing"] {
            let result = f
                .service
                .get_by_id(&id.parse().unwrap(), Some(&u1), &guard())
                .await
                .unwrap();
            assert!(result.is_none());
        }
    }

    #[tokio::test]
    async fn test_empty_feed_page() {
        let f = fixture().await;
        f.content.upsert(&item("m1", 0)).await.unwrap();
        let items = f.service.list_feed(page(5, 10), None, &guard()).await.unwrap();
        assert!(items.is_empty());
    }

    struct SlowContent;

    #[async_trait]
    impl ContentStore for SlowContent {
        async fn list_eligible(&self, _offset: i64, _limit: i64) -> FeedResult<Vec<ContentItem>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }

        async fn get_eligible(&self, _id: &ContentId) -> FeedResult<Option<ContentItem>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_slow_leg_fails_whole_lookup() {
        let log: Arc<dyn ActivityLog> =
            Arc::new(SqliteActivityLog::new(create_memory_pool().await.unwrap()));
        let service = FeedService::new(Arc::new(SlowContent), EngagementAggregator::new(log));
        let quick = QueryGuard::with_timeout(Duration::from_millis(20));

        let result = service.get_by_id(&"m1".parse().unwrap(), None, &quick).await;
        assert!(matches!(
            result,
            Err(FeedError::StorageTimeout {
                operation: "get_eligible_media"
            })
        ));

        let result = service.list_feed(page(1, 10), None, &quick).await;
        assert!(matches!(result, Err(FeedError::StorageTimeout { .. })));
    }

    struct SlowLog;

    #[async_trait]
    impl ActivityLog for SlowLog {
        async fn append(&self, entry: NewActivity) -> FeedResult<ActivityEntry> {
            Ok(entry.into_entry(0))
        }

        async fn scan_claps(&self, _subjects: &[ContentId]) -> FeedResult<Vec<ClapRecord>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }

        async fn list_by_subject(
            &self,
            _subject: &ContentId,
            _activity_type: ActivityType,
            _offset: i64,
            _limit: i64,
        ) -> FeedResult<Vec<ActivityEntry>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_slow_like_scan_fails_whole_request() {
        let content = Arc::new(SqliteContentStore::new(create_memory_pool().await.unwrap()));
        content.upsert(&item("m1", 0)).await.unwrap();
        let service = FeedService::new(content, EngagementAggregator::new(Arc::new(SlowLog)));
        let quick = QueryGuard::with_timeout(Duration::from_millis(20));

        let result = service.get_by_id(&"m1".parse().unwrap(), None, &quick).await;
        assert!(matches!(
            result,
            Err(FeedError::StorageTimeout {
                operation: "scan_claps"
            })
        ));

        // The content page is found but is never returned without its likes
        let result = service.list_feed(page(1, 10), None, &quick).await;
        assert!(matches!(
            result,
            Err(FeedError::StorageTimeout {
                operation: "scan_claps"
            })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_request_returns_no_partial_result() {
        let log: Arc<dyn ActivityLog> =
            Arc::new(SqliteActivityLog::new(create_memory_pool().await.unwrap()));
        let service = FeedService::new(Arc::new(SlowContent), EngagementAggregator::new(log));
        let request_guard = guard();
        let token = request_guard.cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = service
            .get_by_id(&"m1".parse().unwrap(), None, &request_guard)
            .await;
        assert!(matches!(result, Err(FeedError::Cancelled { .. })));
    }

    #[test]
    fn test_projection_shape() {
        let enriched = EnrichedItem::new(
            item("m1", 0),
            EngagementView {
                like_count: 3,
                is_liked_by_viewer: true,
            },
        );
        let json = serde_json::to_value(&enriched).unwrap();

        assert_eq!(json["id"], "m1");
        assert_eq!(json["contentType"], "video");
        assert_eq!(json["activityStats"]["likes"], 3);
        assert_eq!(json["isLiked"], true);
        assert_eq!(json["contentProps"]["owner"], "agri-channel");
        assert!(json.get("validations").is_none());
        assert!(json.get("seq").is_none());
    }
}
