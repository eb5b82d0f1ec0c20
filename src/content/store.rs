/// SQLite-backed content store
use crate::{
    content::{ContentItem, ContentStore, ContentType},
    db::{encode_timestamp, parse_timestamp},
    error::FeedResult,
    metrics,
    validation::ContentId,
};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, content_type, is_active, is_public, is_deleted,
           thumbnail_json, content_props_json, activity_stats_json,
           source_stats_json, validations_json, created_on, updated_at
    FROM media
"#;

const ELIGIBLE: &str = r#"
    WHERE is_active = 1
      AND is_public = 1
      AND is_deleted = 0
      AND content_type IN ('video', 'audio', 'image')
"#;

/// Content store over the `media` table
#[derive(Clone)]
pub struct SqliteContentStore {
    db: SqlitePool,
}

impl SqliteContentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert or replace an item. Used by ingestion and fixtures; the read path never writes.
    pub async fn upsert(&self, item: &ContentItem) -> FeedResult<()> {
        let _timer = metrics::track_query("media_upsert");

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO media (
                id, title, content_type, is_active, is_public, is_deleted,
                thumbnail_json, content_props_json, activity_stats_json,
                source_stats_json, validations_json, created_on, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.as_str())
        .bind(&item.title)
        .bind(item.content_type.as_str())
        .bind(item.is_active)
        .bind(item.is_public)
        .bind(item.is_deleted)
        .bind(serde_json::to_string(&item.thumbnail)?)
        .bind(serde_json::to_string(&item.content_props)?)
        .bind(serde_json::to_string(&item.activity_stats)?)
        .bind(serde_json::to_string(&item.source_stats)?)
        .bind(
            item.validations
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(encode_timestamp(&item.created_on))
        .bind(item.updated_at.as_ref().map(encode_timestamp))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    fn parse_item(row: &SqliteRow) -> FeedResult<ContentItem> {
        let id: String = row.try_get("id")?;
        let content_type: String = row.try_get("content_type")?;

        let created_on: String = row.try_get("created_on")?;
        let updated_at = row
            .try_get::<Option<String>, _>("updated_at")?
            .map(|s| parse_timestamp(&s))
            .transpose()?;

        let validations = row
            .try_get::<Option<String>, _>("validations_json")?
            .map(|s| serde_json::from_str(&s))
            .transpose()?;

        Ok(ContentItem {
            id: id.parse()?,
            title: row.try_get("title")?,
            content_type: ContentType::from_str(&content_type)?,
            is_active: row.try_get("is_active")?,
            is_public: row.try_get("is_public")?,
            is_deleted: row.try_get("is_deleted")?,
            thumbnail: serde_json::from_str(&row.try_get::<String, _>("thumbnail_json")?)?,
            content_props: serde_json::from_str(&row.try_get::<String, _>("content_props_json")?)?,
            activity_stats: serde_json::from_str(
                &row.try_get::<String, _>("activity_stats_json")?,
            )?,
            source_stats: serde_json::from_str(&row.try_get::<String, _>("source_stats_json")?)?,
            validations,
            created_on: parse_timestamp(&created_on)?,
            updated_at,
        })
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn list_eligible(&self, offset: i64, limit: i64) -> FeedResult<Vec<ContentItem>> {
        let _timer = metrics::track_query("media_list_eligible");

        let sql = format!(
            "{} {} ORDER BY created_on DESC, id ASC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, ELIGIBLE
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        rows.iter().map(Self::parse_item).collect()
    }

    async fn get_eligible(&self, id: &ContentId) -> FeedResult<Option<ContentItem>> {
        let _timer = metrics::track_query("media_get_eligible");

        let sql = format!("{} {} AND id = ?", SELECT_COLUMNS, ELIGIBLE);
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(Self::parse_item).transpose()
    }
}
