/// SQLite-backed activity log
use crate::{
    activity::{ActivityEntry, ActivityLog, ActivityType, ClapRecord, NewActivity},
    db::{encode_timestamp, parse_timestamp},
    error::FeedResult,
    metrics,
    validation::ContentId,
};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

/// Activity log over the `media_activities` table
#[derive(Clone)]
pub struct SqliteActivityLog {
    db: SqlitePool,
}

impl SqliteActivityLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn parse_entry(row: &SqliteRow) -> FeedResult<ActivityEntry> {
        let activity_type: String = row.try_get("activity_type")?;
        let subject_id: String = row.try_get("media_id")?;
        let actor_id: String = row.try_get("user_id")?;
        let created_on: String = row.try_get("created_on")?;
        let updated_on: String = row.try_get("updated_on")?;

        Ok(ActivityEntry {
            seq: row.try_get("seq")?,
            id: row.try_get("id")?,
            activity_type: ActivityType::from_str(&activity_type)?,
            subject_id: subject_id.parse()?,
            actor_id: actor_id.parse()?,
            comment_text: row.try_get("comments")?,
            publisher_name: row.try_get("publisher_name")?,
            publisher_image_url: row.try_get("publisher_image_url")?,
            created_on: parse_timestamp(&created_on)?,
            updated_on: parse_timestamp(&updated_on)?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }

    fn parse_clap(row: &SqliteRow) -> FeedResult<ClapRecord> {
        let subject_id: String = row.try_get("media_id")?;
        let actor_id: String = row.try_get("user_id")?;
        let created_on: String = row.try_get("created_on")?;

        Ok(ClapRecord {
            subject_id: subject_id.parse()?,
            actor_id: actor_id.parse()?,
            created_on: parse_timestamp(&created_on)?,
            seq: row.try_get("seq")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }
}

#[async_trait]
impl ActivityLog for SqliteActivityLog {
    async fn append(&self, entry: NewActivity) -> FeedResult<ActivityEntry> {
        let _timer = metrics::track_query("activity_append");

        let result = sqlx::query(
            r#"
            INSERT INTO media_activities (
                id, activity_type, media_id, user_id, comments,
                publisher_name, publisher_image_url, created_on, updated_on, is_deleted
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.activity_type.as_str())
        .bind(entry.subject_id.as_str())
        .bind(entry.actor_id.as_str())
        .bind(&entry.comment_text)
        .bind(&entry.publisher_name)
        .bind(&entry.publisher_image_url)
        .bind(encode_timestamp(&entry.created_on))
        .bind(encode_timestamp(&entry.updated_on))
        .bind(entry.is_deleted)
        .execute(&self.db)
        .await?;

        Ok(entry.into_entry(result.last_insert_rowid()))
    }

    async fn scan_claps(&self, subjects: &[ContentId]) -> FeedResult<Vec<ClapRecord>> {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }

        let _timer = metrics::track_query("activity_scan_claps");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT media_id, user_id, created_on, seq, is_deleted \
             FROM media_activities WHERE activity_type = ",
        );
        builder.push_bind(ActivityType::Clap.as_str());
        builder.push(" AND media_id IN (");
        let mut separated = builder.separated(", ");
        for subject in subjects {
            separated.push_bind(subject.as_str());
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.db).await?;
        rows.iter().map(Self::parse_clap).collect()
    }

    async fn list_by_subject(
        &self,
        subject: &ContentId,
        activity_type: ActivityType,
        offset: i64,
        limit: i64,
    ) -> FeedResult<Vec<ActivityEntry>> {
        let _timer = metrics::track_query("activity_list_by_subject");

        let rows = sqlx::query(
            r#"
            SELECT seq, id, activity_type, media_id, user_id, comments,
                   publisher_name, publisher_image_url, created_on, updated_on, is_deleted
            FROM media_activities
            WHERE media_id = ? AND activity_type = ? AND is_deleted = 0
            ORDER BY created_on ASC, seq ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(subject.as_str())
        .bind(activity_type.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::parse_entry).collect()
    }
}
