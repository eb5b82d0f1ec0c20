/// User Profile lookup
///
/// Profiles are owned upstream; this service only reads them to put author
/// names and avatars on comments.
use crate::{error::FeedResult, metrics, validation::UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;

/// Author fields shown next to a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub profile_pic: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Resolves actor ids to profiles
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Profiles for the given ids; ids without a profile are absent from the map
    async fn resolve(&self, ids: &[UserId]) -> FeedResult<HashMap<UserId, UserProfile>>;
}

/// Profile directory over the `users` table
#[derive(Clone)]
pub struct SqliteProfileDirectory {
    db: SqlitePool,
}

impl SqliteProfileDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert or replace a profile (upstream sync and fixtures)
    pub async fn upsert(&self, profile: &UserProfile) -> FeedResult<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO users (id, first_name, last_name, profile_pic)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(profile.id.as_str())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.profile_pic)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileDirectory for SqliteProfileDirectory {
    async fn resolve(&self, ids: &[UserId]) -> FeedResult<HashMap<UserId, UserProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let _timer = metrics::track_query("users_resolve");

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, first_name, last_name, profile_pic FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.db).await?;

        let mut profiles = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let id: UserId = id.parse()?;
            profiles.insert(
                id.clone(),
                UserProfile {
                    id,
                    first_name: row.try_get("first_name")?,
                    last_name: row.try_get("last_name")?,
                    profile_pic: row.try_get("profile_pic")?,
                },
            );
        }

        Ok(profiles)
    }
}
