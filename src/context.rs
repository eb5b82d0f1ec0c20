/// Application context and dependency injection
use crate::{
    activity::{ActivityLog, ActivityRecorder, SqliteActivityLog},
    comments::CommentService,
    config::ServerConfig,
    content::{ContentStore, SqliteContentStore},
    db,
    engagement::EngagementAggregator,
    error::FeedResult,
    feed::FeedService,
    guard::QueryGuard,
    profile::{ProfileDirectory, SqliteProfileDirectory},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub feed: FeedService,
    pub comments: CommentService,
    pub recorder: ActivityRecorder,
    /// Cancelled on shutdown; every request guard is a child of it
    pub shutdown: CancellationToken,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> FeedResult<Self> {
        // Validate configuration
        config.validate()?;

        let pool = db::create_pool(
            &config.storage.database_location,
            db::DatabaseOptions {
                max_connections: config.storage.max_connections,
                ..Default::default()
            },
        )
        .await?;

        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;
        info!("Feed database ready");

        Ok(Self::from_pool(config, pool))
    }

    /// Wire services over an existing pool
    pub fn from_pool(config: ServerConfig, pool: SqlitePool) -> Self {
        let content: Arc<dyn ContentStore> = Arc::new(SqliteContentStore::new(pool.clone()));
        let log: Arc<dyn ActivityLog> = Arc::new(SqliteActivityLog::new(pool.clone()));
        let profiles: Arc<dyn ProfileDirectory> =
            Arc::new(SqliteProfileDirectory::new(pool.clone()));

        let engagement = EngagementAggregator::new(log.clone());

        Self {
            config: Arc::new(config),
            db: pool,
            feed: FeedService::new(content, engagement),
            comments: CommentService::new(log.clone(), profiles),
            recorder: ActivityRecorder::new(log),
            shutdown: CancellationToken::new(),
        }
    }

    /// Guard for one request: configured deadline, cancelled on shutdown
    pub fn request_guard(&self) -> QueryGuard {
        QueryGuard::new(self.config.query.timeout(), self.shutdown.child_token())
    }

    /// Cancel in-flight work and release the database
    pub async fn close(&self) {
        self.shutdown.cancel();
        db::close_pool(&self.db).await;
    }
}
