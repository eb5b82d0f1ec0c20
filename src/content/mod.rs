/// Content Store
///
/// Publishable items owned by the ingestion pipeline. The feed core only
/// reads them, always through the eligibility predicate
/// (active, public, not deleted, allowed content type).

pub mod models;
pub mod store;

pub use models::*;
pub use store::SqliteContentStore;

use crate::{error::FeedResult, validation::ContentId};
use async_trait::async_trait;

/// Read access to eligible content
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// One page of eligible items, newest first (`created_on` desc, then `id` asc)
    async fn list_eligible(&self, offset: i64, limit: i64) -> FeedResult<Vec<ContentItem>>;

    /// A single item, `None` when absent or not eligible
    async fn get_eligible(&self, id: &ContentId) -> FeedResult<Option<ContentItem>>;
}
