/// API routes and handlers
pub mod activity;
pub mod comments;
pub mod feed;
pub mod health;
pub mod middleware;

use crate::{context::AppContext, error::FeedError};
use axum::Router;
use tracing::warn;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    let media = Router::new()
        .merge(feed::routes())
        .merge(activity::routes())
        .merge(comments::routes());

    Router::new()
        .nest("/api/media", media)
        .merge(health::routes())
}

/// Log a request rejected at the boundary, passing the error through
pub(crate) fn rejected(operation: &'static str) -> impl Fn(FeedError) -> FeedError {
    move |e| {
        warn!(operation, error = %e, "Request rejected");
        e
    }
}
