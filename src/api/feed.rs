/// Feed endpoints: the reels feed and single-item lookup
use crate::{
    api::{middleware::Viewer, rejected},
    context::AppContext,
    error::{FeedError, FeedResult},
    feed::EnrichedItem,
    validation::{ContentId, Page},
};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::info;

/// Build feed routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/kisan/bytes", get(list_feed))
        .route("/kisan/bytes/mediaid", get(get_media_by_id))
}

/// Raw paging parameters; parsed by `Page::parse` so bad input maps to 400
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page_num: Option<String>,
    pub page_size: Option<String>,
}

impl PageParams {
    pub fn page(&self, ctx: &AppContext) -> FeedResult<Page> {
        Page::parse(
            self.page_num.as_deref(),
            self.page_size.as_deref(),
            ctx.config.query.default_page_size,
            ctx.config.query.max_page_size,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaIdParams {
    pub media_id: Option<String>,
}

/// GET /api/media/kisan/bytes
async fn list_feed(
    State(ctx): State<AppContext>,
    viewer: Viewer,
    Query(params): Query<PageParams>,
) -> FeedResult<Json<Vec<EnrichedItem>>> {
    let page = params.page(&ctx).map_err(rejected("list_feed"))?;
    let guard = ctx.request_guard();

    let items = ctx.feed.list_feed(page, viewer.id(), &guard).await?;
    Ok(Json(items))
}

/// GET /api/media/kisan/bytes/mediaid
async fn get_media_by_id(
    State(ctx): State<AppContext>,
    viewer: Viewer,
    Query(params): Query<MediaIdParams>,
) -> FeedResult<Json<EnrichedItem>> {
    let id: ContentId = params
        .media_id
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(rejected("get_media_by_id"))?;
    let guard = ctx.request_guard();

    ctx.feed
        .get_by_id(&id, viewer.id(), &guard)
        .await?
        .map(Json)
        .ok_or_else(|| {
            info!(operation = "get_media_by_id", media_id = %id, "Media not found");
            FeedError::NotFound(format!("Media not found: {}", id))
        })
}
