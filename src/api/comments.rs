/// Comment listing endpoint
use crate::{
    activity::ActivityType,
    api::{feed::PageParams, rejected},
    comments::CommentView,
    context::AppContext,
    error::FeedResult,
    validation::ContentId,
};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

pub fn routes() -> Router<AppContext> {
    Router::new().route("/comments/by/mediaid", get(list_comments))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentParams {
    pub media_id: Option<String>,
    pub activity_type: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// GET /api/media/comments/by/mediaid
async fn list_comments(
    State(ctx): State<AppContext>,
    Query(params): Query<CommentParams>,
) -> FeedResult<Json<Vec<CommentView>>> {
    let reject = rejected("list_comments");
    let subject: ContentId = params
        .media_id
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(&reject)?;
    let activity_type = match params.activity_type.as_deref().map(str::trim) {
        None | Some("") => ActivityType::Comment,
        Some(raw) => ActivityType::from_str(raw).map_err(&reject)?,
    };
    let page = params.page.page(&ctx).map_err(&reject)?;
    let guard = ctx.request_guard();

    let comments = ctx
        .comments
        .list_comments(&subject, activity_type, page, &guard)
        .await?;
    Ok(Json(comments))
}
