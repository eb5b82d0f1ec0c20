/// Activity recording endpoint
use crate::{
    activity::ActivityRequest,
    api::rejected,
    context::AppContext,
    error::{FeedError, FeedResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::post,
    Router,
};
use serde::Serialize;

pub fn routes() -> Router<AppContext> {
    Router::new().route("/kisan/bytes/activities", post(record_activity))
}

/// Outcome of a recording request
#[derive(Debug, Serialize)]
pub struct RecordStatus {
    pub result: &'static str,
    pub message: String,
    pub id: String,
}

/// POST /api/media/kisan/bytes/activities
async fn record_activity(
    State(ctx): State<AppContext>,
    body: Result<Json<ActivityRequest>, JsonRejection>,
) -> FeedResult<Json<RecordStatus>> {
    let Json(request) = body
        .map_err(|e| FeedError::Validation(e.body_text()))
        .map_err(rejected("record_activity"))?;
    let guard = ctx.request_guard();

    let saved = ctx.recorder.record(request, &guard).await?;

    Ok(Json(RecordStatus {
        result: "Success",
        message: "Activity saved successfully".to_string(),
        id: saved.id,
    }))
}
