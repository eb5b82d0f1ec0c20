/// Request extractors shared by the media endpoints
use crate::{
    api::rejected,
    context::AppContext,
    error::{FeedError, FeedResult},
    validation::UserId,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

/// Header carrying the requesting viewer's id
pub const VIEWER_HEADER: &str = "userid";

/// Read the viewer id header; absent or blank means anonymous
pub fn extract_viewer_id(headers: &HeaderMap) -> FeedResult<Option<UserId>> {
    let Some(value) = headers.get(VIEWER_HEADER) else {
        return Ok(None);
    };

    let raw = value
        .to_str()
        .map_err(|_| FeedError::Validation("userId header is not valid text".to_string()))?;

    if raw.trim().is_empty() {
        return Ok(None);
    }

    raw.parse().map(Some)
}

/// The viewer a request is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer(pub Option<UserId>);

impl Viewer {
    pub fn id(&self) -> Option<&UserId> {
        self.0.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppContext> for Viewer {
    type Rejection = FeedError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        extract_viewer_id(&parts.headers)
            .map(Viewer)
            .map_err(rejected("extract_viewer"))
    }
}
