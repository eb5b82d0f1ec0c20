/// Unified error types for the reels feed service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the feed service
#[derive(Error, Debug)]
pub enum FeedError {
    /// Malformed or missing input, rejected before any storage access
    #[error("Validation error: {0}")]
    Validation(String),

    /// Valid identifier with no matching eligible document
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backing store failure (connection, query)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A storage leg exceeded its deadline
    #[error("Storage operation timed out: {operation}")]
    StorageTimeout { operation: &'static str },

    /// The caller went away while a storage leg was in flight
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: &'static str },

    /// Stored JSON columns that no longer decode
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FeedError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeedError::Validation(_) => StatusCode::BAD_REQUEST,
            FeedError::NotFound(_) => StatusCode::NOT_FOUND,
            FeedError::Database(_)
            | FeedError::StorageTimeout { .. }
            | FeedError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            FeedError::Serialization(_) | FeedError::Io(_) | FeedError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error body returned on every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            FeedError::Validation(_) | FeedError::NotFound(_) => self.to_string(),
            FeedError::StorageTimeout { .. } | FeedError::Cancelled { .. } => {
                "Storage temporarily unavailable".to_string()
            }
            FeedError::Database(_) => "Storage unavailable".to_string(),
            // Don't leak details
            _ => "Internal server error".to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
