/// Reels Feed
///
/// Read-model service for a short-video feed: paginated content enriched
/// with live engagement state per viewer, item lookup, activity recording
/// and comment threads with denormalized authors.
pub mod activity;
pub mod api;
pub mod comments;
pub mod config;
pub mod content;
pub mod context;
pub mod db;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod guard;
pub mod metrics;
pub mod profile;
pub mod server;
pub mod validation;

pub use config::ServerConfig;
pub use context::AppContext;
pub use error::{FeedError, FeedResult};
