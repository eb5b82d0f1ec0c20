/// Configuration management for the reels feed service
use crate::error::{FeedError, FeedResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_location: PathBuf,
    pub max_connections: u32,
}

/// Query behaviour shared by the read services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Deadline applied to every storage leg, in milliseconds
    pub timeout_ms: u64,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// Filter used when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "reels_feed=info,tower_http=info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Parse a numeric variable; unset means `default`, malformed is an error
fn env_or<T: FromStr>(name: &str, default: T, what: &str) -> FeedResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| FeedError::Validation(format!("Invalid {} in {}: '{}'", what, name, raw))),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> FeedResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("FEED_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("FEED_PORT", 8080, "port number")?;
        let cors_origin = env::var("FEED_CORS_ORIGIN").ok().filter(|s| !s.is_empty());

        let database_location = env::var("FEED_DATABASE_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/feed.sqlite"));
        let max_connections = env_or("FEED_DB_MAX_CONNECTIONS", 10, "database max connections")?;

        let defaults = QueryConfig::default();
        let timeout_ms = env_or("FEED_QUERY_TIMEOUT_MS", defaults.timeout_ms, "query timeout")?;
        let default_page_size =
            env_or("FEED_DEFAULT_PAGE_SIZE", defaults.default_page_size, "default page size")?;
        let max_page_size = env_or("FEED_MAX_PAGE_SIZE", defaults.max_page_size, "max page size")?;

        let level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        let format = match env::var("FEED_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                cors_origin,
            },
            storage: StorageConfig {
                database_location,
                max_connections,
            },
            query: QueryConfig {
                timeout_ms,
                default_page_size,
                max_page_size,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> FeedResult<()> {
        if self.service.hostname.is_empty() {
            return Err(FeedError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.storage.max_connections == 0 {
            return Err(FeedError::Validation(
                "Database pool needs at least one connection".to_string(),
            ));
        }

        if self.query.timeout_ms == 0 {
            return Err(FeedError::Validation(
                "Query timeout must be greater than zero".to_string(),
            ));
        }

        if self.query.max_page_size == 0
            || self.query.default_page_size == 0
            || self.query.default_page_size > self.query.max_page_size
        {
            return Err(FeedError::Validation(format!(
                "Default page size {} must be within 1..={}",
                self.query.default_page_size, self.query.max_page_size
            )));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }
}
