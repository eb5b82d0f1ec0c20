/// Reels Feed - service entry point
use anyhow::Context;
use reels_feed::{
    config::{LogFormat, ServerConfig, DEFAULT_LOG_FILTER},
    server, AppContext,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the format can be chosen
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    init_tracing(&config.logging.level, config.logging.format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.storage.database_location.display(),
        "Starting reels feed"
    );

    let ctx = AppContext::new(config)
        .await
        .context("Failed to initialize application context")?;

    server::serve(ctx).await.context("Server failed")?;

    Ok(())
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
