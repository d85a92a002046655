//! epitrends API Server
//!
//! Run with: cargo run --bin epitrends-api
//!
//! # Configuration
//!
//! Read from the first existing config file (see `Config::default_paths`),
//! or the path in `EPITRENDS_CONFIG`. `EPITRENDS_*` environment variables
//! override file values; `RUST_LOG` overrides the log filter.

use epitrends::api::{serve, AppState};
use epitrends::config::{Config, LoggingConfig};
use epitrends::source::{StaticSource, TrendSource, UpstreamSource};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("EPITRENDS_CONFIG") {
        Ok(path) => Config::load_with_env(Path::new(&path))?,
        Err(_) => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting epitrends API server v{}", env!("CARGO_PKG_VERSION"));

    let source = build_source(&config)?;
    tracing::info!(source = %source.describe(), "Trend source configured");

    // Warm the cache; a failing backend is reported by /health/ready
    match source.trends().await {
        Ok(trends) => tracing::info!(points = trends.len(), "Initial trends loaded"),
        Err(e) => tracing::warn!(error = %e, "Initial trends fetch failed"),
    }

    let state = AppState::new(source, config.api.clone());
    serve(state, &config.api).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_source(config: &Config) -> Result<Arc<dyn TrendSource>, Box<dyn std::error::Error>> {
    let source: Arc<dyn TrendSource> = match &config.upstream.dataset {
        Some(path) if is_json(path) => Arc::new(StaticSource::from_json(path)?),
        Some(path) => Arc::new(StaticSource::from_csv(path)?),
        None => Arc::new(UpstreamSource::new(
            config.upstream.client_config(),
            config.cache.stale_after(),
        )?),
    };
    Ok(source)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
