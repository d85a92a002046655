//! Trend data sources
//!
//! The API server and CLI read points through [`TrendSource`], backed either
//! by a local dataset or by the upstream dashboard backend.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{ClientError, DashboardClient, QueryCache, UpstreamConfig};
use crate::import::{self, CsvImporter, ImportError};
use crate::trends::DiseaseTrends;

/// Cache key for the trends payload
pub const TRENDS_QUERY_KEY: &str = "dashboard/trends";

/// Anything that can produce the current trends payload
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Human-readable origin, for logs and health output
    fn describe(&self) -> String;

    /// Current trend points
    async fn trends(&self) -> Result<Arc<DiseaseTrends>, ClientError>;

    /// Drop cached data so the next read refetches
    async fn refresh(&self);
}

/// Fixed in-memory dataset
pub struct StaticSource {
    trends: Arc<DiseaseTrends>,
    origin: String,
}

impl StaticSource {
    pub fn new(trends: DiseaseTrends, origin: impl Into<String>) -> Self {
        Self {
            trends: Arc::new(trends),
            origin: origin.into(),
        }
    }

    /// Load from a CSV export; rejected rows are logged and skipped
    pub fn from_csv(path: &Path) -> Result<Self, ImportError> {
        let result = CsvImporter::new().import(path)?;
        for error in &result.errors {
            tracing::warn!(path = %path.display(), "{}", error);
        }
        Ok(Self::new(result.into_trends(), path.display().to_string()))
    }

    /// Load from a JSON snapshot
    pub fn from_json(path: &Path) -> Result<Self, ImportError> {
        let trends = import::load_json(path)?;
        Ok(Self::new(trends, path.display().to_string()))
    }
}

#[async_trait]
impl TrendSource for StaticSource {
    fn describe(&self) -> String {
        format!("file:{}", self.origin)
    }

    async fn trends(&self) -> Result<Arc<DiseaseTrends>, ClientError> {
        Ok(Arc::clone(&self.trends))
    }

    async fn refresh(&self) {}
}

/// Upstream backend with a stale-time cache in front of it
pub struct UpstreamSource {
    client: DashboardClient,
    cache: QueryCache<DiseaseTrends>,
}

impl UpstreamSource {
    pub fn new(config: UpstreamConfig, stale_after: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: DashboardClient::new(config)?,
            cache: QueryCache::new(stale_after),
        })
    }

    pub fn client(&self) -> &DashboardClient {
        &self.client
    }
}

#[async_trait]
impl TrendSource for UpstreamSource {
    fn describe(&self) -> String {
        format!("upstream:{}", self.client.config().base_url)
    }

    async fn trends(&self) -> Result<Arc<DiseaseTrends>, ClientError> {
        self.cache
            .get_or_fetch(TRENDS_QUERY_KEY, || self.client.get_trends())
            .await
    }

    async fn refresh(&self) {
        self.cache.invalidate(TRENDS_QUERY_KEY).await;
    }
}
