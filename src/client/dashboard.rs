//! Disease Backend REST Client
//!
//! HTTP client for the upstream disease dashboard API
//! (`/dashboard/trends`, `/dashboard/summary`, `/diseases`, `/categories`).

use reqwest::Client;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::ClientError;
use crate::trends::DiseaseTrends;

/// Configuration for the upstream client
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL including the API prefix (e.g., "http://localhost:8080/api/v1")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    /// Base delay between attempts, grows quadratically
    pub retry_backoff_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            request_timeout_ms: 30_000,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

/// Sort direction for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sort order: {}", other)),
        }
    }
}

/// Query parameters for `GET /diseases`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl DiseaseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    /// Query string pairs, omitting unset and blank values
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if let Some(sort_by) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            params.push(("sortBy", sort_by.to_string()));
        }
        if let Some(order) = self.sort_order {
            params.push(("sortOrder", order.to_string()));
        }
        params
    }
}

/// Disease record from `GET /diseases`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub quarter: u8,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub cases: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub recoveries: u64,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub incidence_rate: f64,
    #[serde(default)]
    pub mortality_rate: f64,
}

/// Disease category from `GET /categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// Aggregate statistics from `GET /dashboard/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_cases: u64,
    #[serde(default)]
    pub total_deaths: u64,
    #[serde(default)]
    pub total_recoveries: u64,
    #[serde(default)]
    pub average_rate: f64,
    #[serde(default)]
    pub trend_direction: String,
    #[serde(default)]
    pub change_percent: f64,
}

/// The summary endpoint wraps its body when scoped to one disease
#[derive(Deserialize)]
#[serde(untagged)]
enum SummaryEnvelope {
    Scoped { summary: DashboardSummary },
    Plain(DashboardSummary),
}

/// REST client for the disease backend
pub struct DashboardClient {
    client: Client,
    config: UpstreamConfig,
}

impl DashboardClient {
    /// Create a new client with the given configuration
    pub fn new(config: UpstreamConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET /dashboard/trends
    pub async fn get_trends(&self) -> Result<DiseaseTrends, ClientError> {
        self.get_json("/dashboard/trends", &[]).await
    }

    /// GET /dashboard/summary, optionally scoped to one disease
    pub async fn get_summary(&self, disease_id: Option<&str>) -> Result<DashboardSummary, ClientError> {
        let params: Vec<(&str, String)> = disease_id
            .map(|id| vec![("diseaseID", id.to_string())])
            .unwrap_or_default();

        let envelope: SummaryEnvelope = self.get_json("/dashboard/summary", &params).await?;
        Ok(match envelope {
            SummaryEnvelope::Scoped { summary } => summary,
            SummaryEnvelope::Plain(summary) => summary,
        })
    }

    /// GET /diseases
    pub async fn list_diseases(&self, query: &DiseaseQuery) -> Result<Vec<Disease>, ClientError> {
        self.get_json("/diseases", &query.to_params()).await
    }

    /// GET /diseases/{id}
    pub async fn get_disease(&self, id: &str) -> Result<Disease, ClientError> {
        self.get_json(&format!("/diseases/{}", id), &[]).await
    }

    /// GET /categories
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get_json("/categories", &[]).await
    }

    /// GET /categories/{id}
    pub async fn get_category(&self, id: &str) -> Result<Category, ClientError> {
        self.get_json(&format!("/categories/{}", id), &[]).await
    }

    /// GET /categories/{id}/diseases
    pub async fn category_diseases(&self, id: &str) -> Result<Vec<Disease>, ClientError> {
        self.get_json(&format!("/categories/{}/diseases", id), &[]).await
    }

    /// Quadratic backoff before the given attempt, saturating on large settings
    fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = u64::from(attempt).saturating_pow(2);
        Duration::from_millis(self.config.retry_backoff_ms.saturating_mul(factor))
    }

    /// GET with retry on transient failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let attempts = self.config.max_retries.saturating_add(1);
        let mut last_error = ClientError::Network("no attempt made".to_string());

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry_delay(attempt)).await;
            }

            match self.fetch_once(&url, params).await {
                Ok(body) => return Ok(body),
                Err(e) if e.kind().is_transient() => {
                    tracing::warn!(url = %url, attempt, error = %e, "Upstream request failed");
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    async fn fetch_once<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::from_response(status.as_u16(), &text))
        }
    }
}

/// The Go backend sends string IDs, older deployments send numbers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
