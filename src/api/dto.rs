//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::trends::{
    Correlation, Direction, Granularity, HeatMap, Metric, ScatterData, Selection, SeriesOptions,
    Strength, TrendFilter, TrendsError,
};

/// Parse an optional metric key, falling back to `default` when absent
pub fn parse_metric(raw: Option<&str>, default: Metric) -> Result<Metric, TrendsError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(key) => key.parse(),
        None => Ok(default),
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ============================================
// TRENDS DTOs
// ============================================

/// Year/quarter restriction shared by the trends endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    /// Comma-separated quarters, e.g. "1,2"
    #[serde(default)]
    pub quarters: Option<String>,
}

impl FilterParams {
    pub fn to_filter(&self) -> Result<TrendFilter, ApiError> {
        let quarters = split_list(self.quarters.as_deref())
            .map(|q| {
                q.parse::<i64>()
                    .map_err(|_| ApiError::Validation(format!("quarter is not a number: {}", q)))
                    .and_then(|q| {
                        u8::try_from(q)
                            .ok()
                            .filter(|q| (1..=4).contains(q))
                            .ok_or(ApiError::Trends(TrendsError::InvalidQuarter(q)))
                    })
            })
            .collect::<Result<Vec<u8>, ApiError>>()?;

        let filter = TrendFilter {
            start_year: self.start_year,
            end_year: self.end_year,
            quarters,
        };
        filter.validate()?;
        Ok(filter)
    }
}

/// Query for GET /trends/series
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesParams {
    #[serde(default)]
    pub granularity: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    /// Comma-separated disease names; empty selects the top diseases
    #[serde(default)]
    pub diseases: Option<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub quarters: Option<String>,
}

impl SeriesParams {
    pub fn to_options(&self) -> Result<SeriesOptions, ApiError> {
        let granularity = match self.granularity.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse::<Granularity>()?,
            _ => Granularity::default(),
        };

        let filter = FilterParams {
            start_year: self.start_year,
            end_year: self.end_year,
            quarters: self.quarters.clone(),
        }
        .to_filter()?;

        Ok(SeriesOptions {
            granularity,
            metric: parse_metric(self.metric.as_deref(), Metric::Cases)?,
            selection: Selection::from_names(split_list(self.diseases.as_deref())),
            filter,
        })
    }
}

/// Query for GET /trends/correlation
#[derive(Debug, Default, Deserialize)]
pub struct CorrelationParams {
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
}

impl CorrelationParams {
    /// Axes, defaulting to cases against mortality rate
    pub fn axes(&self) -> Result<(Metric, Metric), TrendsError> {
        Ok((
            parse_metric(self.x.as_deref(), Metric::Cases)?,
            parse_metric(self.y.as_deref(), Metric::MortalityRate)?,
        ))
    }
}

/// Scatter data plus the qualitative reading of the coefficient
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResponse {
    #[serde(flatten)]
    pub scatter: ScatterData,
    pub strength: Strength,
    pub direction: Direction,
    pub sample_size: usize,
    /// e.g. "0.82 (Strong positive correlation)"
    pub description: String,
}

impl From<Correlation> for CorrelationResponse {
    fn from(correlation: Correlation) -> Self {
        Self {
            strength: correlation.strength,
            direction: correlation.direction,
            sample_size: correlation.sample_size,
            description: correlation.to_string(),
            scatter: correlation.into(),
        }
    }
}

/// Query carrying only a metric
#[derive(Debug, Default, Deserialize)]
pub struct MetricParams {
    #[serde(default)]
    pub metric: Option<String>,
}

/// Query for GET /trends/distribution
#[derive(Debug, Default, Deserialize)]
pub struct DistributionParams {
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One rendered heat-map cell
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatCellDto {
    pub year: i32,
    pub quarter: u8,
    pub value: f64,
    pub color: String,
    pub text_color: &'static str,
}

/// Heat map with colours resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatMapResponse {
    pub metric: Metric,
    pub years: Vec<i32>,
    pub rows: Vec<Vec<HeatCellDto>>,
    pub max_value: f64,
}

impl From<HeatMap> for HeatMapResponse {
    fn from(map: HeatMap) -> Self {
        let rows = map
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| HeatCellDto {
                        year: cell.year,
                        quarter: cell.quarter,
                        value: cell.value,
                        color: map.color(cell.value).to_string(),
                        text_color: map.text_color(cell.value),
                    })
                    .collect()
            })
            .collect();

        Self {
            metric: map.metric,
            years: map.years,
            rows,
            max_value: map.max_value,
        }
    }
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    pub source: String,
    pub points: usize,
}

// ============================================
// DISEASE DTOs
// ============================================

/// Query for GET /diseases/names
#[derive(Debug, Default, Deserialize)]
pub struct NamesParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// Disease names response
#[derive(Debug, Serialize)]
pub struct NamesResponse {
    pub names: Vec<String>,
    pub total: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Data source description
    pub source: String,
    /// Data source status: "ok" or "error"
    pub source_status: String,
    /// Points currently available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<usize>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
