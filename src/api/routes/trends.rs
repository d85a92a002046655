//! Trend Routes
//!
//! Aggregated views over the current trend points.
//!
//! - GET /api/v1/trends/points - Raw points, optionally filtered
//! - GET /api/v1/trends/series - Time series per disease
//! - GET /api/v1/trends/correlation - Scatter data and Pearson coefficient
//! - GET /api/v1/trends/heatmap - Quarter x year grid
//! - GET /api/v1/trends/distribution - Top diseases by metric total
//! - GET /api/v1/trends/summary - Dashboard summary
//! - POST /api/v1/trends/refresh - Drop cached data and refetch

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use super::params;
use crate::api::dto::{
    parse_metric, CorrelationParams, CorrelationResponse, DistributionParams, FilterParams,
    HeatMapResponse, MetricParams, RefreshResponse, SeriesParams,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::trends::{
    correlate, distribution, heat_map, summarize, time_series_chart, ChartData, DiseaseTrends,
    Metric, NameValue, TrendSummary, DEFAULT_DISTRIBUTION_LIMIT,
};

/// GET /api/v1/trends/points
pub async fn get_points(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> ApiResult<Json<DiseaseTrends>> {
    let filter = params(query)?.to_filter()?;
    let trends = state.source.trends().await?;

    if filter.is_empty() {
        return Ok(Json(trends.as_ref().clone()));
    }
    Ok(Json(DiseaseTrends::new(filter.apply(&trends.points))))
}

/// GET /api/v1/trends/series
///
/// Without `diseases`, the top five diseases by metric total are charted.
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeriesParams>, QueryRejection>,
) -> ApiResult<Json<ChartData>> {
    let options = params(query)?.to_options()?;
    let trends = state.source.trends().await?;

    Ok(Json(time_series_chart(Some(trends.as_ref()), &options)))
}

/// GET /api/v1/trends/correlation
///
/// Defaults to cases against mortality rate. Points missing either metric
/// are left out of the sample.
pub async fn get_correlation(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CorrelationParams>, QueryRejection>,
) -> ApiResult<Json<CorrelationResponse>> {
    let (x, y) = params(query)?.axes()?;
    let trends = state.source.trends().await?;

    let correlation = correlate(&trends.points, x, y);
    tracing::debug!(
        x = %x,
        y = %y,
        coefficient = correlation.coefficient,
        samples = correlation.sample_size,
        "Computed correlation"
    );
    Ok(Json(correlation.into()))
}

/// GET /api/v1/trends/heatmap
pub async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MetricParams>, QueryRejection>,
) -> ApiResult<Json<HeatMapResponse>> {
    let metric = parse_metric(params(query)?.metric.as_deref(), Metric::Cases)?;
    let trends = state.source.trends().await?;

    Ok(Json(heat_map(Some(trends.as_ref()), metric).into()))
}

/// GET /api/v1/trends/distribution
pub async fn get_distribution(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DistributionParams>, QueryRejection>,
) -> ApiResult<Json<Vec<NameValue>>> {
    let params = params(query)?;
    let metric = parse_metric(params.metric.as_deref(), Metric::Cases)?;
    let limit = params.limit.unwrap_or(DEFAULT_DISTRIBUTION_LIMIT);
    let trends = state.source.trends().await?;

    Ok(Json(distribution(&trends.points, metric, limit)))
}

/// GET /api/v1/trends/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> ApiResult<Json<TrendSummary>> {
    let filter = params(query)?.to_filter()?;
    let trends = state.source.trends().await?;

    Ok(Json(summarize(&filter.apply(&trends.points))))
}

/// POST /api/v1/trends/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshResponse>> {
    state.source.refresh().await;
    let trends = state.source.trends().await?;

    tracing::info!(source = %state.source.describe(), points = trends.len(), "Trends refreshed");

    Ok(Json(RefreshResponse {
        status: "ok".to_string(),
        source: state.source.describe(),
        points: trends.len(),
    }))
}
