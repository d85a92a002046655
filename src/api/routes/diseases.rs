//! Disease Routes
//!
//! - GET /api/v1/diseases/names - Unique disease names, optionally searched

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use super::params;
use crate::api::dto::{NamesParams, NamesResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::trends::{disease_names, search_diseases};

/// GET /api/v1/diseases/names
///
/// Names are sorted alphabetically; `search` is a case-insensitive substring.
pub async fn list_names(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NamesParams>, QueryRejection>,
) -> ApiResult<Json<NamesResponse>> {
    let params = params(query)?;
    let trends = state.source.trends().await?;
    let all = disease_names(&trends.points);

    let names: Vec<String> = match params.search.as_deref() {
        Some(search) => search_diseases(&all, search).into_iter().cloned().collect(),
        None => all,
    };

    Ok(Json(NamesResponse {
        total: names.len(),
        names,
    }))
}
