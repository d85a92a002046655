//! API Routes
//!
//! Route handlers organized by functionality.

pub mod diseases;
pub mod health;
pub mod trends;

use axum::extract::{rejection::QueryRejection, Query};

use crate::api::error::{ApiError, ApiResult};

/// Unwrap query parameters, reporting malformed ones in the API error format
pub(crate) fn params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::Validation(e.body_text()))
}
