//! Trends error types
//!
//! Errors raised while interpreting user-facing selectors (metric keys,
//! granularities, filters). Aggregation itself never fails: missing or
//! degenerate data degrades to neutral outputs instead.

use thiserror::Error;

/// Errors that can occur when parsing trends selectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendsError {
    /// Metric key is not part of the metric vocabulary
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Granularity is neither yearly nor quarterly
    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),

    /// Year filter where start comes after end
    #[error("Invalid year range: start {start} is after end {end}")]
    InvalidYearRange { start: i32, end: i32 },

    /// Quarter outside 1..=4
    #[error("Invalid quarter: {0}")]
    InvalidQuarter(i64),
}

/// Result type for trends operations
pub type TrendsResult<T> = Result<T, TrendsError>;
