//! Point filtering by year range and quarter

use serde::{Deserialize, Serialize};

use super::error::{TrendsError, TrendsResult};
use super::types::TrendPoint;

/// Restricts points before aggregation
///
/// An empty filter keeps every point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendFilter {
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub quarters: Vec<u8>,
}

impl TrendFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_year(mut self, year: i32) -> Self {
        self.start_year = Some(year);
        self
    }

    pub fn end_year(mut self, year: i32) -> Self {
        self.end_year = Some(year);
        self
    }

    pub fn quarters(mut self, quarters: &[u8]) -> Self {
        self.quarters = quarters.to_vec();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.start_year.is_none() && self.end_year.is_none() && self.quarters.is_empty()
    }

    pub fn validate(&self) -> TrendsResult<()> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(TrendsError::InvalidYearRange { start, end });
            }
        }
        if let Some(q) = self.quarters.iter().find(|q| !(1..=4).contains(*q)) {
            return Err(TrendsError::InvalidQuarter(i64::from(*q)));
        }
        Ok(())
    }

    pub fn matches(&self, point: &TrendPoint) -> bool {
        self.start_year.map_or(true, |start| point.year >= start)
            && self.end_year.map_or(true, |end| point.year <= end)
            && (self.quarters.is_empty() || self.quarters.contains(&point.quarter))
    }

    /// Matching points, in input order
    pub fn apply(&self, points: &[TrendPoint]) -> Vec<TrendPoint> {
        points.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}
