//! Core trend data types
//!
//! `TrendPoint` is one (disease, year, quarter) observation as returned by
//! the upstream `/dashboard/trends` endpoint.

use serde::{Deserialize, Serialize};

/// A single disease observation for one quarter
///
/// Rates are optional: the upstream time-series endpoint only guarantees
/// `cases`, and older exports omit the rate columns entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Calendar year
    pub year: i32,
    /// Quarter of the year (1-4)
    pub quarter: u8,
    /// Disease name, the identity of a series
    pub name: String,
    /// Reported case count
    pub cases: u64,
    /// Incidence rate (per 100k)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incidence_rate: Option<f64>,
    /// Mortality rate (percent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mortality_rate: Option<f64>,
    /// Recovery rate (percent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_rate: Option<f64>,
}

impl TrendPoint {
    /// Create a point with cases only
    pub fn new(name: impl Into<String>, year: i32, quarter: u8, cases: u64) -> Self {
        Self {
            year,
            quarter,
            name: name.into(),
            cases,
            incidence_rate: None,
            mortality_rate: None,
            recovery_rate: None,
        }
    }

    /// Set the incidence rate (builder pattern)
    pub fn incidence(mut self, rate: f64) -> Self {
        self.incidence_rate = Some(rate);
        self
    }

    /// Set the mortality rate (builder pattern)
    pub fn mortality(mut self, rate: f64) -> Self {
        self.mortality_rate = Some(rate);
        self
    }

    /// Set the recovery rate (builder pattern)
    pub fn recovery(mut self, rate: f64) -> Self {
        self.recovery_rate = Some(rate);
        self
    }

    /// Whether the quarter is within 1..=4
    pub fn has_valid_quarter(&self) -> bool {
        (1..=4).contains(&self.quarter)
    }
}

/// Trends payload from `GET /dashboard/trends`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseTrends {
    #[serde(default)]
    pub points: Vec<TrendPoint>,
}

impl DiseaseTrends {
    pub fn new(points: Vec<TrendPoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Points of a possibly-missing payload
///
/// Views receive `Option<&DiseaseTrends>` while a fetch is pending or failed;
/// both cases read as "no points".
pub fn points_of(data: Option<&DiseaseTrends>) -> &[TrendPoint] {
    data.map(|d| d.points.as_slice()).unwrap_or(&[])
}
