//! Correlation Calculator
//!
//! Pearson correlation between two metrics, paired within each trend point.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metric::Metric;
use super::types::{points_of, DiseaseTrends, TrendPoint};

/// One scatter point: two metrics of the same observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub x: f64,
    pub y: f64,
    /// Disease name
    pub label: String,
}

/// Qualitative strength of a coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
    #[serde(rename = "Very weak")]
    VeryWeak,
}

impl Strength {
    pub fn of(r: f64) -> Self {
        let abs_r = r.abs();
        if abs_r >= 0.7 {
            Strength::Strong
        } else if abs_r >= 0.5 {
            Strength::Moderate
        } else if abs_r >= 0.3 {
            Strength::Weak
        } else {
            Strength::VeryWeak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strength::Strong => "Strong",
            Strength::Moderate => "Moderate",
            Strength::Weak => "Weak",
            Strength::VeryWeak => "Very weak",
        }
    }
}

/// Sign of a coefficient; zero counts as positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn of(r: f64) -> Self {
        if r >= 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Positive => "positive",
            Direction::Negative => "negative",
        }
    }
}

/// Correlation between two metrics over a point set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub x_metric: Metric,
    pub y_metric: Metric,
    /// Pearson coefficient in [-1, 1]; 0 when either axis has no variance
    pub coefficient: f64,
    pub strength: Strength,
    pub direction: Direction,
    /// Number of pairs used
    pub sample_size: usize,
    pub pairs: Vec<CorrelationPair>,
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} ({} {} correlation)",
            self.coefficient,
            self.strength.label(),
            self.direction.label()
        )
    }
}

/// Scatter dataset for the correlation view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterDataset {
    pub label: String,
    pub data: Vec<CorrelationPair>,
}

/// Scatter chart payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub datasets: Vec<ScatterDataset>,
    pub correlation: f64,
}

/// Pair two metrics per point, dropping points where either is absent or
/// not finite
pub fn correlation_pairs(points: &[TrendPoint], x: Metric, y: Metric) -> Vec<CorrelationPair> {
    points
        .iter()
        .filter_map(|point| {
            let xv = x.observed(point).filter(|v| v.is_finite())?;
            let yv = y.observed(point).filter(|v| v.is_finite())?;
            Some(CorrelationPair {
                x: xv,
                y: yv,
                label: point.name.clone(),
            })
        })
        .collect()
}

/// Correlate two metrics across all usable points
pub fn correlate(points: &[TrendPoint], x: Metric, y: Metric) -> Correlation {
    let pairs = correlation_pairs(points, x, y);
    let xs: Vec<f64> = pairs.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.y).collect();
    let r = pearson_correlation(&xs, &ys);

    Correlation {
        x_metric: x,
        y_metric: y,
        coefficient: r,
        strength: Strength::of(r),
        direction: Direction::of(r),
        sample_size: pairs.len(),
        pairs,
    }
}

impl From<Correlation> for ScatterData {
    fn from(correlation: Correlation) -> Self {
        ScatterData {
            datasets: vec![ScatterDataset {
                label: format!(
                    "{} vs {}",
                    correlation.x_metric.label(),
                    correlation.y_metric.label()
                ),
                data: correlation.pairs,
            }],
            correlation: correlation.coefficient,
        }
    }
}

/// Scatter chart for a possibly-missing payload
pub fn scatter_chart(data: Option<&DiseaseTrends>, x: Metric, y: Metric) -> ScatterData {
    correlate(points_of(data), x, y).into()
}

/// Calculate Pearson correlation coefficient
///
/// Returns a value between -1 and 1:
/// - 1: perfect positive correlation
/// - 0: no correlation, or either series has zero variance
/// - -1: perfect negative correlation
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

    // Rounding can leave a tiny negative variance, which sqrt turns into NaN
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        (numerator / denominator).clamp(-1.0, 1.0)
    }
}
