//! Dashboard summary computed from trend points

use serde::Serialize;

use super::bucket::{bucket_points, Granularity};
use super::metric::Metric;
use super::selection::{disease_names, select_diseases, Selection};
use super::types::TrendPoint;

/// Direction of the most recent quarter-over-quarter change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDisease {
    pub name: String,
    pub cases: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub total_cases: u64,
    pub total_diseases: usize,
    /// Mean incidence rate over points that report one
    pub average_incidence_rate: Option<f64>,
    pub trend_direction: TrendDirection,
    /// Change of total cases between the last two quarters, in percent
    pub change_percent: f64,
    pub top_diseases: Vec<TopDisease>,
}

/// Summarize a point set
pub fn summarize(points: &[TrendPoint]) -> TrendSummary {
    let total_cases = total_cases(points.iter());

    let rates: Vec<f64> = points
        .iter()
        .filter_map(|p| p.incidence_rate)
        .filter(|r| r.is_finite())
        .collect();
    let average_incidence_rate = if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    };

    let (change_percent, trend_direction) = latest_change(points);

    let top_diseases = select_diseases(points, Metric::Cases, &Selection::automatic())
        .into_iter()
        .map(|name| {
            let cases = self::total_cases(points.iter().filter(|p| p.name == name));
            TopDisease { name, cases }
        })
        .collect();

    TrendSummary {
        total_cases,
        total_diseases: disease_names(points).len(),
        average_incidence_rate,
        trend_direction,
        change_percent,
        top_diseases,
    }
}

/// Case total, saturating at `u64::MAX`
fn total_cases<'a>(points: impl Iterator<Item = &'a TrendPoint>) -> u64 {
    points.fold(0u64, |total, p| total.saturating_add(p.cases))
}

/// Percent change between the last two quarterly case totals
fn latest_change(points: &[TrendPoint]) -> (f64, TrendDirection) {
    let buckets = bucket_points(points, Granularity::Quarterly);
    if buckets.len() < 2 {
        return (0.0, TrendDirection::Stable);
    }

    let mut totals = vec![0u64; buckets.len()];
    for (i, point) in points.iter().enumerate() {
        if let Some(b) = buckets.bucket_of(i) {
            totals[b] += point.cases;
        }
    }

    let previous = totals[totals.len() - 2] as f64;
    let latest = totals[totals.len() - 1] as f64;
    if previous == 0.0 {
        return (0.0, TrendDirection::Stable);
    }

    let change = ((latest - previous) / previous * 100.0 * 100.0).round() / 100.0;
    let direction = if change > 0.0 {
        TrendDirection::Increasing
    } else if change < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };
    (change, direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let points = vec![
            TrendPoint::new("Influenza", 2021, 3, 14000).incidence(10.0),
            TrendPoint::new("Influenza", 2021, 4, 19000).incidence(20.0),
            TrendPoint::new("Measles", 2021, 4, 1000),
        ];
        let summary = summarize(&points);

        assert_eq!(summary.total_cases, 34000);
        assert_eq!(summary.total_diseases, 2);
        assert_eq!(summary.average_incidence_rate, Some(15.0));
        assert_eq!(summary.top_diseases[0], TopDisease { name: "Influenza".into(), cases: 33000 });
    }

    #[test]
    fn test_huge_case_counts_saturate() {
        let points = vec![
            TrendPoint::new("A", 2020, 4, u64::MAX),
            TrendPoint::new("A", 2021, 1, u64::MAX - 1),
            TrendPoint::new("A", 2021, 1, 5),
        ];
        let summary = summarize(&points);

        assert_eq!(summary.total_cases, u64::MAX);
        assert_eq!(summary.top_diseases[0].cases, u64::MAX);
        assert_eq!(summary.change_percent, 0.0);
        assert_eq!(summary.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn test_change_percent_between_last_two_quarters() {
        let points = vec![
            TrendPoint::new("A", 2020, 4, 100),
            TrendPoint::new("A", 2021, 1, 150),
        ];
        let summary = summarize(&points);
        assert_eq!(summary.change_percent, 50.0);
        assert_eq!(summary.trend_direction, TrendDirection::Increasing);

        let points = vec![
            TrendPoint::new("A", 2020, 4, 200),
            TrendPoint::new("A", 2021, 1, 150),
        ];
        let summary = summarize(&points);
        assert_eq!(summary.change_percent, -25.0);
        assert_eq!(summary.trend_direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_single_quarter_is_stable() {
        let summary = summarize(&[TrendPoint::new("A", 2020, 1, 5)]);
        assert_eq!(summary.change_percent, 0.0);
        assert_eq!(summary.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_cases, 0);
        assert_eq!(summary.average_incidence_rate, None);
        assert!(summary.top_diseases.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&summarize(&[])).unwrap();
        assert!(json.contains("\"totalCases\":0"));
        assert!(json.contains("\"trendDirection\":\"stable\""));
    }
}
