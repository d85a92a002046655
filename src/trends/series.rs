//! Series builder
//!
//! Produces the line/bar chart payload: one label per bucket and one dataset
//! per selected disease, every dataset aligned with the labels.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::bucket::{bucket_points, Buckets, Granularity};
use super::filter::TrendFilter;
use super::metric::Metric;
use super::selection::{select_diseases, Selection};
use super::types::{points_of, DiseaseTrends, TrendPoint};

/// One chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    /// Disease name
    pub label: String,
    /// One value per bucket label
    pub data: Vec<f64>,
}

impl ChartDataset {
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Line/bar chart payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Everything the trends chart reacts to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesOptions {
    pub granularity: Granularity,
    pub metric: Metric,
    pub selection: Selection,
    pub filter: TrendFilter,
}

/// Sum the metric per (disease, bucket)
///
/// `buckets` must come from bucketing the same `points` slice. Datasets are
/// emitted in `diseases` order; cells without a matching point are 0.
pub fn build_series(
    points: &[TrendPoint],
    buckets: &Buckets,
    diseases: &[String],
    metric: Metric,
) -> Vec<ChartDataset> {
    let rows: HashMap<&str, usize> = diseases
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut matrix = vec![vec![0.0; buckets.len()]; diseases.len()];

    for (i, point) in points.iter().enumerate() {
        let Some(&row) = rows.get(point.name.as_str()) else {
            continue;
        };
        if let Some(col) = buckets.bucket_of(i) {
            matrix[row][col] += metric.value(point);
        }
    }

    diseases
        .iter()
        .zip(matrix)
        .map(|(name, data)| ChartDataset {
            label: name.clone(),
            data,
        })
        .collect()
}

/// Full pipeline: filter, bucket, select, build
pub fn time_series_chart(data: Option<&DiseaseTrends>, options: &SeriesOptions) -> ChartData {
    let points = options.filter.apply(points_of(data));
    if points.is_empty() {
        return ChartData::default();
    }

    let buckets = bucket_points(&points, options.granularity);
    let diseases = select_diseases(&points, options.metric, &options.selection);
    let datasets = build_series(&points, &buckets, &diseases, options.metric);

    tracing::debug!(
        points = points.len(),
        buckets = buckets.len(),
        series = datasets.len(),
        metric = %options.metric,
        "Built time series chart"
    );

    ChartData {
        labels: buckets.labels(),
        datasets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends::heatmap::HeatMap;
    use crate::trends::selection::metric_totals;

    fn sample() -> DiseaseTrends {
        DiseaseTrends::new(vec![
            TrendPoint::new("Influenza", 2020, 1, 15000).incidence(12.5),
            TrendPoint::new("Influenza", 2020, 2, 12000).incidence(10.0),
            TrendPoint::new("Influenza", 2021, 1, 24000),
            TrendPoint::new("Measles", 2020, 2, 300).incidence(0.4),
            TrendPoint::new("Measles", 2020, 2, 200).incidence(0.1),
            TrendPoint::new("Cholera", 2021, 1, 50),
        ])
    }

    #[test]
    fn test_quarterly_series_aligned_with_labels() {
        let chart = time_series_chart(Some(&sample()), &SeriesOptions::default());

        assert_eq!(chart.labels, vec!["2020-Q1", "2020-Q2", "2021-Q1"]);
        assert_eq!(chart.datasets.len(), 3);
        for dataset in &chart.datasets {
            assert_eq!(dataset.data.len(), chart.labels.len());
            assert!(dataset.data.iter().all(|v| v.is_finite() && *v >= 0.0));
        }

        assert_eq!(chart.datasets[0].label, "Influenza");
        assert_eq!(chart.datasets[0].data, vec![15000.0, 12000.0, 24000.0]);
        assert_eq!(chart.datasets[1].label, "Measles");
        assert_eq!(chart.datasets[1].data, vec![0.0, 500.0, 0.0]);
        assert_eq!(chart.datasets[2].label, "Cholera");
        assert_eq!(chart.datasets[2].data, vec![0.0, 0.0, 50.0]);
    }

    #[test]
    fn test_yearly_series() {
        let options = SeriesOptions {
            granularity: Granularity::Yearly,
            ..Default::default()
        };
        let chart = time_series_chart(Some(&sample()), &options);

        assert_eq!(chart.labels, vec!["2020", "2021"]);
        assert_eq!(chart.datasets[0].data, vec![27000.0, 24000.0]);
    }

    #[test]
    fn test_rate_metric_treats_missing_as_zero() {
        let options = SeriesOptions {
            metric: Metric::IncidenceRate,
            selection: Selection::from_names(["Influenza"]),
            ..Default::default()
        };
        let chart = time_series_chart(Some(&sample()), &options);

        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].data, vec![12.5, 10.0, 0.0]);
    }

    #[test]
    fn test_filter_applies_before_bucketing() {
        let options = SeriesOptions {
            filter: TrendFilter::new().start_year(2021),
            ..Default::default()
        };
        let chart = time_series_chart(Some(&sample()), &options);

        assert_eq!(chart.labels, vec!["2021-Q1"]);
        assert_eq!(chart.datasets.len(), 2);
    }

    #[test]
    fn test_missing_data_degrades_to_empty_chart() {
        assert_eq!(time_series_chart(None, &SeriesOptions::default()), ChartData::default());
        let empty = DiseaseTrends::default();
        assert!(time_series_chart(Some(&empty), &SeriesOptions::default()).is_empty());
    }

    #[test]
    fn test_invalid_quarters_left_out_like_heat_map() {
        let trends = DiseaseTrends::new(vec![
            TrendPoint::new("Influenza", 2020, 1, 100),
            TrendPoint::new("Influenza", 2020, 0, 900),
            TrendPoint::new("Influenza", 2022, 7, 900),
        ]);
        let chart = time_series_chart(Some(&trends), &SeriesOptions::default());
        let heatmap = HeatMap::build(&trends.points, Metric::Cases);

        assert_eq!(chart.labels, vec!["2020-Q1"]);
        assert_eq!(chart.datasets[0].data, vec![100.0]);
        assert_eq!(heatmap.years, vec![2020]);
        assert_eq!(heatmap.max_value, chart.datasets[0].total());
    }

    #[test]
    fn test_series_totals_match_ranking_totals() {
        let trends = sample();
        for metric in Metric::ALL {
            let options = SeriesOptions {
                metric,
                ..Default::default()
            };
            let chart = time_series_chart(Some(&trends), &options);
            let totals = metric_totals(&trends.points, metric);

            for dataset in &chart.datasets {
                let expected = totals[dataset.label.as_str()];
                assert!((dataset.total() - expected).abs() < 1e-9);
            }
        }
    }
}
