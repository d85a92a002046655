//! Disease Trends Aggregation & Correlation
//!
//! Pure, synchronous aggregations over trend points fetched from the
//! upstream dashboard backend:
//!
//! - [`metric`]: the metric vocabulary and per-point accessors
//! - [`bucket`]: yearly / quarterly time buckets
//! - [`selection`]: user selection and automatic top-N ranking
//! - [`series`]: label-aligned chart series
//! - [`correlation`]: Pearson correlation between two metrics
//! - [`heatmap`]: quarter x year grid with a color scale
//! - [`distribution`]: per-disease totals for pie/bar views
//! - [`summary`]: dashboard headline numbers
//!
//! Every entry point accepts a possibly-missing payload and degrades to an
//! empty output instead of failing.
//!
//! ```rust
//! use epitrends::trends::*;
//!
//! let trends = DiseaseTrends::new(vec![
//!     TrendPoint::new("Influenza", 2021, 1, 24000).mortality(0.4),
//!     TrendPoint::new("Influenza", 2021, 2, 18000).mortality(0.3),
//!     TrendPoint::new("Measles", 2021, 1, 300).mortality(0.1),
//! ]);
//!
//! let chart = time_series_chart(Some(&trends), &SeriesOptions::default());
//! assert_eq!(chart.labels, vec!["2021-Q1", "2021-Q2"]);
//! assert_eq!(chart.datasets[0].label, "Influenza");
//!
//! let scatter = scatter_chart(Some(&trends), Metric::Cases, Metric::MortalityRate);
//! assert!(scatter.correlation > 0.0);
//! ```

pub mod bucket;
pub mod correlation;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod heatmap;
pub mod metric;
pub mod selection;
pub mod series;
pub mod summary;
pub mod types;

pub use bucket::{bucket_points, BucketKey, Buckets, Granularity};
pub use correlation::{
    correlate, correlation_pairs, pearson_correlation, scatter_chart, Correlation,
    CorrelationPair, Direction, ScatterData, ScatterDataset, Strength,
};
pub use distribution::{distribution, distribution_chart, NameValue, DEFAULT_DISTRIBUTION_LIMIT};
pub use error::{TrendsError, TrendsResult};
pub use filter::TrendFilter;
pub use heatmap::{heat_map, HeatCell, HeatMap, Rgb, QUARTERS};
pub use metric::Metric;
pub use selection::{
    disease_names, metric_totals, search_diseases, select_diseases, select_top_n, Selection,
    DEFAULT_TOP_N,
};
pub use series::{build_series, time_series_chart, ChartData, ChartDataset, SeriesOptions};
pub use summary::{summarize, TopDisease, TrendDirection, TrendSummary};
pub use types::{points_of, DiseaseTrends, TrendPoint};
