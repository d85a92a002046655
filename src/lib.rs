//! # epitrends
//!
//! Disease trends analytics: turns per-quarter disease observations into
//! chart-ready time series, metric correlations, quarter x year heat maps and
//! dashboard summaries.
//!
//! ## Modules
//!
//! - [`trends`]: Pure aggregation over trend points
//! - [`client`]: REST client and query cache for the disease backend
//! - [`source`]: Where trend points come from (backend or local file)
//! - [`import`]: CSV and JSON dataset loading
//! - [`store`]: Reducer store for dashboard UI state (toasts, theme)
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use epitrends::trends::*;
//!
//! let data = DiseaseTrends::new(vec![
//!     TrendPoint::new("Influenza", 2023, 1, 1200).mortality(0.4),
//!     TrendPoint::new("Influenza", 2023, 2, 900).mortality(0.3),
//!     TrendPoint::new("Measles", 2023, 1, 40).mortality(0.1),
//! ]);
//!
//! let chart = time_series_chart(Some(&data), &SeriesOptions::default());
//! assert_eq!(chart.labels, vec!["2023-Q1", "2023-Q2"]);
//!
//! let correlation = correlate(&data.points, Metric::Cases, Metric::MortalityRate);
//! println!("{}", correlation);
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod import;
pub mod source;
pub mod store;
pub mod trends;

// Re-export top-level types for convenience
pub use trends::{
    ChartData, Correlation, DiseaseTrends, Granularity, HeatMap, Metric, Selection,
    SeriesOptions, TrendFilter, TrendPoint, TrendSummary, TrendsError,
};

pub use client::{ClientError, DashboardClient, ErrorKind, QueryCache, UpstreamConfig};

pub use source::{StaticSource, TrendSource, UpstreamSource};

pub use import::{CsvImporter, ImportError};

pub use store::{AppStore, Store, Theme, Toast};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};
