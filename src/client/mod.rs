//! Upstream Disease Backend Integration
//!
//! REST client for the disease dashboard API plus a keyed response cache.

pub mod cache;
pub mod dashboard;
pub mod error;

pub use cache::QueryCache;
pub use dashboard::{
    Category, DashboardClient, DashboardSummary, Disease, DiseaseQuery, SortOrder,
    UpstreamConfig,
};
pub use error::{extract_message, ClientError, ErrorKind};
