//! Distribution of a metric across diseases (pie/bar views)

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::metric::Metric;
use super::types::{points_of, DiseaseTrends, TrendPoint};

/// Slices shown in the distribution chart
pub const DEFAULT_DISTRIBUTION_LIMIT: usize = 10;

/// One pie slice / bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameValue {
    pub name: String,
    pub value: f64,
}

/// Metric total per disease, largest first, truncated to `limit`
///
/// Equal totals keep the order in which diseases first appear.
pub fn distribution(points: &[TrendPoint], metric: Metric, limit: usize) -> Vec<NameValue> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<NameValue> = Vec::new();

    for point in points {
        let slot = *index.entry(point.name.as_str()).or_insert_with(|| {
            entries.push(NameValue {
                name: point.name.clone(),
                value: 0.0,
            });
            entries.len() - 1
        });
        entries[slot].value += metric.value(point);
    }

    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    entries.truncate(limit);
    entries
}

/// Distribution for a possibly-missing payload
pub fn distribution_chart(data: Option<&DiseaseTrends>, metric: Metric, limit: usize) -> Vec<NameValue> {
    distribution(points_of(data), metric, limit)
}
