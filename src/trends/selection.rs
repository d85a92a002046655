//! Disease selection and top-N ranking
//!
//! The candidate list is always the alphabetically sorted set of disease
//! names present in the points. Automatic selection ranks candidates by
//! their metric total with a stable sort, so equal totals keep alphabetical
//! order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use super::metric::Metric;
use super::types::TrendPoint;

/// Number of series shown when the user has not picked any
pub const DEFAULT_TOP_N: usize = 5;

/// Diseases explicitly chosen by the user
///
/// Empty means "automatic top-N", not "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    diseases: BTreeSet<String>,
}

impl Selection {
    /// Automatic selection
    pub fn automatic() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            diseases: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_automatic(&self) -> bool {
        self.diseases.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.diseases.contains(name)
    }

    /// Add the disease if absent, remove it if present
    pub fn toggle(&mut self, name: &str) {
        if !self.diseases.remove(name) {
            self.diseases.insert(name.to_string());
        }
    }

    /// Back to automatic top-N
    pub fn reset(&mut self) {
        self.diseases.clear();
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.diseases.iter()
    }
}

/// Unique disease names, sorted alphabetically
pub fn disease_names(points: &[TrendPoint]) -> Vec<String> {
    points
        .iter()
        .map(|p| p.name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring search over disease names
///
/// A blank query matches everything.
pub fn search_diseases<'a>(names: &'a [String], query: &str) -> Vec<&'a String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return names.iter().collect();
    }
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .collect()
}

/// Sum of the metric per disease
pub fn metric_totals<'a>(points: &'a [TrendPoint], metric: Metric) -> HashMap<&'a str, f64> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for point in points {
        *totals.entry(point.name.as_str()).or_insert(0.0) += metric.value(point);
    }
    totals
}

/// Pick the series to display
///
/// With an explicit selection: the candidates that are selected, in
/// candidate order. Otherwise the `n` candidates with the highest metric
/// total, descending.
pub fn select_top_n(
    candidates: &[String],
    points: &[TrendPoint],
    metric: Metric,
    selection: &Selection,
    n: usize,
) -> Vec<String> {
    if !selection.is_automatic() {
        return candidates
            .iter()
            .filter(|name| selection.contains(name))
            .cloned()
            .collect();
    }

    let totals = metric_totals(points, metric);
    let mut ranked: Vec<(&String, f64)> = candidates
        .iter()
        .map(|name| (name, totals.get(name.as_str()).copied().unwrap_or(0.0)))
        .collect();

    // sort_by is stable: ties keep candidate order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .take(n)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Series selection over the diseases present in `points`
pub fn select_diseases(points: &[TrendPoint], metric: Metric, selection: &Selection) -> Vec<String> {
    select_top_n(&disease_names(points), points, metric, selection, DEFAULT_TOP_N)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_n_orders_by_descending_total() {
        let points = vec![
            TrendPoint::new("A", 2020, 1, 100),
            TrendPoint::new("B", 2020, 1, 500),
            TrendPoint::new("C", 2020, 1, 10),
        ];
        let selected = select_diseases(&points, Metric::Cases, &Selection::automatic());
        assert_eq!(selected, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_top_n_truncates_to_five() {
        let points: Vec<TrendPoint> = (0..8)
            .map(|i| TrendPoint::new(format!("D{}", i), 2020, 1, (i as u64 + 1) * 10))
            .collect();
        let selected = select_diseases(&points, Metric::Cases, &Selection::automatic());
        assert_eq!(selected, vec!["D7", "D6", "D5", "D4", "D3"]);
    }

    #[test]
    fn test_top_n_sums_across_points() {
        let points = vec![
            TrendPoint::new("A", 2020, 1, 300),
            TrendPoint::new("B", 2020, 1, 500),
            TrendPoint::new("A", 2020, 2, 300),
        ];
        let selected = select_diseases(&points, Metric::Cases, &Selection::automatic());
        assert_eq!(selected, vec!["A", "B"]);
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let points = vec![
            TrendPoint::new("Zika", 2020, 1, 50),
            TrendPoint::new("Cholera", 2020, 1, 50),
            TrendPoint::new("Mumps", 2020, 1, 50),
        ];
        let selected = select_diseases(&points, Metric::Cases, &Selection::automatic());
        assert_eq!(selected, vec!["Cholera", "Mumps", "Zika"]);
    }

    #[test]
    fn test_explicit_selection_keeps_candidate_order() {
        let points = vec![
            TrendPoint::new("A", 2020, 1, 1),
            TrendPoint::new("B", 2020, 1, 2),
            TrendPoint::new("C", 2020, 1, 3),
        ];
        let selection = Selection::from_names(["C", "A", "Missing"]);
        let selected = select_diseases(&points, Metric::Cases, &selection);
        assert_eq!(selected, vec!["A", "C"]);
    }

    #[test]
    fn test_rate_metric_ranking() {
        let points = vec![
            TrendPoint::new("A", 2020, 1, 1000).mortality(0.1),
            TrendPoint::new("B", 2020, 1, 10).mortality(4.0),
            TrendPoint::new("C", 2020, 1, 10),
        ];
        let selected = select_diseases(&points, Metric::MortalityRate, &Selection::automatic());
        assert_eq!(selected, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut selection = Selection::automatic();
        selection.toggle("Influenza");
        selection.toggle("Measles");
        assert_eq!(selection.len(), 2);
        selection.toggle("Influenza");
        assert!(!selection.contains("Influenza"));
        assert!(!selection.is_automatic());
        selection.reset();
        assert!(selection.is_automatic());
    }

    #[test]
    fn test_disease_names_sorted_unique() {
        let points = vec![
            TrendPoint::new("Mumps", 2020, 1, 1),
            TrendPoint::new("Cholera", 2020, 1, 1),
            TrendPoint::new("Mumps", 2020, 2, 1),
        ];
        assert_eq!(disease_names(&points), vec!["Cholera", "Mumps"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let names = vec!["Influenza".to_string(), "Hepatitis A".to_string(), "Hepatitis B".to_string()];
        assert_eq!(search_diseases(&names, "HEPA").len(), 2);
        assert_eq!(search_diseases(&names, "  ").len(), 3);
        assert!(search_diseases(&names, "zika").is_empty());
    }

    #[test]
    fn test_empty_points() {
        assert!(select_diseases(&[], Metric::Cases, &Selection::automatic()).is_empty());
    }
}
