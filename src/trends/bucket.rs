//! Time bucketing
//!
//! Groups points into yearly or quarterly buckets. Buckets are ordered by a
//! composite numeric key (`year * 4 + quarter - 1`), so ordering stays
//! chronological for any year, not only four-digit ones.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use super::error::TrendsError;
use super::types::TrendPoint;

/// Width of a time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Yearly,
    Quarterly,
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Quarterly
    }
}

impl FromStr for Granularity {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yearly" | "year" => Ok(Granularity::Yearly),
            "quarterly" | "quarter" => Ok(Granularity::Quarterly),
            _ => Err(TrendsError::UnknownGranularity(s.to_string())),
        }
    }
}

/// Key of one time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub year: i32,
    /// `None` for yearly buckets
    pub quarter: Option<u8>,
}

impl BucketKey {
    pub fn yearly(year: i32) -> Self {
        Self { year, quarter: None }
    }

    pub fn quarterly(year: i32, quarter: u8) -> Self {
        Self {
            year,
            quarter: Some(quarter),
        }
    }

    /// Bucket a point falls into; `None` when its quarter is outside 1..=4
    pub fn of(point: &TrendPoint, granularity: Granularity) -> Option<Self> {
        if !point.has_valid_quarter() {
            return None;
        }
        Some(match granularity {
            Granularity::Yearly => Self::yearly(point.year),
            Granularity::Quarterly => Self::quarterly(point.year, point.quarter),
        })
    }

    /// Composite chronological key
    pub fn ordinal(&self) -> i64 {
        let quarter_offset = self.quarter.map(|q| i64::from(q) - 1).unwrap_or(0);
        i64::from(self.year) * 4 + quarter_offset
    }

    /// Chart label: `2021` or `2021-Q3`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Ord for BucketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal()
            .cmp(&other.ordinal())
            .then(self.year.cmp(&other.year))
            .then(self.quarter.cmp(&other.quarter))
    }
}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quarter {
            Some(q) => write!(f, "{}-Q{}", self.year, q),
            None => write!(f, "{}", self.year),
        }
    }
}

/// Ordered unique buckets plus the bucket of every input point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    keys: Vec<BucketKey>,
    /// Point index -> index into `keys`, `None` for unbucketed points
    assignments: Vec<Option<usize>>,
}

impl Buckets {
    pub fn keys(&self) -> &[BucketKey] {
        &self.keys
    }

    pub fn labels(&self) -> Vec<String> {
        self.keys.iter().map(BucketKey::label).collect()
    }

    pub fn assignments(&self) -> &[Option<usize>] {
        &self.assignments
    }

    /// Bucket index of the point at `point_index` in the bucketed slice
    pub fn bucket_of(&self, point_index: usize) -> Option<usize> {
        self.assignments.get(point_index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Bucket points by granularity
///
/// Keys are deduplicated and sorted chronologically. The assignment vector is
/// aligned with `points`; points with a quarter outside 1..=4 get no bucket,
/// the same points the heat map leaves out.
pub fn bucket_points(points: &[TrendPoint], granularity: Granularity) -> Buckets {
    let point_keys: Vec<Option<BucketKey>> = points
        .iter()
        .map(|p| BucketKey::of(p, granularity))
        .collect();

    let keys: Vec<BucketKey> = point_keys
        .iter()
        .flatten()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let index: HashMap<BucketKey, usize> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| (*key, i))
        .collect();

    let assignments = point_keys
        .iter()
        .map(|key| key.and_then(|key| index.get(&key).copied()))
        .collect();

    Buckets { keys, assignments }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TrendPoint> {
        vec![
            TrendPoint::new("A", 2021, 2, 10),
            TrendPoint::new("B", 2020, 4, 20),
            TrendPoint::new("A", 2020, 4, 30),
            TrendPoint::new("C", 2021, 1, 40),
        ]
    }

    #[test]
    fn test_quarterly_labels_sorted_and_unique() {
        let buckets = bucket_points(&sample(), Granularity::Quarterly);
        assert_eq!(buckets.labels(), vec!["2020-Q4", "2021-Q1", "2021-Q2"]);
        assert_eq!(buckets.assignments(), &[Some(2), Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn test_invalid_quarters_get_no_bucket() {
        let points = vec![
            TrendPoint::new("A", 2020, 0, 10),
            TrendPoint::new("A", 2020, 1, 20),
            TrendPoint::new("A", 2021, 5, 30),
        ];

        let quarterly = bucket_points(&points, Granularity::Quarterly);
        assert_eq!(quarterly.labels(), vec!["2020-Q1"]);
        assert_eq!(quarterly.assignments(), &[None, Some(0), None]);
        assert_eq!(quarterly.bucket_of(0), None);

        let yearly = bucket_points(&points, Granularity::Yearly);
        assert_eq!(yearly.labels(), vec!["2020"]);
        assert_eq!(yearly.bucket_of(2), None);
    }

    #[test]
    fn test_yearly_labels() {
        let buckets = bucket_points(&sample(), Granularity::Yearly);
        assert_eq!(buckets.labels(), vec!["2020", "2021"]);
        assert_eq!(buckets.bucket_of(0), Some(1));
        assert_eq!(buckets.bucket_of(1), Some(0));
        assert_eq!(buckets.bucket_of(4), None);
    }

    #[test]
    fn test_bucketing_is_idempotent() {
        let points = sample();
        let first = bucket_points(&points, Granularity::Quarterly);
        let second = bucket_points(&points, Granularity::Quarterly);
        assert_eq!(first, second);
    }

    #[test]
    fn test_chronological_beyond_four_digit_years() {
        let points = vec![
            TrendPoint::new("A", 10000, 1, 1),
            TrendPoint::new("A", 999, 3, 1),
            TrendPoint::new("A", 2020, 1, 1),
        ];
        let buckets = bucket_points(&points, Granularity::Quarterly);
        // String sorting would put "10000-Q1" first and "999-Q3" last
        assert_eq!(buckets.labels(), vec!["999-Q3", "2020-Q1", "10000-Q1"]);
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(BucketKey::quarterly(2020, 4).ordinal() + 1, BucketKey::quarterly(2021, 1).ordinal());
        assert!(BucketKey::quarterly(2020, 4) < BucketKey::quarterly(2021, 1));
    }

    #[test]
    fn test_empty_input() {
        let buckets = bucket_points(&[], Granularity::Yearly);
        assert!(buckets.is_empty());
        assert!(buckets.labels().is_empty());
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("yearly".parse::<Granularity>().unwrap(), Granularity::Yearly);
        assert_eq!("Quarterly".parse::<Granularity>().unwrap(), Granularity::Quarterly);
        assert!("monthly".parse::<Granularity>().is_err());
    }
}
