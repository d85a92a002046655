//! Heat-Map Aggregator
//!
//! Quarter x year grid of summed metric values with a linear color scale.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::metric::Metric;
use super::types::{points_of, DiseaseTrends, TrendPoint};

/// Row order of the grid
pub const QUARTERS: [u8; 4] = [1, 2, 3, 4];

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatCell {
    pub year: i32,
    pub quarter: u8,
    pub value: f64,
}

/// An RGB color, rendered as `rgb(r, g, b)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Color for an intensity in [0, 1]
    pub fn from_intensity(intensity: f64) -> Self {
        let i = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            r: 0,
            g: (i * 200.0).round() as u8,
            b: (i * 255.0).round() as u8,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Quarter x year grid
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatMap {
    pub metric: Metric,
    /// Column headers, ascending
    pub years: Vec<i32>,
    /// Four rows (Q1..Q4), each with one cell per year
    pub rows: Vec<Vec<HeatCell>>,
    /// Largest cell value, 0 for an empty grid
    pub max_value: f64,
}

impl HeatMap {
    /// Aggregate points into the grid
    ///
    /// Points with a quarter outside 1..=4 have no row and are skipped.
    pub fn build(points: &[TrendPoint], metric: Metric) -> Self {
        let mut sums: HashMap<(i32, u8), f64> = HashMap::new();
        let mut years = BTreeSet::new();

        for point in points.iter().filter(|p| p.has_valid_quarter()) {
            years.insert(point.year);
            *sums.entry((point.year, point.quarter)).or_insert(0.0) += metric.value(point);
        }

        let years: Vec<i32> = years.into_iter().collect();
        let rows: Vec<Vec<HeatCell>> = QUARTERS
            .iter()
            .map(|&quarter| {
                years
                    .iter()
                    .map(|&year| HeatCell {
                        year,
                        quarter,
                        value: sums.get(&(year, quarter)).copied().unwrap_or(0.0),
                    })
                    .collect()
            })
            .collect();

        let max_value = rows
            .iter()
            .flatten()
            .map(|cell| cell.value)
            .fold(0.0, f64::max);

        Self {
            metric,
            years,
            rows,
            max_value,
        }
    }

    /// (rows, columns)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.years.len())
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn cell(&self, year: i32, quarter: u8) -> Option<&HeatCell> {
        let row = QUARTERS.iter().position(|&q| q == quarter)?;
        let col = self.years.iter().position(|&y| y == year)?;
        self.rows.get(row)?.get(col)
    }

    pub fn cells(&self) -> impl Iterator<Item = &HeatCell> {
        self.rows.iter().flatten()
    }

    /// Value relative to the grid maximum; 0 when the maximum is 0
    pub fn intensity(&self, value: f64) -> f64 {
        if self.max_value > 0.0 {
            (value / self.max_value).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn color(&self, value: f64) -> Rgb {
        Rgb::from_intensity(self.intensity(value))
    }

    /// Label color readable on top of `color(value)`
    pub fn text_color(&self, value: f64) -> &'static str {
        if value > self.max_value / 2.0 {
            "white"
        } else {
            "black"
        }
    }
}

/// Heat map for a possibly-missing payload
pub fn heat_map(data: Option<&DiseaseTrends>, metric: Metric) -> HeatMap {
    HeatMap::build(points_of(data), metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions() {
        let points = vec![
            TrendPoint::new("A", 2021, 3, 50),
            TrendPoint::new("B", 2019, 1, 10),
            TrendPoint::new("C", 2020, 2, 20),
        ];
        let map = HeatMap::build(&points, Metric::Cases);
        assert_eq!(map.dimensions(), (4, 3));
        assert_eq!(map.years, vec![2019, 2020, 2021]);
    }

    #[test]
    fn test_single_point_contributes_to_one_cell() {
        let points = vec![TrendPoint::new("A", 2021, 3, 50)];
        let map = HeatMap::build(&points, Metric::Cases);

        assert_eq!(map.cell(2021, 3).unwrap().value, 50.0);
        let others: f64 = map
            .cells()
            .filter(|c| !(c.year == 2021 && c.quarter == 3))
            .map(|c| c.value)
            .sum();
        assert_eq!(others, 0.0);
    }

    #[test]
    fn test_cells_sum_across_diseases() {
        let points = vec![
            TrendPoint::new("A", 2020, 1, 50).incidence(1.5),
            TrendPoint::new("B", 2020, 1, 25).incidence(2.0),
            TrendPoint::new("C", 2020, 1, 25),
        ];
        let cases = HeatMap::build(&points, Metric::Cases);
        assert_eq!(cases.cell(2020, 1).unwrap().value, 100.0);

        let incidence = HeatMap::build(&points, Metric::IncidenceRate);
        assert_eq!(incidence.cell(2020, 1).unwrap().value, 3.5);
    }

    #[test]
    fn test_rows_follow_quarter_order() {
        let points = vec![TrendPoint::new("A", 2020, 4, 1), TrendPoint::new("A", 2020, 1, 1)];
        let map = HeatMap::build(&points, Metric::Cases);
        let quarters: Vec<u8> = map.rows.iter().map(|row| row[0].quarter).collect();
        assert_eq!(quarters, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_color_scale() {
        let points = vec![TrendPoint::new("A", 2020, 1, 100), TrendPoint::new("A", 2020, 2, 50)];
        let map = HeatMap::build(&points, Metric::Cases);

        assert_eq!(map.max_value, 100.0);
        assert_eq!(map.color(100.0).to_string(), "rgb(0, 200, 255)");
        assert_eq!(map.color(50.0).to_string(), "rgb(0, 100, 128)");
        assert_eq!(map.color(0.0).to_string(), "rgb(0, 0, 0)");
        assert_eq!(map.text_color(100.0), "white");
        assert_eq!(map.text_color(50.0), "black");
    }

    #[test]
    fn test_zero_maximum_renders_minimum_color() {
        let points = vec![TrendPoint::new("A", 2020, 1, 0)];
        let map = HeatMap::build(&points, Metric::Cases);

        assert_eq!(map.max_value, 0.0);
        assert_eq!(map.intensity(0.0), 0.0);
        assert_eq!(map.color(0.0), Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn test_missing_data_gives_empty_grid() {
        let map = heat_map(None, Metric::MortalityRate);
        assert!(map.is_empty());
        assert_eq!(map.dimensions(), (4, 0));
        assert_eq!(map.max_value, 0.0);
    }

    #[test]
    fn test_invalid_quarter_is_skipped() {
        let points = vec![TrendPoint::new("A", 2020, 7, 10), TrendPoint::new("A", 2021, 2, 5)];
        let map = HeatMap::build(&points, Metric::Cases);
        assert_eq!(map.years, vec![2021]);
        assert_eq!(map.max_value, 5.0);
    }

    #[test]
    fn test_serializes_colors_as_strings() {
        let json = serde_json::to_string(&Rgb::from_intensity(1.0)).unwrap();
        assert_eq!(json, "\"rgb(0, 200, 255)\"");
    }
}
