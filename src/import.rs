//! Local Dataset Import
//!
//! Loads trend points from CSV exports and JSON snapshots of the
//! `/dashboard/trends` payload.

use std::io::Read;
use std::path::Path;

use crate::trends::{DiseaseTrends, TrendPoint};

const MAX_REPORTED_ERRORS: usize = 100;

/// Errors that can occur while importing a dataset
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub year: usize,
    pub quarter: usize,
    pub name: usize,
    pub cases: usize,
    pub incidence_rate: Option<usize>,
    pub mortality_rate: Option<usize>,
    pub recovery_rate: Option<usize>,
}

impl ColumnMap {
    /// Resolve columns from a header row.
    ///
    /// Matching ignores case, spaces, dashes and underscores, so
    /// `incidenceRate`, `incidence_rate` and `Incidence Rate` are equivalent.
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |wanted: &[&str]| position(&normalized, wanted);

        Ok(Self {
            year: find(&["year"][..]).ok_or(ImportError::MissingColumn("year"))?,
            quarter: find(&["quarter"][..]).ok_or(ImportError::MissingColumn("quarter"))?,
            name: find(&["name", "disease"][..]).ok_or(ImportError::MissingColumn("name"))?,
            cases: find(&["cases"][..]).ok_or(ImportError::MissingColumn("cases"))?,
            incidence_rate: find(&["incidencerate", "incidence"][..]),
            mortality_rate: find(&["mortalityrate", "mortality"][..]),
            recovery_rate: find(&["recoveryrate", "recovery"][..]),
        })
    }
}

fn position(headers: &[String], wanted: &[&str]) -> Option<usize> {
    headers.iter().position(|h| wanted.contains(&h.as_str()))
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Result of a CSV import operation
#[derive(Debug)]
pub struct CsvImportResult {
    pub points: Vec<TrendPoint>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

impl CsvImportResult {
    pub fn into_trends(self) -> DiseaseTrends {
        DiseaseTrends::new(self.points)
    }
}

/// CSV importer for trend points
pub struct CsvImporter {
    delimiter: u8,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Import data from a CSV file
    pub fn import(&self, path: &Path) -> Result<CsvImportResult, ImportError> {
        let file = std::fs::File::open(path)?;
        let result = self.import_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = result.rows_processed,
            failed = result.rows_failed,
            "Imported trend CSV"
        );
        Ok(result)
    }

    /// Import from a CSV string
    pub fn import_str(&self, csv_data: &str) -> Result<CsvImportResult, ImportError> {
        self.import_reader(csv_data.as_bytes())
    }

    fn import_reader<R: Read>(&self, source: R) -> Result<CsvImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let columns = ColumnMap::from_headers(reader.headers()?)?;

        let mut points = Vec::new();
        let mut rows_processed = 0;
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            let actual_line = line_num + 2;

            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|record| parse_record(&record, &columns));

            match parsed {
                Ok(point) => {
                    points.push(point);
                    rows_processed += 1;
                }
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                }
            }
        }

        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        Ok(CsvImportResult {
            points,
            rows_processed,
            rows_failed,
            errors,
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, column: &str) -> Result<&'r str, String> {
    match record.get(idx).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing {}", column)),
    }
}

fn optional_rate(record: &csv::StringRecord, idx: Option<usize>, column: &str) -> Result<Option<f64>, String> {
    let Some(value) = idx.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(rate) if rate.is_finite() => Ok(Some(rate)),
        _ => Err(format!("invalid {}: {}", column, value)),
    }
}

fn parse_record(record: &csv::StringRecord, columns: &ColumnMap) -> Result<TrendPoint, String> {
    let year_str = field(record, columns.year, "year")?;
    let year = year_str
        .parse::<i32>()
        .map_err(|_| format!("invalid year: {}", year_str))?;

    let quarter_str = field(record, columns.quarter, "quarter")?;
    let quarter = quarter_str
        .trim_start_matches(['Q', 'q'])
        .parse::<u8>()
        .ok()
        .filter(|q| (1..=4).contains(q))
        .ok_or_else(|| format!("invalid quarter: {}", quarter_str))?;

    let name = field(record, columns.name, "name")?;

    let cases_str = field(record, columns.cases, "cases")?;
    let cases = if cases_str.starts_with('-') {
        return Err(format!("negative cases: {}", cases_str));
    } else {
        cases_str
            .parse::<u64>()
            .map_err(|_| format!("invalid cases: {}", cases_str))?
    };

    Ok(TrendPoint {
        year,
        quarter,
        name: name.to_string(),
        cases,
        incidence_rate: optional_rate(record, columns.incidence_rate, "incidenceRate")?,
        mortality_rate: optional_rate(record, columns.mortality_rate, "mortalityRate")?,
        recovery_rate: optional_rate(record, columns.recovery_rate, "recoveryRate")?,
    })
}

/// Load a JSON dataset: either a `{ "points": [...] }` payload or a bare array
pub fn load_json(path: &Path) -> Result<DiseaseTrends, ImportError> {
    let data = std::fs::read_to_string(path)?;
    parse_json(&data)
}

/// Parse a JSON dataset from a string
pub fn parse_json(data: &str) -> Result<DiseaseTrends, ImportError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Wrapped(DiseaseTrends),
        Bare(Vec<TrendPoint>),
    }

    Ok(match serde_json::from_str(data)? {
        Payload::Wrapped(trends) => trends,
        Payload::Bare(points) => DiseaseTrends::new(points),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_csv_import() {
        let csv_data = "year,quarter,name,cases,incidenceRate,mortalityRate,recoveryRate
2020,1,Influenza,15000,45.2,0.8,95.1
2020,2,Influenza,12000,36.1,0.7,96.0
2020,1,Measles,300,,,";

        let result = CsvImporter::new().import_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 3);
        assert_eq!(result.rows_failed, 0);
        assert_eq!(result.points[0].incidence_rate, Some(45.2));
        assert_eq!(result.points[2].name, "Measles");
        assert_eq!(result.points[2].mortality_rate, None);
    }

    #[test]
    fn test_snake_case_headers_in_any_order() {
        let csv_data = "Name,CASES,incidence_rate,Year,Quarter
Mumps,40,1.5,2021,Q3";

        let result = CsvImporter::new().import_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 1);
        let point = &result.points[0];
        assert_eq!((point.year, point.quarter), (2021, 3));
        assert_eq!(point.cases, 40);
        assert_eq!(point.incidence_rate, Some(1.5));
    }

    #[test]
    fn test_invalid_rows_are_counted() {
        let csv_data = "year,quarter,name,cases,mortalityRate
2020,5,Influenza,100,
2020,1,Influenza,-3,
2020,1,Influenza,abc,
2020,1,Influenza,10,high
2020,1,,10,
2020,2,Influenza,10,0.5";

        let result = CsvImporter::new().import_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 1);
        assert_eq!(result.rows_failed, 5);
        assert!(result.errors[0].starts_with("Line 2: invalid quarter"));
        assert!(result.errors[1].contains("negative cases"));
        assert!(result.errors[3].contains("invalid mortalityRate"));
        assert!(result.errors[4].contains("missing name"));
    }

    #[test]
    fn test_missing_required_column() {
        let err = CsvImporter::new()
            .import_str("year,name,cases\n2020,Flu,1")
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("quarter")));
    }

    #[test]
    fn test_error_list_is_truncated() {
        let mut csv_data = String::from("year,quarter,name,cases\n");
        for _ in 0..150 {
            csv_data.push_str("2020,9,Flu,1\n");
        }

        let result = CsvImporter::new().import_str(&csv_data).unwrap();
        assert_eq!(result.rows_failed, 150);
        assert_eq!(result.errors.len(), MAX_REPORTED_ERRORS + 1);
        assert_eq!(result.errors.last().unwrap(), "... and 50 more errors");
    }

    #[test]
    fn test_import_from_file_with_delimiter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "year;quarter;name;cases").unwrap();
        writeln!(file, "2019;4;Cholera;12").unwrap();

        let result = CsvImporter::new()
            .with_delimiter(b';')
            .import(file.path())
            .unwrap();

        let trends = result.into_trends();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends.points[0].name, "Cholera");
    }

    #[test]
    fn test_json_wrapped_and_bare() {
        let wrapped = r#"{"points":[{"year":2020,"quarter":1,"name":"Flu","cases":5}]}"#;
        let bare = r#"[{"year":2020,"quarter":1,"name":"Flu","cases":5,"incidenceRate":2.0}]"#;

        assert_eq!(parse_json(wrapped).unwrap().len(), 1);
        let trends = parse_json(bare).unwrap();
        assert_eq!(trends.points[0].incidence_rate, Some(2.0));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.json");
        std::fs::write(&path, r#"{"points":[]}"#).unwrap();

        assert!(load_json(&path).unwrap().is_empty());
        assert!(matches!(
            load_json(&dir.path().join("missing.json")),
            Err(ImportError::Io(_))
        ));
    }
}
