//! Metric vocabulary
//!
//! One enumeration shared by every view. Both historical spellings
//! (`incidenceRate` and `incidence`) parse to the same variant; anything else
//! is rejected rather than silently read as cases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::TrendsError;
use super::types::TrendPoint;

/// A numeric measure carried by every trend point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Cases,
    #[serde(alias = "incidence")]
    IncidenceRate,
    #[serde(alias = "mortality")]
    MortalityRate,
    #[serde(alias = "recovery")]
    RecoveryRate,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Cases,
        Metric::IncidenceRate,
        Metric::MortalityRate,
        Metric::RecoveryRate,
    ];

    /// Wire key (camelCase, as used by the upstream API)
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::IncidenceRate => "incidenceRate",
            Metric::MortalityRate => "mortalityRate",
            Metric::RecoveryRate => "recoveryRate",
        }
    }

    /// Human-readable label for axes and legends
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cases => "Cases",
            Metric::IncidenceRate => "Incidence Rate",
            Metric::MortalityRate => "Mortality Rate",
            Metric::RecoveryRate => "Recovery Rate",
        }
    }

    /// Raw observed value, `None` when the point does not carry it
    pub fn observed(&self, point: &TrendPoint) -> Option<f64> {
        match self {
            Metric::Cases => Some(point.cases as f64),
            Metric::IncidenceRate => point.incidence_rate,
            Metric::MortalityRate => point.mortality_rate,
            Metric::RecoveryRate => point.recovery_rate,
        }
    }

    /// Value used for summing: absent or non-finite reads as 0
    pub fn value(&self, point: &TrendPoint) -> f64 {
        self.observed(point)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Cases
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "cases" => Ok(Metric::Cases),
            "incidencerate" | "incidence" => Ok(Metric::IncidenceRate),
            "mortalityrate" | "mortality" => Ok(Metric::MortalityRate),
            "recoveryrate" | "recovery" => Ok(Metric::RecoveryRate),
            _ => Err(TrendsError::UnknownMetric(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unified_vocabulary() {
        assert_eq!("cases".parse::<Metric>().unwrap(), Metric::Cases);
        assert_eq!("incidenceRate".parse::<Metric>().unwrap(), Metric::IncidenceRate);
        assert_eq!("incidence".parse::<Metric>().unwrap(), Metric::IncidenceRate);
        assert_eq!("incidence_rate".parse::<Metric>().unwrap(), Metric::IncidenceRate);
        assert_eq!("mortality".parse::<Metric>().unwrap(), Metric::MortalityRate);
        assert_eq!("MortalityRate".parse::<Metric>().unwrap(), Metric::MortalityRate);
        assert_eq!("recovery-rate".parse::<Metric>().unwrap(), Metric::RecoveryRate);
    }

    #[test]
    fn test_unknown_metric_is_an_error() {
        let err = "deaths".parse::<Metric>().unwrap_err();
        assert_eq!(err, TrendsError::UnknownMetric("deaths".to_string()));
    }

    #[test]
    fn test_key_round_trips_through_parse() {
        for metric in Metric::ALL {
            assert_eq!(metric.key().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_absent_rate_sums_as_zero() {
        let point = TrendPoint::new("Influenza", 2020, 1, 40);
        assert_eq!(Metric::IncidenceRate.observed(&point), None);
        assert_eq!(Metric::IncidenceRate.value(&point), 0.0);
        assert_eq!(Metric::Cases.value(&point), 40.0);
    }

    #[test]
    fn test_non_finite_rate_sums_as_zero() {
        let point = TrendPoint::new("Influenza", 2020, 1, 40).mortality(f64::NAN);
        assert_eq!(Metric::MortalityRate.value(&point), 0.0);
    }

    #[test]
    fn test_serde_aliases() {
        let metric: Metric = serde_json::from_str("\"mortality\"").unwrap();
        assert_eq!(metric, Metric::MortalityRate);
        assert_eq!(serde_json::to_string(&Metric::RecoveryRate).unwrap(), "\"recoveryRate\"");
    }
}
