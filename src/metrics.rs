//! SDOH metric registry
//!
//! This module contains the static list of supported social-determinants-of-health
//! indicators, mapping each CLI-facing metric id to its ACS 1-year profile
//! variable code, display metadata, unit, and polarity.

use thiserror::Error;

/// Error returned when a metric id is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric '{0}'. Valid options: median-income, poverty-rate, bachelors-degree, unemployment-rate, insurance-coverage")]
pub struct UnknownMetric(pub String);

/// Whether higher values of a metric represent a favorable social outcome.
///
/// Drives the color-scale choice in choropleth rendering: favorable metrics
/// map to a green ramp, unfavorable ones to a red ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Higher values are better (e.g. income, insurance coverage)
    Positive,
    /// Higher values are worse (e.g. poverty rate, unemployment)
    Negative,
}

impl Polarity {
    /// Returns the sequential color-scale name a renderer should use.
    pub fn color_scale(self) -> &'static str {
        match self {
            Polarity::Positive => "Greens",
            Polarity::Negative => "Reds",
        }
    }

    /// Returns a short human-readable description of the polarity.
    pub fn label(self) -> &'static str {
        match self {
            Polarity::Positive => "higher is better",
            Polarity::Negative => "higher is worse",
        }
    }
}

/// Measurement unit of a metric, used for display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Inflation-adjusted dollars
    Usd,
    /// Percentage of population
    Percent,
}

impl Unit {
    /// Returns a short human-readable name for the unit.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Usd => "USD",
            Unit::Percent => "percent",
        }
    }
}

/// A socioeconomic indicator available from the ACS 1-year profile tables.
///
/// Uses `&'static str` for string fields to allow static initialization
/// of the METRICS array.
#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    /// Unique identifier for the metric
    pub id: &'static str,
    /// Variable code in the remote profile table
    pub variable: &'static str,
    /// Human-readable display name
    pub name: &'static str,
    /// Measurement unit
    pub unit: Unit,
    /// Whether higher values are favorable
    pub polarity: Polarity,
    /// One-line description shown in listings and reports
    pub description: &'static str,
}

impl MetricDef {
    /// Formats a value for display using the metric's unit.
    ///
    /// `None` (missing/suppressed data) renders as "N/A". Dollar values are
    /// rounded to whole dollars with thousands separators; percentages keep
    /// one decimal place.
    pub fn format_value(&self, value: Option<f64>) -> String {
        match value {
            None => "N/A".to_string(),
            Some(v) => match self.unit {
                Unit::Usd => format!("${}", group_thousands(v)),
                Unit::Percent => format!("{:.1}%", v),
            },
        }
    }
}

/// Static array of all supported SDOH metrics
pub static METRICS: [MetricDef; 5] = [
    MetricDef {
        id: "median-income",
        variable: "DP03_0062E",
        name: "Median Household Income",
        unit: Unit::Usd,
        polarity: Polarity::Positive,
        description: "Median household income in the past 12 months (in 2022 inflation-adjusted dollars)",
    },
    MetricDef {
        id: "poverty-rate",
        variable: "DP03_0119PE",
        name: "Poverty Rate",
        unit: Unit::Percent,
        polarity: Polarity::Negative,
        description: "Percentage of population below poverty level",
    },
    MetricDef {
        id: "bachelors-degree",
        variable: "DP02_0065PE",
        name: "Educational Attainment (Bachelor's+)",
        unit: Unit::Percent,
        polarity: Polarity::Positive,
        description: "Percentage of population 25+ with bachelor's degree or higher",
    },
    MetricDef {
        id: "unemployment-rate",
        variable: "DP03_0005PE",
        name: "Unemployment Rate",
        unit: Unit::Percent,
        polarity: Polarity::Negative,
        description: "Unemployment rate for population 16 years and over",
    },
    MetricDef {
        id: "insurance-coverage",
        variable: "DP03_0096PE",
        name: "Health Insurance Coverage",
        unit: Unit::Percent,
        polarity: Polarity::Positive,
        description: "Percentage of population with health insurance coverage",
    },
];

/// Get a metric definition by its id
///
/// # Arguments
///
/// * `id` - The unique identifier for the metric (e.g., "median-income", "poverty-rate")
///
/// # Returns
///
/// Returns `Some(&MetricDef)` if found, `None` otherwise
pub fn find(id: &str) -> Option<&'static MetricDef> {
    METRICS.iter().find(|metric| metric.id == id)
}

/// Look up a metric definition, failing with [`UnknownMetric`] if absent.
pub fn lookup(id: &str) -> Result<&'static MetricDef, UnknownMetric> {
    find(id).ok_or_else(|| UnknownMetric(id.to_string()))
}

/// Get all supported metrics
pub fn all_metrics() -> &'static [MetricDef] {
    &METRICS
}

/// Get the ids of all supported metrics, in registry order.
pub fn all_ids() -> Vec<&'static str> {
    METRICS.iter().map(|metric| metric.id).collect()
}

/// Inserts thousands separators into a value rounded to a whole number.
fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
