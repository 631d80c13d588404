//! Core data models for the SDOH map data layer
//!
//! This module contains the data types used throughout the crate for
//! representing geographies, fetched metric values, and dataset snapshots,
//! plus the remote client and the static state registry.

pub mod census;
pub mod states;

pub use census::{CensusClient, CensusError};
pub use states::{all_states, state_by_abbrev, state_by_fips};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A U.S. state (or DC) covered by the system
///
/// Uses `&'static str` for string fields to allow static initialization
/// of the STATES array.
#[derive(Debug, Clone, Copy)]
pub struct State {
    /// Zero-padded 2-digit FIPS code
    pub fips: &'static str,
    /// USPS abbreviation
    pub abbrev: &'static str,
    /// Human-readable name
    pub name: &'static str,
}

/// Granularity of a dataset: one record per state, or one per county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeographyLevel {
    State,
    County,
}

impl GeographyLevel {
    /// Returns a human-readable display label for the level.
    pub fn label(&self) -> &'static str {
        match self {
            GeographyLevel::State => "state",
            GeographyLevel::County => "county",
        }
    }

    /// Capitalized form of the level name for headings.
    pub fn display_name(&self) -> &'static str {
        match self {
            GeographyLevel::State => "State",
            GeographyLevel::County => "County",
        }
    }

    /// Name of the cache file holding this level's snapshot.
    pub fn cache_file_name(&self) -> &'static str {
        match self {
            GeographyLevel::State => "sdoh_state_cache.json",
            GeographyLevel::County => "sdoh_county_cache.json",
        }
    }

    /// Parses user input into a GeographyLevel.
    ///
    /// Matching is case-insensitive and accepts plural forms.
    /// Returns `None` if the input doesn't match a level.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<GeographyLevel> {
        match s.to_lowercase().trim() {
            "state" | "states" => Some(GeographyLevel::State),
            "county" | "counties" => Some(GeographyLevel::County),
            _ => None,
        }
    }
}

/// One geography's values for the metrics in a snapshot
///
/// The value map is keyed by metric id and holds `None` where the remote
/// source reported missing or suppressed data. Missing values are preserved
/// rather than coerced to 0 so geo coverage stays complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoRecord {
    /// 2-digit state FIPS, or 5-digit state+county FIPS
    pub geo_id: String,
    /// Display name from the remote source (county names include the state)
    pub geo_name: String,
    /// USPS abbreviation of the containing state
    pub state_abbrev: String,
    /// Metric id -> value; `None` means unavailable for this geography
    pub values: BTreeMap<String, Option<f64>>,
}

impl GeoRecord {
    /// Returns the value for a metric, flattening "metric not in this
    /// snapshot" and "reported as unavailable" both to `None`.
    pub fn value(&self, metric_id: &str) -> Option<f64> {
        self.values.get(metric_id).copied().flatten()
    }
}

/// An immutable, internally consistent set of records fetched at one point
/// in time for one geography level.
///
/// Invariants: every record shares the snapshot's geography level and fetch
/// timestamp; `geo_id` values are unique; every record's value map is keyed
/// by exactly `metric_ids`. This is also the persisted cache document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    /// Geography level shared by all records
    pub level: GeographyLevel,
    /// When the remote fetch producing this snapshot completed
    pub fetched_at: DateTime<Utc>,
    /// Metric ids covered by every record in the snapshot
    pub metric_ids: BTreeSet<String>,
    /// Ordered records, one per geography
    pub records: Vec<GeoRecord>,
}

impl DatasetSnapshot {
    /// Whether the snapshot is still within its freshness window.
    ///
    /// Strict comparison: a snapshot exactly `ttl` old is already stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }

    /// Age of the snapshot relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.fetched_at)
    }

    /// Whether the snapshot's metric coverage includes every requested id.
    pub fn covers(&self, metric_ids: &[&str]) -> bool {
        metric_ids.iter().all(|id| self.metric_ids.contains(*id))
    }

    /// Records belonging to one state, for county drill-down display.
    pub fn records_for_state(&self, abbrev: &str) -> Vec<&GeoRecord> {
        self.records
            .iter()
            .filter(|record| record.state_abbrev.eq_ignore_ascii_case(abbrev.trim()))
            .collect()
    }
}
