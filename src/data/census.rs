//! Census ACS API client
//!
//! This module fetches SDOH indicator values from the Census Bureau's ACS
//! 1-year data profile endpoint and parses the tabular JSON payload into
//! dataset snapshots. The payload is an array of arrays whose first row is a
//! header; columns are located by name, not position.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{states, DatasetSnapshot, GeoRecord, GeographyLevel, State};
use crate::metrics::MetricDef;

/// Base URL for the ACS 1-year data profile endpoint
const CENSUS_BASE_URL: &str = "https://api.census.gov/data/2022/acs/acs1/profile";

/// Hard request timeout in seconds. The API occasionally hangs on county
/// queries; past this point a retry is more useful than more waiting.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cells at or below this value are ACS annotation codes (the API reports
/// "estimate not available" as repeated-digit negatives like -666666666)
/// and are treated as missing data.
const SENTINEL_THRESHOLD: f64 = -111_111_111.0;

/// Errors that can occur when fetching census data
#[derive(Debug, Error)]
pub enum CensusError {
    /// HTTP request failed (connection, DNS resolution, timeout)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Remote source answered with a non-success status
    #[error("Census API returned status {0}")]
    BadStatus(StatusCode),

    /// Response body does not have the expected tabular shape
    #[error("Malformed Census response: {0}")]
    Malformed(String),
}

/// Client for fetching SDOH data from the Census ACS profile API
///
/// State-level data is one request; county-level data is one request per
/// state scope (the API requires `in=state:<fips>` for county queries), all
/// issued concurrently and assembled in state-registry order.
#[derive(Debug, Clone)]
pub struct CensusClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for CensusClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CensusClient {
    /// Create a new CensusClient with the production endpoint and default timeout
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: CENSUS_BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    /// Create a new CensusClient with a custom base URL
    ///
    /// Used by tests to point the client at a local or unreachable endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a new CensusClient with a custom request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch a snapshot for the given geography level and metric set
    ///
    /// # Arguments
    /// * `level` - State or county granularity
    /// * `metrics` - Registry definitions of the metrics to fetch; their
    ///   variable codes are batched into a single `get=` parameter
    ///
    /// # Returns
    /// * `Ok(DatasetSnapshot)` - Normalized records covering every requested metric
    /// * `Err(CensusError)` - If any request or the payload parsing fails
    pub async fn fetch(
        &self,
        level: GeographyLevel,
        metrics: &[&'static MetricDef],
    ) -> Result<DatasetSnapshot, CensusError> {
        let records = match level {
            GeographyLevel::State => {
                let rows = self.query(metrics, "state:*", None).await?;
                parse_rows(&rows, metrics, GeographyLevel::State)?
            }
            GeographyLevel::County => self.fetch_all_counties(metrics).await?,
        };

        debug!(
            level = level.label(),
            records = records.len(),
            "census fetch complete"
        );

        Ok(DatasetSnapshot {
            level,
            fetched_at: Utc::now(),
            metric_ids: metrics.iter().map(|m| m.id.to_string()).collect(),
            records,
        })
    }

    /// Fetches counties for all 51 covered states concurrently.
    ///
    /// Any single scope failure fails the whole fetch: a county snapshot is
    /// all-or-nothing so incomplete coverage is never served as complete.
    /// A geo_id repeated across scopes is malformed.
    async fn fetch_all_counties(
        &self,
        metrics: &[&'static MetricDef],
    ) -> Result<Vec<GeoRecord>, CensusError> {
        let requests = states::all_states()
            .iter()
            .map(|state| self.fetch_county_scope(state, metrics));
        let results = join_all(requests).await;

        let mut records = Vec::new();
        let mut seen = BTreeSet::new();
        for result in results {
            for record in result? {
                check_unique(&mut seen, &record.geo_id)?;
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Fetches the counties of a single state.
    async fn fetch_county_scope(
        &self,
        state: &State,
        metrics: &[&'static MetricDef],
    ) -> Result<Vec<GeoRecord>, CensusError> {
        let in_scope = format!("state:{}", state.fips);
        let rows = self.query(metrics, "county:*", Some(&in_scope)).await?;
        parse_rows(&rows, metrics, GeographyLevel::County)
    }

    /// Issues one GET against the profile endpoint and decodes the body.
    async fn query(
        &self,
        metrics: &[&'static MetricDef],
        for_scope: &str,
        in_scope: Option<&str>,
    ) -> Result<Vec<Vec<Value>>, CensusError> {
        let variables: Vec<&str> = metrics.iter().map(|m| m.variable).collect();
        let get_param = format!("{},NAME", variables.join(","));

        let mut request = self
            .client
            .get(&self.base_url)
            .timeout(self.timeout)
            .query(&[("get", get_param.as_str()), ("for", for_scope)]);
        if let Some(in_scope) = in_scope {
            request = request.query(&[("in", in_scope)]);
        }

        debug!(scope = for_scope, "requesting census data");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CensusError::BadStatus(status));
        }

        let text = response.text().await?;
        decode_rows(&text, for_scope)
    }
}

/// Decodes a response body into header + data rows.
///
/// A body that is not an array of arrays, or that carries no data rows at
/// all, is malformed: every covered scope has geographies, so an empty
/// result means a source-side anomaly and must not be cached.
fn decode_rows(text: &str, scope: &str) -> Result<Vec<Vec<Value>>, CensusError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(text)
        .map_err(|e| CensusError::Malformed(format!("expected JSON array of arrays: {}", e)))?;
    if rows.len() < 2 {
        return Err(CensusError::Malformed(format!(
            "empty result set for scope '{}'",
            scope
        )));
    }
    Ok(rows)
}

/// Parses data rows into GeoRecords using header-name column lookup.
///
/// Rows whose state FIPS is not in the state registry (territories) are
/// skipped. Data cells normalize to `None` on any missing-data sentinel; the
/// record itself is always kept so geo coverage stays complete. A geo_id
/// appearing twice is malformed: a snapshot carries one record per
/// geography.
fn parse_rows(
    rows: &[Vec<Value>],
    metrics: &[&'static MetricDef],
    level: GeographyLevel,
) -> Result<Vec<GeoRecord>, CensusError> {
    let header: Vec<&str> = rows
        .first()
        .ok_or_else(|| CensusError::Malformed("missing header row".to_string()))?
        .iter()
        .map(|cell| cell.as_str().unwrap_or_default())
        .collect();
    let column = |name: &str| {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| CensusError::Malformed(format!("missing column '{}'", name)))
    };

    let name_idx = column("NAME")?;
    let state_idx = column("state")?;
    let county_idx = match level {
        GeographyLevel::State => None,
        GeographyLevel::County => Some(column("county")?),
    };
    let metric_columns = metrics
        .iter()
        .map(|metric| Ok((column(metric.variable)?, *metric)))
        .collect::<Result<Vec<(usize, &MetricDef)>, CensusError>>()?;

    let mut records = Vec::with_capacity(rows.len() - 1);
    let mut seen = BTreeSet::new();
    for row in &rows[1..] {
        let state_fips = zero_pad(text_cell(row, state_idx)?, 2);
        let state = match states::state_by_fips(&state_fips) {
            Some(state) => state,
            // Puerto Rico and other territories are outside the covered set
            None => continue,
        };

        let geo_id = match county_idx {
            None => state_fips,
            Some(idx) => format!("{}{}", state_fips, zero_pad(text_cell(row, idx)?, 3)),
        };
        check_unique(&mut seen, &geo_id)?;

        let mut values = BTreeMap::new();
        for (idx, metric) in &metric_columns {
            values.insert(metric.id.to_string(), parse_cell(data_cell(row, *idx)?));
        }

        records.push(GeoRecord {
            geo_id,
            geo_name: text_cell(row, name_idx)?.to_string(),
            state_abbrev: state.abbrev.to_string(),
            values,
        });
    }

    Ok(records)
}

/// Marks a geo_id as seen, failing when a snapshot would carry it twice.
fn check_unique(seen: &mut BTreeSet<String>, geo_id: &str) -> Result<(), CensusError> {
    if !seen.insert(geo_id.to_string()) {
        return Err(CensusError::Malformed(format!(
            "duplicate geography '{}'",
            geo_id
        )));
    }
    Ok(())
}

/// Returns a cell that must exist, failing on rows shorter than the header.
fn data_cell(row: &[Value], idx: usize) -> Result<&Value, CensusError> {
    row.get(idx).ok_or_else(|| {
        CensusError::Malformed(format!("row has {} columns, expected at least {}", row.len(), idx + 1))
    })
}

/// Returns a cell that must be text (geography identifiers and names).
fn text_cell(row: &[Value], idx: usize) -> Result<&str, CensusError> {
    data_cell(row, idx)?
        .as_str()
        .ok_or_else(|| CensusError::Malformed(format!("non-text geography cell at column {}", idx)))
}

/// Normalizes one data cell to an optional value.
///
/// Null, empty, "-", unparseable text, and ACS annotation codes all mean
/// "no data for this geography".
fn parse_cell(cell: &Value) -> Option<f64> {
    let parsed = match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "-" {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| *v > SENTINEL_THRESHOLD)
}

/// Left-pads a FIPS fragment with zeros (the API sometimes omits them).
fn zero_pad(value: &str, width: usize) -> String {
    format!("{:0>width$}", value.trim(), width = width)
}
