//! Cache-aware access to SDOH dataset snapshots
//!
//! The data manager orchestrates the census client and the flat-file cache:
//! it serves cached snapshots while they are fresh and cover the requested
//! metrics, widens refreshes to the union of requested and previously cached
//! metrics so coverage only ever grows, and falls back to stale data when
//! the remote source is unavailable.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::data::census::REQUEST_TIMEOUT_SECS;
use crate::data::{CensusClient, CensusError, DatasetSnapshot, GeographyLevel};
use crate::metrics::{self, MetricDef, UnknownMetric};

/// Default freshness window for cached snapshots, in days
const DEFAULT_TTL_DAYS: i64 = 7;

/// Errors surfaced by the data manager
#[derive(Debug, Error)]
pub enum DataError {
    /// Caller requested a metric id that is not in the registry
    #[error(transparent)]
    UnknownMetric(#[from] UnknownMetric),

    /// The remote source failed and no cached data exists to fall back on
    #[error("Census data unavailable: {0}")]
    RemoteUnavailable(#[source] CensusError),
}

/// Configuration for a [`DataManager`] instance
///
/// Passed explicitly at construction; independent managers pointed at
/// isolated cache directories can coexist within one process.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory holding the per-level cache files
    pub cache_dir: PathBuf,
    /// How long a cached snapshot stays fresh
    pub ttl: Duration,
    /// Hard timeout for remote requests
    pub timeout: StdDuration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("."),
            ttl: Duration::days(DEFAULT_TTL_DAYS),
            timeout: StdDuration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// A served snapshot plus its staleness marker
#[derive(Debug, Clone)]
pub struct SnapshotData {
    /// The snapshot being served
    pub snapshot: DatasetSnapshot,
    /// True when the snapshot outlived the TTL and is served as the best
    /// available data after a failed refresh
    pub stale: bool,
}

impl SnapshotData {
    /// Humanized age of the served snapshot ("2h ago", "3d ago").
    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        age_display(self.snapshot.age(now))
    }
}

/// Summary of a cached snapshot for status display
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    /// Number of geographies covered
    pub records: usize,
    /// Metric ids covered by the snapshot
    pub metric_ids: BTreeSet<String>,
    /// When the snapshot was fetched
    pub fetched_at: DateTime<Utc>,
    /// Whether the snapshot has outlived the TTL
    pub stale: bool,
}

/// Cache-aware entry point for SDOH data
///
/// Owns the only in-memory reference to the currently served snapshot per
/// geography level; refreshes replace it wholesale, never mutate it.
#[derive(Debug)]
pub struct DataManager {
    config: ManagerConfig,
    store: CacheStore,
    client: CensusClient,
    current: HashMap<GeographyLevel, DatasetSnapshot>,
}

impl DataManager {
    /// Creates a manager from an explicit configuration.
    pub fn new(config: ManagerConfig) -> Self {
        let client = CensusClient::new().with_timeout(config.timeout);
        Self::with_client(config, client)
    }

    /// Creates a manager with a custom census client.
    ///
    /// Tests use this to point the client at a local or unreachable
    /// endpoint.
    pub fn with_client(config: ManagerConfig, client: CensusClient) -> Self {
        let store = CacheStore::new(config.cache_dir.clone());
        Self {
            config,
            store,
            client,
            current: HashMap::new(),
        }
    }

    /// Returns a snapshot covering the requested metrics for a level.
    ///
    /// Serves the cached snapshot when it is fresh and covers every
    /// requested id (zero network calls). Otherwise fetches the union of
    /// requested and previously cached metrics, writes through, and serves
    /// the fresh snapshot. If the fetch fails and any cached snapshot
    /// exists, that snapshot is served with `stale` marking whether it
    /// outlived the TTL; with no cache at all the failure propagates.
    ///
    /// An empty metric list requests the full registry.
    pub async fn get(
        &mut self,
        level: GeographyLevel,
        metric_ids: &[&str],
    ) -> Result<SnapshotData, DataError> {
        let requested = resolve_ids(metric_ids)?;
        let requested_ids: Vec<&str> = requested.iter().map(|m| m.id).collect();
        let now = Utc::now();

        let cached = self.cached_snapshot(level);
        if let Some(snapshot) = &cached {
            if snapshot.is_fresh(now, self.config.ttl) && snapshot.covers(&requested_ids) {
                debug!(level = level.label(), "serving fresh cached snapshot");
                return Ok(SnapshotData {
                    snapshot: snapshot.clone(),
                    stale: false,
                });
            }
        }

        let fetch_set = widened_metric_set(&requested, cached.as_ref());
        match self.client.fetch(level, &fetch_set).await {
            Ok(snapshot) => {
                self.store_snapshot(&snapshot);
                Ok(SnapshotData {
                    snapshot,
                    stale: false,
                })
            }
            Err(fetch_error) => match cached {
                Some(snapshot) => {
                    warn!(
                        level = level.label(),
                        error = %fetch_error,
                        "remote fetch failed, serving cached snapshot"
                    );
                    let stale = !snapshot.is_fresh(now, self.config.ttl);
                    Ok(SnapshotData { snapshot, stale })
                }
                None => Err(DataError::RemoteUnavailable(fetch_error)),
            },
        }
    }

    /// Explicitly refetches a level, bypassing the freshness check.
    ///
    /// Unlike [`DataManager::get`], a remote failure propagates even when
    /// cached data exists: the caller asked for fresh data, so the failure
    /// stays observable. The cache is untouched on failure.
    pub async fn refresh(
        &mut self,
        level: GeographyLevel,
        metric_ids: &[&str],
    ) -> Result<SnapshotData, DataError> {
        let requested = resolve_ids(metric_ids)?;
        let cached = self.cached_snapshot(level);
        let fetch_set = widened_metric_set(&requested, cached.as_ref());

        let snapshot = self
            .client
            .fetch(level, &fetch_set)
            .await
            .map_err(DataError::RemoteUnavailable)?;
        self.store_snapshot(&snapshot);
        Ok(SnapshotData {
            snapshot,
            stale: false,
        })
    }

    /// Metadata for the cached snapshot of a level.
    ///
    /// Returns `None` when nothing has ever been cached for the level.
    pub fn metadata(&mut self, level: GeographyLevel) -> Option<SnapshotMetadata> {
        let snapshot = self.cached_snapshot(level)?;
        Some(SnapshotMetadata {
            records: snapshot.records.len(),
            stale: !snapshot.is_fresh(Utc::now(), self.config.ttl),
            metric_ids: snapshot.metric_ids,
            fetched_at: snapshot.fetched_at,
        })
    }

    /// Returns the current snapshot for a level, hydrating the in-memory
    /// slot from disk on first access.
    fn cached_snapshot(&mut self, level: GeographyLevel) -> Option<DatasetSnapshot> {
        if let Some(snapshot) = self.current.get(&level) {
            return Some(snapshot.clone());
        }
        let snapshot = self.store.read(level)?;
        self.current.insert(level, snapshot.clone());
        Some(snapshot)
    }

    /// Persists a freshly fetched snapshot and replaces the in-memory slot.
    ///
    /// A failed disk write is logged, not fatal: the fresh data is still
    /// worth serving for the lifetime of this process.
    fn store_snapshot(&mut self, snapshot: &DatasetSnapshot) {
        if let Err(e) = self.store.write(snapshot) {
            warn!(
                level = snapshot.level.label(),
                error = %e,
                "failed to persist snapshot to cache"
            );
        }
        self.current.insert(snapshot.level, snapshot.clone());
    }
}

/// Resolves metric ids against the registry, failing on the first unknown
/// id. An empty list resolves to the full registry.
fn resolve_ids(metric_ids: &[&str]) -> Result<Vec<&'static MetricDef>, UnknownMetric> {
    if metric_ids.is_empty() {
        return Ok(metrics::all_metrics().iter().collect());
    }
    metric_ids.iter().map(|id| metrics::lookup(id)).collect()
}

/// Union of the requested metrics and whatever the cached snapshot already
/// covers, in registry order.
///
/// Refreshing with the union means cycling through metrics one at a time
/// broadens cache coverage instead of thrashing it. Cached ids no longer in
/// the registry are dropped (they cannot be fetched).
fn widened_metric_set(
    requested: &[&'static MetricDef],
    cached: Option<&DatasetSnapshot>,
) -> Vec<&'static MetricDef> {
    let mut wanted: BTreeSet<&str> = requested.iter().map(|m| m.id).collect();
    if let Some(snapshot) = cached {
        wanted.extend(snapshot.metric_ids.iter().map(String::as_str));
    }
    metrics::all_metrics()
        .iter()
        .filter(|metric| wanted.contains(metric.id))
        .collect()
}

/// Humanizes a snapshot age for display.
///
/// Negative ages (clock skew between writer and reader) read as "just now".
pub fn age_display(age: Duration) -> String {
    let minutes = age.num_minutes().max(0);
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / (24 * 60))
    }
}
