//! Flat-file snapshot store
//!
//! One JSON file per geography level inside a configured directory
//! (default: the working directory).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

use crate::data::{DatasetSnapshot, GeographyLevel};

/// Flat-file store for the most recent snapshot per geography level
///
/// The store exclusively owns the cache files; callers go through
/// `read`/`write` and never touch the paths directly.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a store over the given cache directory.
    ///
    /// The directory is created on first write, not here, so read-only
    /// commands never leave empty directories behind.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Path of the cache file for a geography level.
    pub fn path_for(&self, level: GeographyLevel) -> PathBuf {
        self.cache_dir.join(level.cache_file_name())
    }

    /// Reads the cached snapshot for a geography level.
    ///
    /// Returns `None` when the file is missing, unreadable, or malformed.
    /// Malformed files are logged and left in place; the next successful
    /// write replaces them.
    pub fn read(&self, level: GeographyLevel) -> Option<DatasetSnapshot> {
        let path = self.path_for(level);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read cache file");
                return None;
            }
        };

        match serde_json::from_str::<DatasetSnapshot>(&contents) {
            Ok(snapshot) if snapshot.level == level => Some(snapshot),
            Ok(snapshot) => {
                warn!(
                    path = %path.display(),
                    found = snapshot.level.label(),
                    expected = level.label(),
                    "cache file holds the wrong geography level, ignoring"
                );
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed cache file");
                None
            }
        }
    }

    /// Writes a snapshot, replacing any prior file for its geography level.
    ///
    /// The snapshot is serialized to a temporary file in the same directory,
    /// synced, and renamed into place, so a concurrent reader never sees a
    /// partially written file.
    pub fn write(&self, snapshot: &DatasetSnapshot) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let path = self.path_for(snapshot.level);
        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string(snapshot)?;

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }
}
