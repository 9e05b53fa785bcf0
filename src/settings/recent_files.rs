use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ChartError, ChartResult};

pub const DEFAULT_RECENT_FILES_CAPACITY: usize = 10;

const DEFAULT_STORE_FILE_NAME: &str = ".excel_viewer_history.json";

/// Most-recent-first history of opened table files, persisted as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFiles {
    store_path: PathBuf,
    entries: Vec<PathBuf>,
    capacity: usize,
}

impl RecentFiles {
    /// `$HOME/.excel_viewer_history.json`, or `None` when no home directory
    /// is known.
    #[must_use]
    pub fn default_store_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(DEFAULT_STORE_FILE_NAME))
    }

    /// Loads the history at `store_path`. A missing file is an empty history.
    pub fn load(store_path: impl Into<PathBuf>) -> ChartResult<Self> {
        Self::load_with_capacity(store_path, DEFAULT_RECENT_FILES_CAPACITY)
    }

    pub fn load_with_capacity(store_path: impl Into<PathBuf>, capacity: usize) -> ChartResult<Self> {
        if capacity == 0 {
            return Err(ChartError::InvalidData(
                "recent files capacity must be > 0".to_owned(),
            ));
        }
        let store_path = store_path.into();
        let mut entries = if store_path.exists() {
            let raw = fs::read_to_string(&store_path).map_err(|e| {
                ChartError::InvalidData(format!(
                    "failed to read recent files `{}`: {e}",
                    store_path.display()
                ))
            })?;
            serde_json::from_str::<Vec<PathBuf>>(&raw).map_err(|e| {
                ChartError::InvalidData(format!(
                    "failed to parse recent files `{}`: {e}",
                    store_path.display()
                ))
            })?
        } else {
            Vec::new()
        };
        entries.truncate(capacity);
        debug!(
            path = %store_path.display(),
            count = entries.len(),
            "loaded recent files"
        );
        Ok(Self {
            store_path,
            entries,
            capacity,
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Path> {
        self.entries.first().map(PathBuf::as_path)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Moves `path` to the front, trims to capacity and persists.
    pub fn record_open(&mut self, path: impl Into<PathBuf>) -> ChartResult<()> {
        let path = path.into();
        self.entries.retain(|entry| entry != &path);
        self.entries.insert(0, path);
        self.entries.truncate(self.capacity);
        self.save()
    }

    /// Removes `path` and persists. Returns whether it was present.
    pub fn forget(&mut self, path: &Path) -> ChartResult<bool> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != path);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Drops entries whose file no longer exists and persists when any were
    /// removed. Returns the removed paths.
    pub fn prune_missing(&mut self) -> ChartResult<Vec<PathBuf>> {
        let (kept, missing): (Vec<PathBuf>, Vec<PathBuf>) =
            self.entries.drain(..).partition(|entry| entry.exists());
        self.entries = kept;
        if !missing.is_empty() {
            warn!(count = missing.len(), "dropping missing recent files");
            self.save()?;
        }
        Ok(missing)
    }

    pub fn save(&self) -> ChartResult<()> {
        let json = serde_json::to_string(&self.entries).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize recent files: {e}"))
        })?;
        fs::write(&self.store_path, json).map_err(|e| {
            ChartError::InvalidData(format!(
                "failed to write recent files `{}`: {e}",
                self.store_path.display()
            ))
        })
    }
}
