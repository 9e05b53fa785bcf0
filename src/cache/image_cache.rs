use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use sha1::{Digest, Sha1};
use tracing::{debug, trace, warn};

use crate::error::{ChartError, ChartResult, FetchErrorKind};

use super::{HttpImageFetcher, ImageFetcher};

/// Runtime metrics exposed by [`ImageCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCacheConfig {
    pub timeout: Duration,
    pub extension: String,
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            extension: "jpg".to_owned(),
        }
    }
}

impl ImageCacheConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Lowercase hex SHA-1 of the URL string; the cache key of that URL.
#[must_use]
pub fn content_hash(url: &str) -> String {
    let digest = Sha1::digest(url.as_bytes());
    format!("{digest:x}")
}

/// Content-addressed, disk-persisted URL to local image cache.
///
/// Files are named `<sha1(url)>.<extension>` and never expire. A file that
/// exists at the computed path is always a complete download: bodies are
/// written to a temp file in the cache directory and renamed into place.
/// Failures are not remembered, so a later `resolve` retries.
pub struct ImageCache {
    dir: PathBuf,
    extension: String,
    fetcher: Box<dyn ImageFetcher>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("dir", &self.dir)
            .field("extension", &self.extension)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Creates a cache backed by a blocking HTTP fetcher.
    pub fn new(dir: impl Into<PathBuf>, config: ImageCacheConfig) -> ChartResult<Self> {
        let fetcher = HttpImageFetcher::new(config.timeout)?;
        Self::with_fetcher(dir, config.extension, fetcher)
    }

    pub fn with_fetcher(
        dir: impl Into<PathBuf>,
        extension: impl Into<String>,
        fetcher: impl ImageFetcher + 'static,
    ) -> ChartResult<Self> {
        let extension = extension.into();
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ChartError::InvalidData(format!(
                "image extension `{extension}` must be non-empty ascii alphanumeric"
            )));
        }
        Ok(Self {
            dir: dir.into(),
            extension,
            fetcher: Box::new(fetcher),
            key_locks: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Local path `url` resolves to, whether or not it is cached yet.
    #[must_use]
    pub fn cache_path(&self, url: &str) -> PathBuf {
        self.path_for_hash(&content_hash(url))
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.cache_path(url).is_file()
    }

    #[must_use]
    pub fn stats(&self) -> ImageCacheStats {
        ImageCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Resolves `url` to a local file, fetching it on first reference.
    ///
    /// Cached URLs return without network access. Concurrent calls for the
    /// same URL are serialized, so at most one fetch per URL is in flight.
    pub fn resolve(&self, url: &str) -> ChartResult<PathBuf> {
        let hash = content_hash(url);
        let path = self.path_for_hash(&hash);
        if path.is_file() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url, "image cache hit");
            return Ok(path);
        }

        let lock = self.key_lock(&hash);
        let outcome = {
            let _guard = lock.lock();
            self.resolve_locked(url, path)
        };
        self.release_key_lock(&hash, lock);
        outcome
    }

    /// Resolves every URL and reports each outcome in input order.
    pub fn prefetch<S: AsRef<str> + Sync>(&self, urls: &[S]) -> Vec<ChartResult<PathBuf>> {
        #[cfg(feature = "parallel-prefetch")]
        {
            use rayon::prelude::*;
            return urls
                .par_iter()
                .map(|url| self.resolve(url.as_ref()))
                .collect();
        }

        #[cfg(not(feature = "parallel-prefetch"))]
        {
            urls.iter().map(|url| self.resolve(url.as_ref())).collect()
        }
    }

    fn path_for_hash(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{hash}.{}", self.extension))
    }

    fn resolve_locked(&self, url: &str, path: PathBuf) -> ChartResult<PathBuf> {
        // Another caller may have finished the download while we waited.
        if path.is_file() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url, "image cache hit after wait");
            return Ok(path);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        match self.fetch_and_persist(url, &path) {
            Ok(()) => {
                debug!(url, path = %path.display(), "cached image");
                Ok(path)
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(url, error = %err, "image fetch failed");
                Err(err)
            }
        }
    }

    fn fetch_and_persist(&self, url: &str, path: &Path) -> ChartResult<()> {
        let io_error =
            |e: std::io::Error| ChartError::fetch(url, FetchErrorKind::Io(e.to_string()));

        let body = self
            .fetcher
            .fetch(url)
            .map_err(|kind| ChartError::fetch(url, kind))?;

        fs::create_dir_all(&self.dir).map_err(io_error)?;
        // Dropping the temp file on any early return removes it.
        let mut part = tempfile::Builder::new()
            .prefix(".fetch-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(io_error)?;
        part.write_all(&body).map_err(io_error)?;
        part.as_file().sync_all().map_err(io_error)?;
        part.persist(path).map_err(|e| io_error(e.error))?;
        Ok(())
    }

    fn key_lock(&self, hash: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock();
        Arc::clone(locks.entry(hash.to_owned()).or_default())
    }

    fn release_key_lock(&self, hash: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.key_locks.lock();
        // Clones are only taken under the table lock, so a lone table
        // reference means no caller holds or waits on this entry.
        if locks
            .get(hash)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(hash);
        }
    }
}
