//! TTL-cached data manager.
//!
//! Wraps a [`DataSource`] and the analysis pipeline with a configurable
//! time-to-live cache and transparent retry logic.  Callers use
//! [`DataManager::get_data`] to obtain a fresh-or-cached [`AnalysisResult`];
//! the manager handles staleness checks, up to three fetch attempts with
//! linear back-off, and fallback to the previous cache on failure.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use ev_core::error::{DashboardError, Result};
use ev_data::analysis::{analyze, AnalysisResult};

use crate::source::DataSource;

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Maximum number of fetch attempts before giving up.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// A [`DataManager`] shared between async tasks.
pub type SharedDataManager = Arc<Mutex<DataManager>>;

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around a data source and the analysis pipeline.
///
/// # Example
/// ```no_run
/// use ev_runtime::data_manager::DataManager;
/// use ev_runtime::source::CsvFileSource;
///
/// let mut mgr = DataManager::new(
///     Box::new(CsvFileSource::new("Electric_Vehicle_Population_Data.csv")),
///     30,
/// );
/// if let Ok(result) = mgr.get_data(false) {
///     println!("vehicles: {}", result.dataset.metrics.total_vehicles);
/// }
/// ```
pub struct DataManager {
    /// Where records come from.
    source: Box<dyn DataSource>,
    /// Maximum age of cached data before it is considered stale.
    cache_ttl: Duration,
    /// Most recently fetched analysis result.
    cache: Option<AnalysisResult>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(source: Box<dyn DataSource>, cache_ttl_secs: u64) -> Self {
        Self {
            source,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    /// Wrap into a [`SharedDataManager`].
    pub fn shared(self) -> SharedDataManager {
        Arc::new(Mutex::new(self))
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return analysis data, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed.  If every fetch
    /// attempt fails the previous cache, however stale, is returned; with no
    /// cache the last error is propagated.
    pub fn get_data(&mut self, force_refresh: bool) -> Result<&AnalysisResult> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached analysis result");
            return self
                .cache
                .as_ref()
                .ok_or_else(|| DashboardError::Fetch("cache is empty".to_string()));
        }

        match self.fetch_with_retry() {
            Ok(result) => {
                tracing::debug!(
                    records = result.metadata.records_processed,
                    source = %result.metadata.source,
                    "analysis cache updated"
                );
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                let cached: &AnalysisResult = self.cache.insert(result);
                Ok(cached)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                match self.cache.as_ref() {
                    Some(stale) => {
                        tracing::warn!(error = %e, "fetch failed; falling back to cached data");
                        Ok(stale)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Discard the current cache, forcing the next [`get_data`](Self::get_data)
    /// call to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if no data has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Description of the underlying source.
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    fn fetch_with_retry(&self) -> Result<AnalysisResult> {
        let mut last_err = None;

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match self.fetch_fresh() {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| DashboardError::Fetch("no fetch attempted".to_string())))
    }

    fn fetch_fresh(&self) -> Result<AnalysisResult> {
        let records = self.source.fetch_raw_records()?;
        Ok(analyze(records, &self.source.describe()))
    }
}

// ── Async access ──────────────────────────────────────────────────────────────

/// Run [`DataManager::get_data`] on the blocking pool and return an owned
/// copy of the result (the dataset itself is shared, not copied).
pub async fn load_shared(manager: &SharedDataManager, force_refresh: bool) -> Result<AnalysisResult> {
    let manager = Arc::clone(manager);
    tokio::task::spawn_blocking(move || {
        let mut guard = manager
            .lock()
            .map_err(|_| DashboardError::Other(anyhow::anyhow!("data manager lock poisoned")))?;
        guard.get_data(force_refresh).cloned()
    })
    .await
    .map_err(|e| DashboardError::Other(anyhow::anyhow!("load task failed: {e}")))?
}

// ── Tests ─────────────────────────────────────────────────────────────────────
