//! Data-acquisition boundary.
//!
//! A [`DataSource`] produces the raw record table.  The caller picks the
//! implementation (local CSV file, remote JSON endpoint, fixed rows) and the
//! rest of the pipeline never knows which one it got.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ev_core::error::{DashboardError, Result};
use ev_core::models::VehicleRecord;
use ev_data::reader::{decode_json_rows, load_csv_file};
use serde::Deserialize;
use tracing::debug;

/// Message used when a failed HTTP response carries no `error` field.
pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch data";

/// Default timeout for [`HttpSource`] requests.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Produces the raw record table.
///
/// Implementations block; async callers run them on
/// `tokio::task::spawn_blocking`.
pub trait DataSource: Send + Sync {
    /// Fetch every record from the source.
    fn fetch_raw_records(&self) -> Result<Vec<VehicleRecord>>;

    /// Short human-readable description, shown in headers and logs.
    fn describe(&self) -> String;
}

// ── CsvFileSource ─────────────────────────────────────────────────────────────

/// Reads the dataset from a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvFileSource {
    fn fetch_raw_records(&self) -> Result<Vec<VehicleRecord>> {
        load_csv_file(&self.path)
    }

    fn describe(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

// ── HttpSource ────────────────────────────────────────────────────────────────

/// Fetches decoded rows as a JSON array from a remote endpoint, typically
/// another instance's `/api/ev-data`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DataSource for HttpSource {
    fn fetch_raw_records(&self) -> Result<Vec<VehicleRecord>> {
        // The blocking client owns an internal runtime, so it is built per
        // call on the caller's (blocking) thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| DashboardError::Fetch(e.to_string()))?;

        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| DashboardError::Fetch(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| DashboardError::Fetch(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| DEFAULT_FETCH_ERROR.to_string());
            return Err(DashboardError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let records = decode_json_rows(&body)?;
        debug!("Fetched {} records from {}", records.len(), self.url);
        Ok(records)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ── MemorySource ──────────────────────────────────────────────────────────────

/// Serves a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<VehicleRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<VehicleRecord>) -> Self {
        Self { records }
    }
}

impl DataSource for MemorySource {
    fn fetch_raw_records(&self) -> Result<Vec<VehicleRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
