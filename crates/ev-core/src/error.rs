use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the EV dashboard.
///
/// Record-level anomalies never show up here: malformed cells are coerced to
/// `"Unknown"` or dropped from range statistics during aggregation.  Only the
/// data-acquisition boundary and the outer surfaces fail.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No dataset file was found at any of the candidate locations.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// The CSV reader failed below the record level (I/O, corrupt stream).
    #[error("Failed to decode CSV: {0}")]
    CsvDecode(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A remote data endpoint answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A remote data endpoint could not be reached.
    #[error("Failed to fetch data: {0}")]
    Fetch(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
