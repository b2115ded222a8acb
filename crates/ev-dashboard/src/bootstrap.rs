use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name of the Washington State DOL export.
pub const DATA_FILE_NAME: &str = "Electric_Vehicle_Population_Data.csv";

/// Log file used by the terminal dashboard when `--log-file` is absent.
pub const DEFAULT_LOG_FILE: &str = "ev-dashboard.log";

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `~/.ev-dashboard`
pub fn app_dir() -> PathBuf {
    app_dir_in(&home_dir())
}

fn app_dir_in(home: &Path) -> PathBuf {
    home.join(".ev-dashboard")
}

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.ev-dashboard/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.ev-dashboard/`
/// - `~/.ev-dashboard/logs/`
/// - `~/.ev-dashboard/cache/`
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    ensure_directories_in(&home_dir())
}

/// Same as [`ensure_directories`], rooted at `home`.
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<PathBuf> {
    let dir = app_dir_in(home);
    for sub in [dir.clone(), dir.join("logs"), dir.join("cache")] {
        std::fs::create_dir_all(&sub)
            .with_context(|| format!("creating {}", sub.display()))?;
    }
    Ok(dir)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto a tracing filter directive.
///
/// `--debug` wins over the level name.  Unknown names pass through so that
/// full `EnvFilter` directives (e.g. `ev_runtime=trace`) also work.
pub fn filter_directive(log_level: &str, debug: bool) -> String {
    if debug {
        return "debug".to_string();
    }
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Where log output goes for a given view.
///
/// An explicit `--log-file` always wins.  The terminal dashboard otherwise
/// logs to `~/.ev-dashboard/logs/ev-dashboard.log` so output does not
/// corrupt the screen; other views log to stderr (`None`).
pub fn log_destination(view: &str, log_file: Option<&Path>, app_dir: &Path) -> Option<PathBuf> {
    match log_file {
        Some(path) => Some(path.to_path_buf()),
        None if view == "dashboard" => Some(app_dir.join("logs").join(DEFAULT_LOG_FILE)),
        None => None,
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Writes to `destination` (appending, without ANSI colours) when given,
/// otherwise to stderr.
pub fn setup_logging(directive: &str, destination: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    match destination {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
    }

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the dataset CSV when no source flag was given.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `./public/data/Electric_Vehicle_Population_Data.csv`
/// 2. `./data/Electric_Vehicle_Population_Data.csv`
/// 3. `~/.ev-dashboard/data/Electric_Vehicle_Population_Data.csv`
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover_data_path_in(&cwd, &home_dir())
}

pub fn discover_data_path_in(cwd: &Path, home: &Path) -> Option<PathBuf> {
    data_path_candidates(cwd, home)
        .into_iter()
        .find(|p| p.is_file())
}

/// Candidate dataset locations in lookup order.
pub fn data_path_candidates(cwd: &Path, home: &Path) -> [PathBuf; 3] {
    [
        cwd.join("public").join("data").join(DATA_FILE_NAME),
        cwd.join("data").join(DATA_FILE_NAME),
        app_dir_in(home).join("data").join(DATA_FILE_NAME),
    ]
}

// ── Tests ──────────────────────────────────────────────────────────────────────
