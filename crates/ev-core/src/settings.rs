use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::FilterCriteria;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Electric vehicle population dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ev-dashboard",
    about = "Electric vehicle population dashboard",
    version
)]
pub struct Settings {
    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "summary", "serve"])]
    pub view: String,

    /// CSV dataset to load (discovered automatically if not specified)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Remote endpoint serving decoded rows as JSON (takes precedence over --data-file)
    #[arg(long)]
    pub data_url: Option<String>,

    /// Address the HTTP service binds to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port the HTTP service listens on
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Number of manufacturers shown in the top-makes chart (1-50)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub top_makes: u32,

    /// Seconds a loaded dataset is considered fresh
    #[arg(long, default_value = "30")]
    pub cache_ttl: u64,

    /// Initial manufacturer filter
    #[arg(long)]
    pub make: Option<String>,

    /// Initial vehicle type filter
    #[arg(long)]
    pub vehicle_type: Option<String>,

    /// Initial county filter
    #[arg(long)]
    pub county: Option<String>,

    /// Initial model year filter
    #[arg(long)]
    pub model_year: Option<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.ev-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_makes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".ev-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Failed to clear {}: {e}", config_path.display());
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path);

        // NOTE: clap keys arg ids by field name (underscores), not flag spelling.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top_makes") {
            if let Some(v) = last.top_makes.filter(|n| (1..=50).contains(n)) {
                settings.top_makes = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "port") {
            if let Some(v) = last.port {
                settings.port = v;
            }
        }
        // A source given on the command line replaces both persisted sources.
        let source_given = is_arg_explicitly_set(&matches, "data_file")
            || is_arg_explicitly_set(&matches, "data_url");
        if !source_given {
            settings.data_file = last.data_file;
            settings.data_url = last.data_url;
        }

        settings = settings.apply_debug();

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("Failed to persist settings to {}: {e}", config_path.display());
        }

        settings
    }

    /// The initial filter assembled from `--make`, `--vehicle-type`,
    /// `--county` and `--model-year`.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            make: self.make.clone(),
            vehicle_type: self.vehicle_type.clone(),
            county: self.county.clone(),
            model_year: self.model_year.clone(),
        }
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            data_file: s.data_file.clone(),
            data_url: s.data_url.clone(),
            top_makes: Some(s.top_makes),
            port: Some(s.port),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterField;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        list.iter().map(|s| std::ffi::OsString::from(*s)).collect()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            view: Some("serve".to_string()),
            data_file: Some(PathBuf::from("/srv/ev.csv")),
            data_url: None,
            top_makes: Some(5),
            port: Some(8080),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme, Some("dark".to_string()));
        assert_eq!(loaded.view, Some("serve".to_string()));
        assert_eq!(loaded.data_file, Some(PathBuf::from("/srv/ev.csv")));
        assert!(loaded.data_url.is_none());
        assert_eq!(loaded.top_makes, Some(5));
        assert_eq!(loaded.port, Some(8080));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
        // Clearing a missing file is not an error.
        LastUsedParams::clear_at(&path).expect("clear again");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).theme.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).view.is_none());
    }

    // ── Settings parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["ev-dashboard"]);
        assert_eq!(settings.view, "dashboard");
        assert!(settings.data_file.is_none());
        assert!(settings.data_url.is_none());
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.top_makes, 10);
        assert_eq!(settings.cache_ttl, 30);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert!(settings.criteria().is_empty());
    }

    #[test]
    fn test_settings_rejects_unknown_view() {
        assert!(Settings::try_parse_from(["ev-dashboard", "--view", "daily"]).is_err());
    }

    #[test]
    fn test_settings_top_makes_range() {
        assert!(Settings::try_parse_from(["ev-dashboard", "--top-makes", "0"]).is_err());
        assert!(Settings::try_parse_from(["ev-dashboard", "--top-makes", "51"]).is_err());
        let settings = Settings::parse_from(["ev-dashboard", "--top-makes", "5"]);
        assert_eq!(settings.top_makes, 5);
    }

    #[test]
    fn test_settings_criteria_from_flags() {
        let settings = Settings::parse_from([
            "ev-dashboard",
            "--make",
            "TESLA",
            "--vehicle-type",
            "Battery Electric Vehicle (BEV)",
            "--model-year",
            "2022",
        ]);
        let criteria = settings.criteria();
        assert_eq!(criteria.get(FilterField::Make), Some("TESLA"));
        assert_eq!(
            criteria.get(FilterField::VehicleType),
            Some("Battery Electric Vehicle (BEV)")
        );
        assert_eq!(criteria.get(FilterField::ModelYear), Some("2022"));
        assert!(criteria.get(FilterField::County).is_none());
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            view: Some("summary".to_string()),
            data_file: Some(PathBuf::from("/data/ev.csv")),
            top_makes: Some(7),
            port: Some(4000),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["ev-dashboard"]), &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.view, "summary");
        assert_eq!(settings.data_file, Some(PathBuf::from("/data/ev.csv")));
        assert_eq!(settings.top_makes, 7);
        assert_eq!(settings.port, 4000);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            port: Some(4000),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["ev-dashboard", "--theme", "light", "--port", "8081"]),
            &config_path,
        );
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.port, 8081);
    }

    #[test]
    fn test_load_with_last_used_explicit_url_drops_persisted_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            data_file: Some(PathBuf::from("/data/ev.csv")),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["ev-dashboard", "--data-url", "http://localhost:3000/api/ev-data"]),
            &config_path,
        );
        assert!(settings.data_file.is_none());
        assert_eq!(
            settings.data_url.as_deref(),
            Some("http://localhost:3000/api/ev-data")
        );
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(args(&["ev-dashboard", "--clear"]), &config_path);
        assert!(!config_path.exists(), "file must be gone after --clear");
        assert_eq!(settings.theme, "auto");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        let settings =
            Settings::load_with_last_used_impl(args(&["ev-dashboard", "--debug"]), &config_path);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_filters_are_not_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            args(&["ev-dashboard", "--make", "KIA"]),
            &config_path,
        );
        let settings = Settings::load_with_last_used_impl(args(&["ev-dashboard"]), &config_path);
        assert!(settings.make.is_none());
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            args(&["ev-dashboard", "--theme", "classic", "--top-makes", "3"]),
            &config_path,
        );
        assert!(config_path.exists(), "config file must be persisted after run");
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.theme, Some("classic".to_string()));
        assert_eq!(loaded.top_makes, Some(3));
    }
}
