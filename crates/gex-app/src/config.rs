//! Application configuration.

use crate::error::{AppError, AppResult};
use gex_core::FilterSelection;
use gex_dashboard::DashboardConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file used when neither `--config` nor `GEX_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GEX_CONFIG";

/// Client preference file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

fn default_preferences_path() -> String {
    "data/preferences.json".to_string()
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Market data API root.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Auto-refresh period in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Initial filter selection.
    #[serde(default)]
    pub filter: FilterSelection,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_ms: default_request_timeout_ms(),
            filter: FilterSelection::default(),
            dashboard: DashboardConfig::default(),
            preferences: PreferencesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path resolution: `explicit` (CLI) > `GEX_CONFIG` > `config/default.toml`.
    /// Only a missing default file falls back to built-in defaults; an
    /// explicitly named file must exist.
    pub fn load(explicit: Option<&str>) -> AppResult<Self> {
        let named = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok());

        let config = match named {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                tracing::warn!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config {path}: {e}")))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Config("api_base_url must not be empty".to_string()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(AppError::Config(
                "refresh_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Config(
                "request_timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.dashboard.enabled && self.dashboard.max_connections == 0 {
            return Err(AppError::Config(
                "dashboard.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gex_core::{CustomerFilter, ExpiryFilter};
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.filter, FilterSelection::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            api_base_url = "http://api.internal:9000/"

            [filter]
            expiry = "0dte"
            customer = "institutional"

            [dashboard]
            port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://api.internal:9000/");
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.filter.expiry, ExpiryFilter::ZeroDte);
        assert_eq!(config.filter.customer, CustomerFilter::Institutional);
        assert_eq!(config.dashboard.port, 9090);
        assert_eq!(config.dashboard.max_connections, 10);
        assert_eq!(config.preferences.path, "data/preferences.json");
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = AppConfig {
            refresh_interval_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let result = AppConfig::load(Some("/nonexistent/gex.toml"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval_secs = 15").unwrap();

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(15));
    }
}
