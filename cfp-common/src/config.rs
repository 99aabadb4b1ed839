//! Bootstrap configuration for the CFP service
//!
//! Settings come from a TOML file and can be overridden from the command
//! line or environment. Priority order:
//!
//! 1. Command-line arguments (--port, --database)
//! 2. Environment variables (CFP_PORT, CFP_DATABASE)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! Everything here is read once at startup; restart to pick up changes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::cfp::CallForProposals;
use crate::rating::{RatingScheme, DEFAULT_RATING_SYSTEM};
use crate::{Error, Result};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5800;

/// Configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Rating scheme name. Kept as a raw value so a non-string entry
    /// degrades to the default scheme instead of failing the load.
    #[serde(default = "default_rating_system")]
    pub rating_system: toml::Value,

    /// Submission window. Without one, submissions are closed.
    #[serde(default = "closed_window")]
    pub cfp: CallForProposals,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Values from the command line or environment that win over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub rating_system: Option<String>,
    pub log_level: Option<String>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("cfp.db")
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_rating_system() -> toml::Value {
    toml::Value::String(DEFAULT_RATING_SYSTEM.to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn closed_window() -> CallForProposals {
    CallForProposals::new(None, DateTime::<Utc>::MIN_UTC)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            port: default_port(),
            rating_system: default_rating_system(),
            cfp: closed_window(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read and parse a TOML file
    pub async fn load(path: &Path) -> Result<Self> {
        let toml_str = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded TOML configuration from {:?}", path);

        Ok(config)
    }

    /// Load `path` if given, otherwise start from defaults, then apply overrides
    pub async fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path).await?,
            None => {
                warn!("No config file given, using built-in defaults");
                Self::default()
            }
        };

        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(database_path) = overrides.database_path {
            self.database_path = database_path;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(rating_system) = overrides.rating_system {
            self.rating_system = toml::Value::String(rating_system);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Scheme named by `rating_system`, falling back to yes/no
    pub fn rating_scheme(&self) -> RatingScheme {
        RatingScheme::from_config_value(&self.rating_system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
            database_path = "/var/lib/cfp/cfp.db"
            port = 6000
            rating_system = "onetoten"

            [cfp]
            start = "2026-01-01T00:00:00Z"
            end = "2026-12-31T23:59:59Z"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/cfp/cfp.db"));
        assert_eq!(config.port, 6000);
        assert_eq!(config.rating_scheme(), RatingScheme::OneToTen);
        assert_eq!(
            config.cfp.start,
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(config.cfp.end, Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.database_path, PathBuf::from("cfp.db"));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.rating_scheme(), RatingScheme::YesNo);
        assert!(!config.cfp.is_open());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_non_string_rating_system_falls_back() {
        for raw in ["rating_system = 1", "rating_system = true", "rating_system = false"] {
            let config = AppConfig::from_toml_str(raw).unwrap();
            assert_eq!(config.rating_scheme(), RatingScheme::YesNo, "{}", raw);
        }
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(
            AppConfig::from_toml_str("port = \"not a number\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[cfp]\nstart = \"2026-01-01T00:00:00Z\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AppConfig::from_toml_str("port = 6000\nrating_system = \"yesno\"").unwrap();
        config.apply(ConfigOverrides {
            port: Some(7000),
            rating_system: Some("onetoten".to_string()),
            ..Default::default()
        });
        assert_eq!(config.port, 7000);
        assert_eq!(config.rating_scheme(), RatingScheme::OneToTen);
        assert_eq!(config.database_path, PathBuf::from("cfp.db"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfp.toml");
        std::fs::write(&path, "port = 6100\n[cfp]\nend = \"2099-01-01T00:00:00Z\"\n").unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.port, 6100);
        assert!(config.cfp.is_open());

        let missing = AppConfig::load(&dir.path().join("missing.toml")).await;
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
