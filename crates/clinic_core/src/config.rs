//! Registry configuration.
//!
//! # Responsibility
//! - Describe where the patient database lives and how logging behaves.
//! - Merge built-in defaults, an optional TOML file and environment overrides.
//!
//! # Invariants
//! - Configuration is passed explicitly to the connection provider; nothing in
//!   core reads connection settings from process-wide constants.
//! - Precedence is defaults < file < environment.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CLINIC_CONFIG";
pub const DB_PATH_ENV: &str = "CLINIC_DB_PATH";
pub const DB_BUSY_TIMEOUT_ENV: &str = "CLINIC_DB_BUSY_TIMEOUT_MS";
pub const LOG_LEVEL_ENV: &str = "CLINIC_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CLINIC_LOG_DIR";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "clinic.toml";

const DEFAULT_DB_FILE: &str = "clinic_registry.sqlite3";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_LOG_SUBDIR: &str = "clinic-registry-logs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to resolve the working directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Connection settings handed to [`crate::db::ConnectionProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: std::env::temp_dir().join(DEFAULT_LOG_SUBDIR),
        }
    }
}

/// Complete runtime configuration for the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    database: FileDatabaseSection,
    #[serde(default)]
    logging: FileLoggingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileDatabaseSection {
    path: Option<PathBuf>,
    busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLoggingSection {
    level: Option<String>,
    dir: Option<PathBuf>,
}

impl RegistryConfig {
    /// Loads configuration from `.env`, the config file and the environment.
    ///
    /// The file is `$CLINIC_CONFIG` when set, otherwise `clinic.toml` in the
    /// working directory if it exists.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let file = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = Self::default();
        if let Some(path) = file {
            config.apply_file(&path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;

        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        config.resolve_relative_paths(&cwd);
        Ok(config)
    }

    /// Overlays values present in a TOML config file.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.apply_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_toml(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        if let Some(path) = file.database.path {
            self.database.path = path;
        }
        if let Some(timeout) = file.database.busy_timeout_ms {
            self.database.busy_timeout_ms = timeout;
        }
        if let Some(level) = file.logging.level {
            self.logging.level = level;
        }
        if let Some(dir) = file.logging.dir {
            self.logging.dir = dir;
        }
        Ok(())
    }

    /// Overlays environment values read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = read(DB_PATH_ENV) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(raw) = read(DB_BUSY_TIMEOUT_ENV) {
            self.database.busy_timeout_ms =
                raw.trim()
                    .parse::<u64>()
                    .map_err(|err| ConfigError::InvalidEnv {
                        key: DB_BUSY_TIMEOUT_ENV,
                        value: raw.clone(),
                        reason: err.to_string(),
                    })?;
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
        if let Some(dir) = read(LOG_DIR_ENV) {
            self.logging.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Anchors a relative log directory at `base`.
    ///
    /// The logger only accepts absolute directories.
    pub fn resolve_relative_paths(&mut self, base: &Path) {
        if self.logging.dir.is_relative() {
            self.logging.dir = base.join(&self.logging.dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_database_file() {
        let config = RegistryConfig::default();
        assert_eq!(config.database.path, PathBuf::from("clinic_registry.sqlite3"));
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.logging.dir.is_absolute());
    }

    #[test]
    fn toml_overrides_only_the_keys_it_sets() {
        let mut config = RegistryConfig::default();
        config
            .apply_toml(
                r#"
                [database]
                path = "/var/lib/clinic/registry.db"
                "#,
            )
            .expect("valid toml");

        assert_eq!(
            config.database.path,
            PathBuf::from("/var/lib/clinic/registry.db")
        );
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let mut config = RegistryConfig::default();
        assert!(config.apply_toml("[database]\nhost = \"localhost\"\n").is_err());
    }

    #[test]
    fn env_wins_over_file_values() {
        let mut config = RegistryConfig::default();
        config
            .apply_toml("[database]\npath = \"from-file.db\"\n[logging]\nlevel = \"warn\"\n")
            .expect("valid toml");
        config
            .apply_env(env_from(&[
                (DB_PATH_ENV, "from-env.db"),
                (DB_BUSY_TIMEOUT_ENV, "250"),
                (LOG_LEVEL_ENV, ""),
            ]))
            .expect("valid env");

        assert_eq!(config.database.path, PathBuf::from("from-env.db"));
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn non_numeric_busy_timeout_is_rejected() {
        let mut config = RegistryConfig::default();
        let err = config
            .apply_env(env_from(&[(DB_BUSY_TIMEOUT_ENV, "soon")]))
            .expect_err("timeout must be numeric");
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { key, .. } if key == DB_BUSY_TIMEOUT_ENV
        ));
    }

    #[test]
    fn apply_file_reports_missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut config = RegistryConfig::default();
        let err = config
            .apply_file(&dir.path().join("absent.toml"))
            .expect_err("file is absent");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn relative_log_dir_from_env_is_anchored_at_base() {
        let base = tempfile::tempdir().expect("create temp dir");
        let mut config = RegistryConfig::default();
        config
            .apply_env(env_from(&[(LOG_DIR_ENV, "logs")]))
            .expect("valid env");
        assert!(config.logging.dir.is_relative());

        config.resolve_relative_paths(base.path());

        assert_eq!(config.logging.dir, base.path().join("logs"));
        assert!(config.logging.dir.is_absolute());
    }

    #[test]
    fn absolute_log_dir_is_left_alone() {
        let base = tempfile::tempdir().expect("create temp dir");
        let mut config = RegistryConfig::default();
        let before = config.logging.dir.clone();

        config.resolve_relative_paths(base.path());

        assert_eq!(config.logging.dir, before);
    }
}
