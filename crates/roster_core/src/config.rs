//! Environment-driven configuration for roster hosts.
//!
//! All variables are read and validated up front so a bad value fails at
//! startup rather than on first use.
//!
//! | Variable           | Default                         |
//! |--------------------|---------------------------------|
//! | `ROSTER_DB_PATH`   | unset → in-memory database      |
//! | `ROSTER_LOG_LEVEL` | `debug` / `info` by build mode  |
//! | `ROSTER_LOG_DIR`   | unset → file logging disabled   |

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use std::fmt;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "ROSTER_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "ROSTER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ROSTER_LOG_DIR";

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Where the store lives and how it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// `None` keeps the whole store in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_path = non_empty(DB_PATH_VAR).map(PathBuf::from);

        let log_level = non_empty(LOG_LEVEL_VAR)
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_else(|| default_log_level().to_string());
        if !matches!(
            log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "warning" | "error"
        ) {
            return Err(ConfigError {
                field: LOG_LEVEL_VAR,
                message: format!("expected trace|debug|info|warn|error, got `{log_level}`"),
            });
        }

        let log_dir = non_empty(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(dir) = &log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError {
                    field: LOG_DIR_VAR,
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Starts file logging when a log directory is configured.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }

    /// Opens the configured store with migrations applied.
    pub fn open_store(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn values_are_read_and_normalized() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/roster.db"),
            (LOG_LEVEL_VAR, " WARN "),
            (LOG_DIR_VAR, "/tmp/roster-logs"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/roster.db")));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/roster-logs")));
    }

    #[test]
    fn unknown_level_fails_fast() {
        let err = CoreConfig::from_lookup(lookup_from(&[(LOG_LEVEL_VAR, "verbose")])).unwrap_err();
        assert_eq!(err.field, LOG_LEVEL_VAR);
    }

    #[test]
    fn relative_log_dir_fails_fast() {
        let err = CoreConfig::from_lookup(lookup_from(&[(LOG_DIR_VAR, "logs")])).unwrap_err();
        assert_eq!(err.field, LOG_DIR_VAR);
    }

    #[test]
    fn blank_db_path_means_in_memory() {
        let config = CoreConfig::from_lookup(lookup_from(&[(DB_PATH_VAR, "  ")])).unwrap();
        assert!(config.db_path.is_none());
        let conn = config.open_store().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM members;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
