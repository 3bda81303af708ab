//! Process-level configuration for the task list core.
//!
//! # Responsibility
//! - Resolve store path and logging settings from the environment.
//! - Fall back to temp-dir defaults when a variable is unset or blank.
//!
//! # Invariants
//! - A resolved `log_level` is always one accepted by `init_logging`.
//! - A resolved `log_dir` is always absolute.

use crate::db::{open_db, DbResult};
use crate::logging::{default_log_level, normalize_level};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKLIST_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKLIST_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKLIST_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "tasklist-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_ENV}: {message}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "{LOG_DIR_ENV} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved settings used to open the store and start logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl CoreConfig {
    /// Reads `TASKLIST_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let db_path = value(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match value(LOG_LEVEL_ENV) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = value(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Opens (creating when missing) and migrates the store at `db_path`.
    pub fn open_store(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.log_level, default_log_level());
        assert!(config.db_path.ends_with("tasklist.sqlite3"));
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            CoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "   "), (LOG_LEVEL_ENV, "")]))
                .unwrap();

        assert!(config.db_path.ends_with("tasklist.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn explicit_values_are_trimmed_and_normalized() {
        let log_dir = std::env::temp_dir().join("tasklist-config-test");
        let log_dir_str = log_dir.to_str().unwrap().to_string();
        let config = CoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /var/lib/tasks.db "),
            (LOG_LEVEL_ENV, "WARNING"),
            (LOG_DIR_ENV, log_dir_str.as_str()),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/tasks.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, log_dir);
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(LOG_LEVEL_ENV, "verbose")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(message) if message.contains("verbose")));
    }

    #[test]
    fn open_store_uses_configured_db_path() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("configured.sqlite3");
        let db_path_str = db_path.to_str().unwrap().to_string();
        let config =
            CoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, db_path_str.as_str())])).unwrap();

        let conn = config.open_store().unwrap();
        let tasks: i64 = conn
            .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
            .unwrap();

        assert_eq!(tasks, 0);
        assert!(db_path.exists());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(LOG_DIR_ENV, "logs/dev")])).unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir(PathBuf::from("logs/dev")));
    }
}
