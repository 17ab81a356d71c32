//! Environment-driven settings for library processes.
//!
//! # Responsibility
//! - Resolve where the database and log files live.
//! - Pick the log level for the current build when none is configured.

use crate::logging::default_log_level;
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "BOOKSHELF_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "BOOKSHELF_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "BOOKSHELF_LOG_DIR";

const APPLICATION_NAME: &str = "bookshelf";
const DB_FILE_NAME: &str = "library.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const FALLBACK_DATA_DIR: &str = "data";

/// Process configuration for the library core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Directory receiving rolling log files.
    pub log_dir: PathBuf,
}

impl LibraryConfig {
    /// Loads configuration from environment variables.
    ///
    /// - `BOOKSHELF_DB_PATH` (default: `<data dir>/library.sqlite3`)
    /// - `BOOKSHELF_LOG_LEVEL` (default: `debug` in debug builds, else `info`)
    /// - `BOOKSHELF_LOG_DIR` (default: `<data dir>/logs`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let data_dir = default_data_dir();

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            log_level: value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(LOG_DIR_NAME)),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Platform data directory for the application, or `./data` when the
/// platform offers none.
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", APPLICATION_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_default()
                .join(FALLBACK_DATA_DIR)
        })
}
