//! Runtime configuration for processes embedding the core.
//!
//! # Responsibility
//! - Resolve database location and logging settings.
//! - Apply environment overrides on top of documented defaults.
//!
//! # Invariants
//! - A resolved config always carries a normalized log level.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "POSTFEED_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "POSTFEED_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "POSTFEED_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "postfeed.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// SQLite database file. Defaults to `postfeed.sqlite3` in the working dir.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: &'static str,
    /// Rolling log directory. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// Blank values are ignored so that an exported-but-empty variable keeps
    /// the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = value(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path.trim());
        }
        if let Some(level) = value(LOG_LEVEL_ENV) {
            config.set_log_level(&level, LOG_LEVEL_ENV)?;
        }
        if let Some(dir) = value(LOG_DIR_ENV) {
            config.set_log_dir(&dir, LOG_DIR_ENV)?;
        }

        Ok(config)
    }

    pub fn set_log_level(&mut self, level: &str, key: &'static str) -> Result<(), ConfigError> {
        self.log_level =
            normalize_level(level).map_err(|message| ConfigError::InvalidValue { key, message })?;
        Ok(())
    }

    pub fn set_log_dir(&mut self, dir: &str, key: &'static str) -> Result<(), ConfigError> {
        self.log_dir = Some(
            normalize_log_dir(dir).map_err(|message| ConfigError::InvalidValue { key, message })?,
        );
        Ok(())
    }
}
