//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve data, mirror and log locations from defaults and environment.
//!
//! # Invariants
//! - `data_dir` is absolute; the log directory derives from it.
//! - The mirror region lives outside the database so the companion process
//!   can read it without opening the store.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_FILE: &str = "intentions.sqlite3";
pub const DEFAULT_MIRROR_GROUP: &str = "group.weeklyintention";
/// Registered identity of the companion surface.
pub const WIDGET_KIND: &str = "WeeklyIntentionWidget";

pub const HOME_ENV: &str = "WEEKLY_INTENTION_HOME";
pub const LOG_LEVEL_ENV: &str = "WEEKLY_INTENTION_LOG";

const SHARED_DIR_NAME: &str = "shared";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeDataDir(PathBuf),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeDataDir(path) => {
                write!(f, "data dir must be absolute, got `{}`", path.display())
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub mirror_group: String,
    pub widget_kind: String,
    pub log_level: String,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.into();
        if !data_dir.is_absolute() {
            return Err(ConfigError::RelativeDataDir(data_dir));
        }
        Ok(Self {
            data_dir,
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            mirror_group: DEFAULT_MIRROR_GROUP.to_string(),
            widget_kind: WIDGET_KIND.to_string(),
            log_level: default_log_level().to_string(),
        })
    }

    /// Defaults with `WEEKLY_INTENTION_HOME` / `WEEKLY_INTENTION_LOG`
    /// overrides from the process environment.
    pub fn from_env(default_data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_lookup(default_data_dir, |key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable lookup.
    pub fn from_lookup(
        default_data_dir: impl Into<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let data_dir = lookup(HOME_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir.into());
        let mut config = Self::new(data_dir)?;

        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&level)
                .map_err(ConfigError::InvalidLogLevel)?
                .to_string();
        }
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    /// Root under which the shared mirror region `mirror_group` lives.
    pub fn mirror_root(&self) -> PathBuf {
        self.data_dir.join(SHARED_DIR_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
