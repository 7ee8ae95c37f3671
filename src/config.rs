//! Configuration and on-disk layout.
//!
//! Everything lives in one home directory: `--home`, else `TASKBOARD_HOME`,
//! else `~/.taskboard`. It holds `tasks.json`, `session.json` and an optional
//! `config.json` with user preferences.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::{SortKey, WeekStart};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const TASKS_FILE_NAME: &str = "tasks.json";
pub const HOME_ENV: &str = "TASKBOARD_HOME";

/// User preferences. Missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub week_start: WeekStart,
    pub default_sort: SortKey,
}

impl Config {
    /// Read `config.json` from `home`, or defaults when it does not exist.
    pub fn load(home: &Path) -> Result<Config> {
        let path = home.join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        fs::create_dir_all(home).map_err(|e| Error::io(home, e))?;
        let path = home.join(CONFIG_FILE_NAME);
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data).map_err(|e| Error::io(&path, e))
    }
}

/// Resolve the home directory from an explicit flag, the environment, or `$HOME`.
pub fn resolve_home(flag: Option<&Path>) -> PathBuf {
    if let Some(p) = flag {
        return p.to_path_buf();
    }
    if let Ok(p) = env::var(HOME_ENV) {
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskboard")
}
