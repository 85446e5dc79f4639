use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_TRAINER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Keys `config set` accepts.
pub const KNOWN_KEYS: [&str; 4] = ["trainer_url", "database", "timeout_secs", "log"];

/// Flat key/value settings stored as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

impl Config {
    /// `<config_dir>/fitpal/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("fitpal").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, text).map_err(write_err)
    }

    /// Validate and store a value. Unknown keys and bad values leave the
    /// map untouched.
    pub fn set(&mut self, key: &str, val: &str) -> Result<(), ConfigError> {
        if !KNOWN_KEYS.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let valid = match key {
            "trainer_url" => val.starts_with("http://") || val.starts_with("https://"),
            "timeout_secs" => val.parse::<u64>().is_ok_and(|n| n > 0),
            _ => !val.is_empty(),
        };
        if !valid {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: val.to_string(),
            });
        }

        self.map.insert(key.to_string(), val.to_string());
        Ok(())
    }

    pub fn trainer_url(&self) -> &str {
        self.map
            .get("trainer_url")
            .map(String::as_str)
            .unwrap_or(DEFAULT_TRAINER_URL)
    }

    pub fn timeout(&self) -> Duration {
        let secs = self
            .map
            .get("timeout_secs")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// `database` if set, otherwise `<data_dir>/fitpal/fitpal.db`, falling
    /// back to the working directory.
    pub fn database(&self) -> PathBuf {
        if let Some(db) = self.map.get("database") {
            return PathBuf::from(db);
        }
        dirs::data_dir()
            .map(|d| d.join("fitpal").join("fitpal.db"))
            .unwrap_or_else(|| PathBuf::from("./fitpal.db"))
    }

    pub fn log_filter(&self) -> &str {
        self.map
            .get("log")
            .map(String::as_str)
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}
