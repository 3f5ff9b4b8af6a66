//! Configuration management for ridehail.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "ridehail";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "ridehail.db";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "RIDEHAIL_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `RIDEHAIL_`, sections separated by
///    a double underscore, e.g. `RIDEHAIL_MATCHING__RESPECT_DRIVER_AVAILABILITY`)
/// 2. TOML config file at `~/.config/ridehail/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Driver matching configuration.
    pub matching: MatchingConfig,
    /// Ride lifecycle configuration.
    pub rides: RidesConfig,
    /// Demo data configuration.
    pub seed: SeedConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/ridehail/ridehail.db`
    pub database_path: Option<PathBuf>,
}

/// Which rides a driver gets offered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Hide open ride requests from drivers marked unavailable.
    ///
    /// Off by default: open requests are offered regardless of the flag.
    /// Rides already assigned to a driver stay visible to them either way.
    pub respect_driver_availability: bool,
}

/// Ride lifecycle rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidesConfig {
    /// Clear the ride's driver when a driver rejects it.
    ///
    /// Off by default: a rejected ride keeps whatever driver id it had.
    pub clear_driver_on_reject: bool,
    /// Refuse ride requests from passenger ids that are not registered.
    pub require_known_passenger: bool,
}

/// Demo data configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Populate an empty store with demo users and rides on startup.
    pub demo_data: bool,
}

impl Default for RidesConfig {
    fn default() -> Self {
        Self {
            clear_driver_on_reject: false,
            require_known_passenger: true,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { demo_data: true }
    }
}

impl Config {
    /// Load configuration from all sources, reading the TOML file at
    /// `config_path` or at [`Self::default_config_path`] when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "storage.database_path must not be empty".to_string(),
                });
            }
            if path.is_dir() {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "storage.database_path points at a directory: {}",
                        path.display()
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}
