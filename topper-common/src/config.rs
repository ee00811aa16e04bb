//! Configuration loading and data directory resolution
//!
//! Bootstrap settings come from an optional TOML file. A missing file is not
//! an error: built-in defaults are used and a warning is logged.
//!
//! # Data directory priority
//!
//! 1. Command-line argument
//! 2. `TOPPER_DATA_DIR` environment variable
//! 3. `data_dir` in the TOML config file
//! 4. Compiled default (`./data`)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TOPPER_DATA_DIR";
/// Environment variable pointing at the TOML config file
pub const CONFIG_PATH_ENV: &str = "TOPPER_CONFIG";
/// Compiled default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Directory holding `items.json` and `ratings.json`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[serde(default)]
    pub bind_addr: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Directory with the static frontend
    #[serde(default)]
    pub public_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub rate_limits: RateLimitConfig,
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

/// Per-client request limits, per minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_api_per_minute")]
    pub api_per_minute: u32,
    #[serde(default = "default_ratings_per_minute")]
    pub ratings_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            api_per_minute: default_api_per_minute(),
            ratings_per_minute: default_ratings_per_minute(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_per_minute() -> u32 {
    100
}

fn default_ratings_per_minute() -> u32 {
    10
}

impl TomlConfig {
    /// Parse a config file; a missing or malformed file is an error here
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Config file location: `explicit`, then `TOPPER_CONFIG`, then the
    /// platform config directory (`<config_dir>/topper/config.toml`)
    ///
    /// The returned path may not exist.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(default_config_path)
    }

    /// Load the config file if there is one, else fall back to defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match Self::locate(explicit) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("No config directory on this platform, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limits.api_per_minute == 0 {
            return Err(Error::Config(
                "rate_limits.api_per_minute must be greater than 0".to_string(),
            ));
        }
        if self.rate_limits.ratings_per_minute == 0 {
            return Err(Error::Config(
                "rate_limits.ratings_per_minute must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform config file location, e.g. `~/.config/topper/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("topper").join("config.toml"))
}

/// Resolve the data directory by priority (see module docs)
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.data_dir {
        return path.clone();
    }

    // Priority 4: Compiled default
    PathBuf::from(DEFAULT_DATA_DIR)
}
