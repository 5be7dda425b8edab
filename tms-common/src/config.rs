//! Configuration loading and config file resolution
//!
//! All settings live in one optional TOML file. Every section and every
//! field has a built-in default, so an empty or missing file is valid.
//!
//! ```toml
//! [debounce]
//! typing_ms = 300
//! paste_ms = 100
//! idle_ms = 1000
//!
//! [search]
//! case_sensitive = false
//!
//! [follow]
//! poll_interval_ms = 250
//! paste_threshold = 32
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::debounce::DelayProfile;
use crate::search::SearchOptions;
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TMS_CONFIG";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Delay per debounce mode
    pub debounce: DelayProfile,
    /// Default search flags (command-line flags can only turn these on)
    pub search: SearchOptions,
    /// File watching for follow mode
    pub follow: FollowConfig,
    pub logging: LoggingConfig,
}

/// Follow-mode polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// How often the followed file is checked for changes
    pub poll_interval_ms: u64,
    /// Length change (in chars) at or above which an edit counts as a paste
    pub paste_threshold: usize,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            paste_threshold: 32,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    DefaultFile(PathBuf),
    BuiltIn,
}

impl ConfigSource {
    /// File the configuration was read from; `None` for built-in defaults
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(path)
            | ConfigSource::Environment(path)
            | ConfigSource::DefaultFile(path) => Some(path),
            ConfigSource::BuiltIn => None,
        }
    }
}

/// Platform config file location (`<config dir>/tms/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tms").join("config.toml"))
}

/// Config file resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config file, if it exists
/// 4. Built-in defaults (fallback)
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return ConfigSource::Environment(PathBuf::from(path));
    }

    // Priority 3: Platform config file
    if let Some(path) = default_config_path().filter(|p| p.exists()) {
        return ConfigSource::DefaultFile(path);
    }

    // Priority 4: Built-in defaults
    ConfigSource::BuiltIn
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a specific file
    ///
    /// # Errors
    /// [`Error::NotFound`] if the file does not exist, [`Error::TomlParse`]
    /// for malformed TOML, [`Error::Config`] for out-of-range values.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::NotFound(format!("Config file {}", path.display()))
            }
            _ => Error::Io(e),
        })?;

        let config = Self::from_toml_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve and load the active configuration
    ///
    /// A file named explicitly (command line or environment) must exist.
    /// When nothing is named and no platform file exists, built-in defaults
    /// are used.
    pub fn load(cli_arg: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let source = resolve_config_source(cli_arg);
        let config = match &source {
            ConfigSource::CommandLine(path)
            | ConfigSource::Environment(path)
            | ConfigSource::DefaultFile(path) => Self::load_from(path)?,
            ConfigSource::BuiltIn => {
                debug!("No config file found, using built-in defaults");
                Self::default()
            }
        };
        Ok((config, source))
    }

    /// Check values that deserialize fine but make no sense
    pub fn validate(&self) -> Result<()> {
        if self.follow.poll_interval_ms == 0 {
            return Err(Error::Config(
                "follow.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!(
                "logging.level '{}' is not one of {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
