//! Configuration for persona-settings
//!
//! Sources, highest precedence first:
//! 1. CLI arguments
//! 2. Environment variables (PERSONA_SETTINGS_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::api::HttpApiConfig;
use crate::error::{Error, Result};
use crate::rotation::SchedulerConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "PERSONA_SETTINGS_";

/// File name looked up in the current directory
const LOCAL_CONFIG_FILE: &str = "persona-settings.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Settings service connection
    pub api: HttpApiConfig,

    /// Rotation scheduler timing
    pub rotation: RotationSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Rotation scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSettings {
    /// How often the scheduler checks whether a rotation is due, in seconds
    pub tick_secs: u64,

    /// Retry budget for a failing load, in seconds
    pub retry_max_elapsed_secs: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            tick_secs: 60,
            retry_max_elapsed_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl RotationSettings {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick: Duration::from_secs(self.tick_secs),
            retry_max_elapsed: Duration::from_secs(self.retry_max_elapsed_secs),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match Self::find_config_file(config_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e),
            source: Some(e),
        })?;
        info!(path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // An explicit path must exist
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        for path in search_paths() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // API settings
        if let Some(val) = env_var("API_URL") {
            self.api.base_url = val;
        }
        if let Some(n) = env_var("API_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.api.timeout_secs = n;
        }

        // Rotation settings
        if let Some(n) = env_var("TICK_SECS").and_then(|v| v.parse().ok()) {
            self.rotation.tick_secs = n;
        }

        // Logging settings
        if let Some(val) = env_var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = env_var("LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Some(val) = env_var("LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = &self.api.base_url;
        if base_url.is_empty() {
            return Err(Error::config_field_invalid("api.base_url", "Service URL cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::config_field_invalid(
                "api.base_url",
                "Service URL must start with http:// or https://",
            ));
        }
        if let Err(e) = Url::parse(base_url) {
            return Err(Error::config_field_invalid(
                "api.base_url",
                format!("Invalid service URL '{}': {}", base_url, e),
            ));
        }

        for (field, path) in [
            ("api.personas_path", &self.api.personas_path),
            ("api.settings_path", &self.api.settings_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::config_field_invalid(field, "Path must start with /"));
            }
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::config_field_invalid("api.timeout_secs", "Timeout must be at least 1 second"));
        }
        if self.rotation.tick_secs == 0 {
            return Err(Error::config_field_invalid("rotation.tick_secs", "Tick must be at least 1 second"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Standard configuration locations, in lookup order
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("persona-settings").join("config.toml"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".persona-settings").join("config.toml"));
    }
    paths.push(PathBuf::from("/etc/persona-settings/config.toml"));
    paths
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Default location written by `config init`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".persona-settings")
        .join("config.toml")
}

/// Write a commented default configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Default configuration content with comments
fn generate_default_config() -> String {
    r#"# persona-settings configuration

[api]
# Settings service base URL (http:// or https://)
base_url = "http://localhost:3000"

# Personas collection path
personas_path = "/api/personas"

# Settings singleton path
settings_path = "/api/settings"

# Request timeout in seconds
timeout_secs = 30

[rotation]
# How often the scheduler checks whether a rotation is due (seconds)
tick_secs = 60

# Retry budget for a failing load (seconds, capped at one tick)
retry_max_elapsed_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.persona-settings/logs/persona-settings.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
