//! Bootstrap configuration loading
//!
//! TOML bootstrap file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `DEEPAGE_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/deepage/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! A missing or absent config file is never fatal: a warning is logged and
//! compiled defaults are used. A file that exists but fails to parse is an
//! error, since silently ignoring it would hide a typo.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::params::EngineParams;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "DEEPAGE_CONFIG";

/// Environment variable holding the inference API key
pub const API_KEY_ENV_VAR: &str = "DEEPAGE_INFERENCE_API_KEY";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// SQLite database holding the `settings` key/value table (optional)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub engine: EngineParams,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// External inference service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model variants tried in order; empty disables external inference
    #[serde(default)]
    pub models: Vec<String>,

    /// API key (the environment variable takes priority)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Outbound request budget shared by all variants
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: Vec::new(),
            api_key: None,
            requests_per_minute: default_requests_per_minute(),
            temperature: default_temperature(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_temperature() -> f32 {
    0.2
}

/// Resolve which config file to read, if any
///
/// Returns `None` when no candidate exists (compiled defaults apply).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("deepage").join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    config.engine.validate()?;
    Ok(config)
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This path was requested but does not exist; compiled defaults apply
    Missing(PathBuf),
    /// No config file anywhere; compiled defaults apply
    Defaults,
}

impl ConfigSource {
    /// Log how configuration was resolved
    ///
    /// Config is read before the subscriber exists (it decides the log
    /// level), so callers report the outcome once logging is installed.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration"),
            ConfigSource::Missing(path) => {
                warn!(path = %path.display(), "Config file not found, using compiled defaults")
            }
            ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
        }
    }
}

/// Resolve and load configuration, degrading to defaults when no file exists
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    match resolve_config_path(cli_arg) {
        Some(path) if path.exists() => {
            let config = load_toml_config(&path)?;
            Ok((config, ConfigSource::File(path)))
        }
        Some(path) => Ok((TomlConfig::default(), ConfigSource::Missing(path))),
        None => Ok((TomlConfig::default(), ConfigSource::Defaults)),
    }
}

impl TomlConfig {
    /// Inference API key: environment first, then TOML; blank keys are ignored
    pub fn resolve_api_key(&self) -> Option<String> {
        let env_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if env_key.is_some() {
            if self.inference.api_key.is_some() {
                warn!("Inference API key found in environment and TOML; using environment");
            }
            return env_key;
        }
        self.inference
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
    }
}
