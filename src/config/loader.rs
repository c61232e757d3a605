//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permissions, encoding).
    #[error("failed to read config file at {path:?}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("invalid TOML in {path:?}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are
/// used. Corresponds to `~/.config/streamchat/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to the muted-user settings document.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,

    /// Path to the log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Comment pool capacity.
    #[serde(default)]
    pub pool_capacity: Option<usize>,

    /// Free-slot margin that triggers batched eviction.
    #[serde(default)]
    pub eviction_margin: Option<usize>,

    /// Demo feed cadence in milliseconds.
    #[serde(default)]
    pub demo_interval_ms: Option<u64>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Path to the muted-user settings document.
    pub settings_path: PathBuf,
    /// Path to the log file for tracing output.
    pub log_file_path: PathBuf,
    /// Comment pool capacity.
    pub pool_capacity: usize,
    /// Free-slot margin that triggers batched eviction.
    pub eviction_margin: usize,
    /// Demo feed cadence in milliseconds.
    pub demo_interval_ms: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            log_file_path: default_log_path(),
            pool_capacity: crate::state::DEFAULT_CAPACITY,
            eviction_margin: crate::state::DEFAULT_EVICTION_MARGIN,
            demo_interval_ms: 900,
        }
    }
}

/// CLI flag values that may override the resolved config.
///
/// `None` fields were not passed and leave the config untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--settings` flag.
    pub settings_path: Option<PathBuf>,
    /// `--capacity` flag.
    pub pool_capacity: Option<usize>,
    /// `--demo-interval-ms` flag.
    pub demo_interval_ms: Option<u64>,
}

/// Resolve the default settings document path.
///
/// Returns `~/.config/streamchat/settings.xml` on Unix-like systems.
/// Falls back to the current directory if the config directory cannot
/// be determined.
pub fn default_settings_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("streamchat").join("settings.xml")
    } else {
        PathBuf::from("settings.xml")
    }
}

/// Resolve the default log file path.
///
/// Returns `~/.local/state/streamchat/streamchat.log` on Unix-like
/// systems, or the platform equivalent elsewhere. The TUI owns the
/// terminal, so logs never go to stderr.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("streamchat").join("streamchat.log")
    } else {
        PathBuf::from("streamchat.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - use
/// defaults). Returns `Err` if the file exists but cannot be read or
/// parsed.
///
/// # Errors
///
/// Returns an error if the file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve the default config file path.
///
/// Returns `~/.config/streamchat/config.toml` on Unix, the platform
/// equivalent elsewhere, or `None` if no config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("streamchat").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `STREAMCHAT_CONFIG` environment variable
/// 3. Default path `~/.config/streamchat/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns an error only if a config file exists but cannot be read or
/// parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("STREAMCHAT_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise
/// use the default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        settings_path: config.settings_path.unwrap_or(defaults.settings_path),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        pool_capacity: config.pool_capacity.unwrap_or(defaults.pool_capacity),
        eviction_margin: config.eviction_margin.unwrap_or(defaults.eviction_margin),
        demo_interval_ms: config.demo_interval_ms.unwrap_or(defaults.demo_interval_ms),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `STREAMCHAT_SETTINGS`: override the settings document path
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var("STREAMCHAT_SETTINGS") {
        config.settings_path = PathBuf::from(path);
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only flags the user actually passed take effect.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(path) = overrides.settings_path {
        config.settings_path = path;
    }
    if let Some(capacity) = overrides.pool_capacity {
        config.pool_capacity = capacity;
    }
    if let Some(interval) = overrides.demo_interval_ms {
        config.demo_interval_ms = interval;
    }

    config
}
