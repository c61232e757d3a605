//! Configuration loading and resolution.
//!
//! A TOML config file is merged over hardcoded defaults, then overridden
//! by environment variables and finally CLI flags.

mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    default_settings_path, load_config_file, load_config_with_precedence, merge_config,
    CliOverrides, ConfigError, ConfigFile, ResolvedConfig,
};
