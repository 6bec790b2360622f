//! On-disk configuration for the elastic clock: default location, timezone
//! override, integration step and drift policy.
//!
//! The file lives at `$EC_HOME/config.toml`, or `~/.elastic-clock/config.toml`
//! when `EC_HOME` is unset. A missing file is the default configuration.

pub mod config;
pub mod error;

pub use config::{
    CONFIG_FILE, Config, DriftConfig, HOME_ENV, IntegrationConfig, LocationConfig, ZoneConfig,
    config_path, default_base_dir,
};
pub use error::{ConfigError, Result};
