use std::path::{Path, PathBuf};
use std::{env, fs};

use ec_core::constants::{DEFAULT_DRIFT_CHECK_EVERY, DEFAULT_STEP_SECS};
use ec_core::{FixedZone, GeoPosition, NauticalZones, ResolvedZone, Settings, TimezoneResolver};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "EC_HOME";
pub const CONFIG_FILE: &str = "config.toml";

/// Base directory for elastic clock files: `$EC_HOME`, else `~/.elastic-clock`.
pub fn default_base_dir() -> PathBuf {
    env::var_os(HOME_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs_home().join(".elastic-clock"))
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn config_path(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A fixed timezone used instead of the longitude-based guess.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: String,
    pub utc_offset_hours: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Bucket length used when anchoring, in seconds.
    pub step_seconds: u32,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            step_seconds: DEFAULT_STEP_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Measure drift every this many ticks; 0 disables it.
    pub check_every_ticks: u64,
    /// Re-anchor mid-run once drift exceeds this. Unset means never.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reanchor_threshold_secs: Option<f64>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            check_every_ticks: DEFAULT_DRIFT_CHECK_EVERY,
            reanchor_threshold_secs: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<ZoneConfig>,
    pub integration: IntegrationConfig,
    pub drift: DriftConfig,
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        tracing::info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Check every value converts into its core counterpart.
    pub fn validate(&self) -> Result<()> {
        self.position()?;
        if let Some(zone) = &self.timezone {
            zone.resolved()?;
        }
        self.settings()?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Store a new default location.
    pub fn set_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        name: Option<String>,
    ) -> Result<()> {
        GeoPosition::new(latitude, longitude)?;
        self.location = Some(LocationConfig {
            latitude,
            longitude,
            name,
        });
        Ok(())
    }

    /// Store a fixed timezone, replacing the longitude-based guess.
    pub fn set_timezone(&mut self, id: String, utc_offset_hours: f64) -> Result<()> {
        let zone = ZoneConfig {
            id,
            utc_offset_hours,
        };
        zone.resolved()?;
        self.timezone = Some(zone);
        Ok(())
    }

    /// Configured location, or Paris.
    pub fn position(&self) -> Result<GeoPosition> {
        match &self.location {
            Some(loc) => Ok(GeoPosition::new(loc.latitude, loc.longitude)?),
            None => Ok(GeoPosition::paris()),
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings = Settings {
            step_secs: self.integration.step_seconds,
            drift_check_every: self.drift.check_every_ticks,
            reanchor_threshold_secs: self.drift.reanchor_threshold_secs,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// The configured fixed zone, or nautical zones from longitude.
    pub fn resolver(&self) -> Result<Box<dyn TimezoneResolver + Send + Sync>> {
        match &self.timezone {
            Some(zone) => Ok(Box::new(FixedZone::new(zone.resolved()?))),
            None => Ok(Box::new(NauticalZones)),
        }
    }
}

impl ZoneConfig {
    pub fn resolved(&self) -> Result<ResolvedZone> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::InvalidData("timezone id must not be empty".to_string()));
        }
        Ok(ResolvedZone::from_hours(self.id.clone(), self.utc_offset_hours)?)
    }
}
