use std::path::PathBuf;

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Well-formed TOML carrying values the clock cannot use.
    #[error("invalid config: {0}")]
    InvalidData(String),
}

impl From<ec_core::ClockError> for ConfigError {
    fn from(e: ec_core::ClockError) -> Self {
        ConfigError::InvalidData(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
