use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/pageswap/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("pageswap").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - No protocol header or storage key is empty
    /// - Transport timeouts are non-zero
    /// - The transport base URL parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.protocol;
        let names = [
            ("signature_header", &p.signature_header),
            ("location_header", &p.location_header),
            ("version_header", &p.version_header),
            ("partial_component_header", &p.partial_component_header),
            ("partial_data_header", &p.partial_data_header),
            ("partial_except_header", &p.partial_except_header),
            ("error_bag_header", &p.error_bag_header),
            ("location_visit_key", &p.location_visit_key),
        ];
        if let Some((field, _)) = names.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                message: format!("protocol.{} must not be empty", field),
            });
        }

        if self.transport.timeout_seconds == 0 || self.transport.connect_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "transport timeouts must be greater than zero".to_string(),
            });
        }

        if let Err(e) = url::Url::parse(&self.transport.base_url) {
            return Err(ConfigError::ValidationError {
                message: format!("transport.base_url '{}' is invalid: {}", self.transport.base_url, e),
            });
        }

        Ok(())
    }
}
