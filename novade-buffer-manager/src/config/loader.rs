//! Loading and validating [`BufferManagerConfig`].

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::types::BufferManagerConfig;
use crate::error::ConfigError;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the configuration from a TOML file.
    ///
    /// A missing file yields the default configuration. An empty file is treated the
    /// same way. The result is validated and normalized with [`Self::validate`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReadError`] if the file exists but cannot be read.
    /// - [`ConfigError::ParseError`] if the content is not valid for the schema.
    /// - [`ConfigError::ValidationError`] if a value is out of range.
    pub fn load_from_path(path: &Path) -> Result<BufferManagerConfig, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::load_from_str(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No configuration at {:?}, using defaults", path);
                Self::validate(BufferManagerConfig::default())
            }
            Err(source) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses and validates a TOML document.
    pub fn load_from_str(content: &str) -> Result<BufferManagerConfig, ConfigError> {
        let config = if content.trim().is_empty() {
            BufferManagerConfig::default()
        } else {
            toml::from_str(content)?
        };
        Self::validate(config)
    }

    /// Checks value ranges and lowercases the logging level and format.
    pub fn validate(mut config: BufferManagerConfig) -> Result<BufferManagerConfig, ConfigError> {
        config.logging.level = config.logging.level.to_lowercase();
        if !VALID_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}",
                config.logging.level
            )));
        }

        config.logging.format = config.logging.format.to_lowercase();
        if !VALID_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log format: {}",
                config.logging.format
            )));
        }

        if config.pool.memfd_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "pool.memfd_name must not be empty".to_string(),
            ));
        }
        if config.pool.memfd_name.contains('\0') {
            return Err(ConfigError::ValidationError(
                "pool.memfd_name must not contain NUL bytes".to_string(),
            ));
        }
        if config.pool.max_idle_buffers == Some(0) {
            return Err(ConfigError::ValidationError(
                "pool.max_idle_buffers must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}
