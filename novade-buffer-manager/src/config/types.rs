//! Configuration data structures.
//!
//! All structs reject unknown fields and fill missing ones from [`super::defaults`].

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use novade_buffer_manager::config::LoggingConfig;
///
/// let config: LoggingConfig = toml::from_str(r#"level = "debug""#).unwrap();
/// assert_eq!(config.level, "debug");
/// assert_eq!(config.file_path, None);
/// assert_eq!(config.format, "text");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level: "trace", "debug", "info", "warn" or "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional file receiving a daily-rotated copy of the log.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_log_level(),
            file_path: defaults::default_log_file_path(),
            format: defaults::default_log_format(),
        }
    }
}

/// Settings for [`crate::BufferPool`] and its shared-memory allocator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Label given to the memfd files backing each buffer.
    #[serde(default = "defaults::default_memfd_name")]
    pub memfd_name: String,
    /// Upper bound on idle buffers kept for reuse. `None` keeps every released buffer
    /// that still matches the pool's shape.
    #[serde(default = "defaults::default_max_idle_buffers")]
    pub max_idle_buffers: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            memfd_name: defaults::default_memfd_name(),
            max_idle_buffers: defaults::default_max_idle_buffers(),
        }
    }
}

/// Root configuration for the buffer manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BufferManagerConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_pool_config")]
    pub pool: PoolConfig,
}
