//! Default configuration values.
//!
//! These functions back the `#[serde(default = ...)]` attributes in [`super::types`].

use std::path::PathBuf;

use super::types::{LoggingConfig, PoolConfig};

pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig::default()
}

pub(super) fn default_pool_config() -> PoolConfig {
    PoolConfig::default()
}

/// Returns the default log level string (`"info"`).
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// No log file by default.
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// Returns the default log format string (`"text"`).
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_memfd_name() -> String {
    "novade-shm-buffer".to_string()
}

/// Idle buffers are not capped unless configured.
pub(super) fn default_max_idle_buffers() -> Option<usize> {
    None
}
