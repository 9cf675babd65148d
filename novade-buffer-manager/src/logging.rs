//! Logging setup built on `tracing`.
//!
//! Library code only emits `tracing` events. Binaries and tests embedding the buffer
//! manager can install a subscriber with [`init_minimal_logging`] or, once the
//! configuration is loaded, with [`init_logging`].

use std::path::Path;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;
use crate::error::LoggingError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the file writer alive so buffered lines are flushed.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Errors (e.g. a subscriber is already set) are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

/// Installs the global subscriber described by `config`.
///
/// Logs go to stderr and, when `file_path` is set, to a daily-rotated file next to
/// that path.
///
/// # Errors
///
/// Returns [`LoggingError::InitializationFailure`] for an unknown level or when a
/// global subscriber is already installed, and [`LoggingError::Io`] if the log
/// directory cannot be created.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = parse_level(&config.level)?;
    let json = config.format.eq_ignore_ascii_case("json");

    let console_layer: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed()
    };

    let mut layers = vec![console_layer];
    let mut file_guard = None;
    if let Some(path) = &config.file_path {
        let (layer, guard) = create_file_layer(path, json)?;
        layers.push(layer.with_filter(EnvFilter::new(level.to_string())).boxed());
        file_guard = Some(guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| {
            LoggingError::InitializationFailure(format!(
                "Failed to set global tracing subscriber: {}",
                e
            ))
        })?;

    match LOG_WORKER_GUARD.lock() {
        Ok(mut slot) => *slot = file_guard,
        Err(e) => eprintln!("[ERROR] Failed to store log worker guard: {}", e),
    }
    Ok(())
}

fn parse_level(level: &str) -> Result<Level, LoggingError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(LoggingError::InitializationFailure(format!(
            "Invalid log level in config: {}",
            other
        ))),
    }
}

fn create_file_layer(
    path: &Path,
    json: bool,
) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("buffers.log"));

    let appender = tracing_appender::rolling::daily(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer: BoxedLayer = if json {
        fmt::layer().json().with_writer(writer).with_ansi(false).boxed()
    } else {
        fmt::layer().with_writer(writer).with_ansi(false).boxed()
    };
    Ok((layer, guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_is_case_insensitive() {
        assert_eq!(parse_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_level("trace").unwrap(), Level::TRACE);
    }

    #[test]
    fn test_invalid_level_fails_before_installing() {
        let config = LoggingConfig {
            level: "verbose".to_string(),
            ..LoggingConfig::default()
        };
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, LoggingError::InitializationFailure(msg) if msg.contains("verbose")));
    }

    #[test]
    fn test_file_layer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("buffers.log");
        let (_layer, _guard) = create_file_layer(&path, false).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_minimal_logging_is_idempotent() {
        init_minimal_logging();
        init_minimal_logging();
    }
}
