//! Error types for the buffer manager.
//!
//! [`BufferError`] covers everything that can go wrong while creating a shared-memory
//! buffer. Pool operations only ever propagate it. [`ConfigError`] and [`LoggingError`]
//! belong to the configuration and logging setup.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::buffer::BufferShape;
use crate::format::Fourcc;

/// Failure to create a shared-memory buffer.
///
/// Creation is all-or-nothing: whichever variant is returned, every resource acquired
/// before the failing step has already been released.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The raster layer cannot represent the pixel format. Retrying with the same
    /// format will fail again.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(Fourcc),

    /// The shared-memory allocator did not return a descriptor.
    #[error("Failed to allocate {size} bytes of shared memory")]
    AllocationFailed {
        size: usize,
        #[source]
        source: io::Error,
    },

    /// The descriptor could not be mapped read/write.
    #[error("Failed to map {size} bytes of shared memory")]
    MappingFailed {
        size: usize,
        #[source]
        source: io::Error,
    },

    /// The raster layer rejected the buffer parameters.
    #[error("Raster image creation failed for {shape}")]
    ImageCreationFailed { shape: BufferShape },

    /// The display surface refused to create a buffer over the shared memory.
    #[error("Surface buffer creation failed for {shape}")]
    SurfaceBufferFailed { shape: BufferShape },
}

impl BufferError {
    /// Whether retrying the same request can never succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, BufferError::UnsupportedFormat(_))
    }
}

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsing succeeded but a value is out of range.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Error type for logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The subscriber could not be installed or the configuration was unusable.
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// Preparing the log file location failed.
    #[error("Logging I/O error: {0}")]
    Io(#[from] io::Error),
}
