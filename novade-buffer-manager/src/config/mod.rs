//! Configuration for the buffer manager.
//!
//! The configuration is a small TOML document with a `[logging]` and a `[pool]`
//! table. Missing tables and fields fall back to [`defaults`], and every loaded
//! configuration is validated by [`ConfigLoader`] before use.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [pool]
//! memfd_name = "novade-capture"
//! max_idle_buffers = 3
//! ```

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{BufferManagerConfig, LoggingConfig, PoolConfig};
