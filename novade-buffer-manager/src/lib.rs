//! # Novade Buffer Manager
//!
//! Shared-memory frame buffers for screen capture and compositing.
//!
//! The crate provides:
//!
//! - **Format translation** ([`format`]): DRM fourcc codes to `wl_shm` formats and to
//!   raster image formats.
//! - **Buffers** ([`buffer`]): a memfd-backed mapping, a raster image over it and a
//!   display-server buffer object, created all-or-nothing.
//! - **Pooling** ([`pool`]): reuse of buffers between frames for as long as their
//!   width, height, stride and format match.
//!
//! The display connection, the raster library and the shared-memory source are passed
//! in explicitly through [`SurfaceTransport`], [`RasterBackend`] and [`ShmAllocator`].
//! With the default `wayland` feature, [`wayland::WaylandShm`] implements the
//! transport over `wayland-client`. The `pixman` feature adds `PixmanRaster`.
//!
//! ```rust,ignore
//! use novade_buffer_manager::{BufferPool, BufferShape, Fourcc, MemfdAllocator, PixmanRaster};
//! use novade_buffer_manager::wayland::WaylandShm;
//!
//! let transport = WaylandShm::new(wl_shm, queue_handle);
//! let shape = BufferShape::new(1920, 1080, 1920 * 4, Fourcc::XRGB8888);
//! let mut pool = BufferPool::new(transport, PixmanRaster, MemfdAllocator::default(), shape);
//!
//! let mut frame = pool.acquire()?;
//! frame.pixels_mut().fill(0);
//! screencopy_frame.copy(frame.surface().wl_buffer());
//! // ... once the frame is done:
//! pool.release(frame);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod pool;
pub mod raster;
pub mod shm;
pub mod transport;
#[cfg(feature = "wayland")]
pub mod wayland;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience.
pub use buffer::{Buffer, BufferShape};
pub use config::{BufferManagerConfig, ConfigLoader, LoggingConfig, PoolConfig};
pub use error::{BufferError, ConfigError, LoggingError};
pub use format::{to_raster_format, to_surface_format, Fourcc, RasterFormat, SurfaceFormat};
pub use logging::{init_logging, init_minimal_logging};
pub use pool::{BufferPool, PoolStats};
#[cfg(feature = "pixman")]
pub use raster::PixmanRaster;
pub use raster::RasterBackend;
pub use shm::{MemfdAllocator, ShmAllocator};
pub use transport::{SurfacePool, SurfaceTransport};
