//! Display-surface transport seam.
//!
//! Buffers are handed to the display server through a shared-memory pool object and a
//! buffer object created from it. These traits describe that handshake so the buffer
//! logic can run against the Wayland connection (see [`crate::wayland`]) or against a
//! fake in tests. Handles release their server-side object when dropped.

use std::os::fd::BorrowedFd;

use crate::format::SurfaceFormat;

/// Factory for shared-memory pools on a display connection.
pub trait SurfaceTransport {
    /// Server-side buffer handle that outlives the pool it was created from.
    type Buffer;
    /// Temporary pool over one shared-memory descriptor.
    type Pool: SurfacePool<Buffer = Self::Buffer>;

    /// Creates a pool covering `size` bytes of the memory behind `fd`.
    ///
    /// The transport duplicates the descriptor if it needs to keep it; the caller
    /// remains free to close `fd` afterwards.
    fn create_pool(&self, fd: BorrowedFd<'_>, size: usize) -> Option<Self::Pool>;
}

/// A shared-memory pool that can carve buffers out of its memory.
pub trait SurfacePool {
    type Buffer;

    /// Creates a buffer starting `offset` bytes into the pool.
    fn create_buffer(
        &self,
        offset: i32,
        width: i32,
        height: i32,
        stride: i32,
        format: SurfaceFormat,
    ) -> Option<Self::Buffer>;
}
