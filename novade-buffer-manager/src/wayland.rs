//! `wl_shm` transport over a `wayland-client` connection.
//!
//! The transport is bound to an explicit [`QueueHandle`], so every buffer manager
//! instance names the connection it talks to. The application state `D` must dispatch
//! `wl_shm_pool` and `wl_buffer` events with `()` user data.

use std::os::fd::BorrowedFd;

use wayland_client::protocol::{
    wl_buffer::WlBuffer, wl_shm, wl_shm::WlShm, wl_shm_pool::WlShmPool,
};
use wayland_client::{Dispatch, QueueHandle};

use crate::format::SurfaceFormat;
use crate::transport::{SurfacePool, SurfaceTransport};

/// Creates surface buffers through a bound `wl_shm` global.
pub struct WaylandShm<D> {
    shm: WlShm,
    queue: QueueHandle<D>,
}

impl<D> WaylandShm<D> {
    pub fn new(shm: WlShm, queue: QueueHandle<D>) -> Self {
        Self { shm, queue }
    }

    pub fn wl_shm(&self) -> &WlShm {
        &self.shm
    }
}

impl<D> SurfaceTransport for WaylandShm<D>
where
    D: Dispatch<WlShmPool, ()> + Dispatch<WlBuffer, ()> + 'static,
{
    type Buffer = WaylandBuffer;
    type Pool = WaylandShmPool<D>;

    fn create_pool(&self, fd: BorrowedFd<'_>, size: usize) -> Option<Self::Pool> {
        let Ok(size) = i32::try_from(size) else {
            tracing::warn!(size, "Shared memory pool exceeds the wl_shm size limit");
            return None;
        };
        let pool = self.shm.create_pool(fd, size, &self.queue, ());
        Some(WaylandShmPool {
            pool,
            queue: self.queue.clone(),
        })
    }
}

/// A `wl_shm_pool`, destroyed on drop.
pub struct WaylandShmPool<D> {
    pool: WlShmPool,
    queue: QueueHandle<D>,
}

impl<D> SurfacePool for WaylandShmPool<D>
where
    D: Dispatch<WlShmPool, ()> + Dispatch<WlBuffer, ()> + 'static,
{
    type Buffer = WaylandBuffer;

    fn create_buffer(
        &self,
        offset: i32,
        width: i32,
        height: i32,
        stride: i32,
        format: SurfaceFormat,
    ) -> Option<WaylandBuffer> {
        let Some(wl_format) = to_wl_format(format) else {
            tracing::warn!(format = format.raw(), "wl_shm has no such format");
            return None;
        };
        let buffer = self
            .pool
            .create_buffer(offset, width, height, stride, wl_format, &self.queue, ());
        Some(WaylandBuffer { buffer })
    }
}

impl<D> Drop for WaylandShmPool<D> {
    fn drop(&mut self) {
        self.pool.destroy();
    }
}

/// A `wl_buffer` backed by shared memory, destroyed on drop.
#[derive(Debug)]
pub struct WaylandBuffer {
    buffer: WlBuffer,
}

impl WaylandBuffer {
    /// The protocol object to attach to a surface or pass to a screencopy frame.
    pub fn wl_buffer(&self) -> &WlBuffer {
        &self.buffer
    }
}

impl Drop for WaylandBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

/// Converts a surface format into the protocol enum.
///
/// Returns `None` for raw values this protocol version does not define.
pub fn to_wl_format(format: SurfaceFormat) -> Option<wl_shm::Format> {
    match format {
        SurfaceFormat::ARGB8888 => Some(wl_shm::Format::Argb8888),
        SurfaceFormat::XRGB8888 => Some(wl_shm::Format::Xrgb8888),
        other => wl_shm::Format::try_from(other.raw()).ok(),
    }
}
