//! Recycling of shared-memory buffers between frames.
//!
//! Allocating and mapping shared memory for every captured frame is expensive. A
//! [`BufferPool`] keeps released buffers around as long as they still match the
//! current [`BufferShape`] and hands them out again on the next acquire.
//!
//! Buffers on loan belong to the caller. A buffer released after the pool changed
//! shape is destroyed instead of pooled.

use std::collections::VecDeque;

use crate::buffer::{Buffer, BufferShape};
use crate::config::PoolConfig;
use crate::error::BufferError;
use crate::raster::RasterBackend;
use crate::shm::ShmAllocator;
use crate::transport::SurfaceTransport;

/// Counters describing how well the pool is doing its job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers created because no idle buffer was available.
    pub allocated: u64,
    /// Acquires served from the idle set.
    pub reused: u64,
    /// Buffers destroyed by a resize, a mismatched release or the idle cap.
    pub discarded: u64,
    /// Buffers currently waiting in the idle set.
    pub idle: usize,
}

/// A pool of interchangeable shared-memory buffers.
///
/// The pool is single-threaded: acquiring moves a buffer out to the caller, releasing
/// moves it back.
pub struct BufferPool<T, R, A>
where
    T: SurfaceTransport,
    R: RasterBackend,
    A: ShmAllocator,
{
    transport: T,
    raster: R,
    allocator: A,
    shape: BufferShape,
    idle: VecDeque<Buffer<T::Buffer, R::Image>>,
    max_idle: Option<usize>,
    stats: PoolStats,
}

impl<T, R, A> BufferPool<T, R, A>
where
    T: SurfaceTransport,
    R: RasterBackend,
    A: ShmAllocator,
{
    /// Creates an empty pool for buffers of `shape`. No memory is allocated until
    /// the first [`acquire`](Self::acquire).
    pub fn new(transport: T, raster: R, allocator: A, shape: BufferShape) -> Self {
        Self {
            transport,
            raster,
            allocator,
            shape,
            idle: VecDeque::new(),
            max_idle: None,
            stats: PoolStats::default(),
        }
    }

    /// Creates an empty pool honouring the idle cap from `config`.
    pub fn with_config(
        transport: T,
        raster: R,
        allocator: A,
        shape: BufferShape,
        config: &PoolConfig,
    ) -> Self {
        let mut pool = Self::new(transport, raster, allocator, shape);
        pool.max_idle = config.max_idle_buffers;
        pool
    }

    /// Destroys every idle buffer and the pool itself.
    ///
    /// Buffers still on loan are unaffected and should simply be dropped by their
    /// holders.
    pub fn destroy(self) {
        drop(self);
    }

    /// The shape every pooled buffer currently conforms to.
    pub fn shape(&self) -> BufferShape {
        self.shape
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            idle: self.idle.len(),
            ..self.stats
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn raster(&self) -> &R {
        &self.raster
    }

    /// Adopts a new buffer shape.
    ///
    /// If any of width, height, stride or format differs from the current shape, all
    /// idle buffers are destroyed. Resizing to the current shape is a no-op.
    pub fn resize(&mut self, shape: BufferShape) {
        if shape != self.shape {
            tracing::debug!(
                from = %self.shape,
                to = %shape,
                discarded = self.idle.len(),
                "Buffer pool shape changed"
            );
            self.clear();
        }
        self.shape = shape;
    }

    /// Takes a buffer matching the current shape, creating one if none is idle.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Buffer::create`].
    pub fn acquire(&mut self) -> Result<Buffer<T::Buffer, R::Image>, BufferError> {
        if let Some(buffer) = self.idle.pop_back() {
            debug_assert!(buffer.matches(&self.shape), "idle buffer does not match pool shape");
            self.stats.reused += 1;
            tracing::trace!(shape = %self.shape, "Reusing idle buffer");
            return Ok(buffer);
        }

        match Buffer::create(&self.transport, &self.raster, &self.allocator, self.shape) {
            Ok(buffer) => {
                self.stats.allocated += 1;
                Ok(buffer)
            }
            Err(e) => {
                tracing::warn!(shape = %self.shape, "Failed to create buffer: {}", e);
                Err(e)
            }
        }
    }

    /// Returns a buffer to the pool.
    ///
    /// Buffers that no longer match the current shape are destroyed immediately, as
    /// are matching buffers that would exceed the configured idle cap.
    pub fn release(&mut self, buffer: Buffer<T::Buffer, R::Image>) {
        if !buffer.matches(&self.shape) {
            tracing::debug!(
                buffer = %buffer.shape(),
                pool = %self.shape,
                "Discarding outdated buffer"
            );
            self.stats.discarded += 1;
            buffer.destroy();
            return;
        }

        if self.max_idle.is_some_and(|max| self.idle.len() >= max) {
            tracing::trace!("Idle set full, discarding released buffer");
            self.stats.discarded += 1;
            buffer.destroy();
            return;
        }

        self.idle.push_back(buffer);
    }

    fn clear(&mut self) {
        self.stats.discarded += self.idle.len() as u64;
        self.idle.clear();
    }
}

impl<T, R, A> Drop for BufferPool<T, R, A>
where
    T: SurfaceTransport,
    R: RasterBackend,
    A: ShmAllocator,
{
    fn drop(&mut self) {
        if !self.idle.is_empty() {
            tracing::debug!(count = self.idle.len(), "Destroying idle buffers");
        }
        self.idle.clear();
    }
}
