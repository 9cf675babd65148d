//! Shared-memory frame buffers.
//!
//! A [`Buffer`] bundles the three views of one block of shared memory: the process
//! mapping, the raster image describing it and the display-server buffer object
//! created over it. Creation either produces all three or releases everything it
//! acquired along the way.

use std::fmt;
use std::os::fd::AsFd;

use memmap2::{MmapMut, MmapOptions};

use crate::error::BufferError;
use crate::format::{to_raster_format, to_surface_format, Fourcc};
use crate::raster::RasterBackend;
use crate::shm::ShmAllocator;
use crate::transport::{SurfacePool, SurfaceTransport};

/// The `(width, height, stride, format)` tuple that decides whether two buffers are
/// interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferShape {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes between the starts of consecutive rows.
    pub stride: u32,
    /// Pixel format of the buffer.
    pub format: Fourcc,
}

impl BufferShape {
    pub const fn new(width: u32, height: u32, stride: u32, format: Fourcc) -> Self {
        Self {
            width,
            height,
            stride,
            format,
        }
    }

    /// Size of the backing memory, `height * stride`, or `None` on overflow.
    pub fn byte_len(&self) -> Option<usize> {
        (self.height as usize).checked_mul(self.stride as usize)
    }
}

impl fmt::Display for BufferShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} (stride {}, {})",
            self.width, self.height, self.stride, self.format
        )
    }
}

/// A mapped shared-memory buffer, ready to be drawn into and sent to the display.
///
/// Dropping the buffer destroys the surface buffer, then the raster image, then
/// unmaps the memory.
pub struct Buffer<S, I> {
    // Field order is drop order: the image points into `pixels`.
    surface: S,
    image: I,
    pixels: MmapMut,
    shape: BufferShape,
}

impl<S, I> Buffer<S, I> {
    /// Allocates, maps and registers a new buffer with the given shape.
    ///
    /// # Errors
    ///
    /// - [`BufferError::UnsupportedFormat`] if the raster layer cannot draw `shape.format`.
    ///   Nothing is allocated in that case.
    /// - [`BufferError::AllocationFailed`] if `allocator` returns no descriptor.
    /// - [`BufferError::MappingFailed`] if the descriptor cannot be mapped.
    /// - [`BufferError::ImageCreationFailed`] if `raster` rejects the parameters.
    /// - [`BufferError::SurfaceBufferFailed`] if the transport refuses the pool or buffer.
    ///
    /// # Panics
    ///
    /// Panics if `shape.format` carries the DRM big-endian flag.
    pub fn create<T, R, A>(
        transport: &T,
        raster: &R,
        allocator: &A,
        shape: BufferShape,
    ) -> Result<Self, BufferError>
    where
        T: SurfaceTransport<Buffer = S> + ?Sized,
        R: RasterBackend<Image = I> + ?Sized,
        A: ShmAllocator + ?Sized,
    {
        let surface_format = to_surface_format(shape.format);
        let raster_format =
            to_raster_format(shape.format).ok_or(BufferError::UnsupportedFormat(shape.format))?;

        let size = shape.byte_len().ok_or_else(|| BufferError::AllocationFailed {
            size: usize::MAX,
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} overflows the address space", shape),
            ),
        })?;

        // Every resource below releases itself when dropped, so an early return
        // unwinds exactly the steps that succeeded, in reverse order.
        let fd = allocator
            .allocate(size)
            .map_err(|source| BufferError::AllocationFailed { size, source })?;

        // SAFETY: the descriptor was just allocated for this buffer and is not mapped
        // or truncated anywhere else in this process.
        let mut pixels = unsafe { MmapOptions::new().len(size).map_mut(&fd) }
            .map_err(|source| BufferError::MappingFailed { size, source })?;

        // SAFETY: the mapping is page aligned, spans `pixels.len()` bytes and does not
        // move when `pixels` is moved. `Buffer` drops the image before the mapping.
        let image = unsafe {
            raster.create_image(
                raster_format,
                shape.width,
                shape.height,
                shape.stride,
                pixels.as_mut_ptr(),
                pixels.len(),
            )
        }
        .ok_or(BufferError::ImageCreationFailed { shape })?;

        let surface = {
            let (width, height, stride) = protocol_dimensions(&shape)
                .ok_or(BufferError::SurfaceBufferFailed { shape })?;
            let pool = transport
                .create_pool(fd.as_fd(), size)
                .ok_or(BufferError::SurfaceBufferFailed { shape })?;
            // The pool is dropped at the end of this block whether or not the
            // buffer was created.
            pool.create_buffer(0, width, height, stride, surface_format)
                .ok_or(BufferError::SurfaceBufferFailed { shape })?
        };

        // The mapping and the surface buffer keep the memory alive on their own.
        drop(fd);

        tracing::debug!(%shape, size, "Created shared memory buffer");
        Ok(Self {
            surface,
            image,
            pixels,
            shape,
        })
    }

    /// Destroys the buffer and releases its shared memory.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn shape(&self) -> BufferShape {
        self.shape
    }

    pub fn width(&self) -> u32 {
        self.shape.width
    }

    pub fn height(&self) -> u32 {
        self.shape.height
    }

    pub fn stride(&self) -> u32 {
        self.shape.stride
    }

    pub fn format(&self) -> Fourcc {
        self.shape.format
    }

    /// Length of the mapped region in bytes. Always `height * stride`.
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    /// Whether this buffer can stand in for one of `shape`.
    pub fn matches(&self, shape: &BufferShape) -> bool {
        self.shape == *shape
    }

    /// The raster image to draw through.
    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut I {
        &mut self.image
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// The display-server buffer to attach or hand to a capture request.
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S, I> Drop for Buffer<S, I> {
    fn drop(&mut self) {
        tracing::trace!(shape = %self.shape, "Destroying shared memory buffer");
    }
}

impl<S, I> fmt::Debug for Buffer<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("shape", &self.shape)
            .field("size", &self.pixels.len())
            .finish_non_exhaustive()
    }
}

fn protocol_dimensions(shape: &BufferShape) -> Option<(i32, i32, i32)> {
    Some((
        i32::try_from(shape.width).ok()?,
        i32::try_from(shape.height).ok()?,
        i32::try_from(shape.stride).ok()?,
    ))
}
