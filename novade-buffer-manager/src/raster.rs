//! Raster image seam.
//!
//! Callers draw into a [`crate::Buffer`] through an image handle created by a
//! [`RasterBackend`] over the buffer's mapped pixels. With the `pixman` feature,
//! [`PixmanRaster`] builds `pixman` images; other 2D libraries can plug in by
//! implementing the trait.

use crate::format::RasterFormat;

/// Factory for raster image handles over caller-owned pixel memory.
pub trait RasterBackend {
    /// Image handle. It may keep a pointer into the pixel memory it was created over.
    type Image;

    /// Wraps `len` bytes at `pixels` as a `width` x `height` image with rows `stride`
    /// bytes apart. Returns `None` if the library rejects the parameters.
    ///
    /// # Safety
    ///
    /// `pixels` must be valid for reads and writes of `len` bytes, 4-byte aligned, and
    /// stay valid and in place until the returned image is dropped.
    unsafe fn create_image(
        &self,
        format: RasterFormat,
        width: u32,
        height: u32,
        stride: u32,
        pixels: *mut u8,
        len: usize,
    ) -> Option<Self::Image>;
}

#[cfg(feature = "pixman")]
pub use self::pixman_backend::PixmanRaster;

#[cfg(feature = "pixman")]
mod pixman_backend {
    use pixman::{FormatCode, Image};

    use super::RasterBackend;
    use crate::format::RasterFormat;

    /// Creates `pixman` images directly over the shared-memory mapping.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct PixmanRaster;

    fn format_code(format: RasterFormat) -> FormatCode {
        match format {
            RasterFormat::A8R8G8B8 => FormatCode::A8R8G8B8,
            RasterFormat::X8R8G8B8 => FormatCode::X8R8G8B8,
            RasterFormat::A8B8G8R8 => FormatCode::A8B8G8R8,
            RasterFormat::X8B8G8R8 => FormatCode::X8B8G8R8,
            RasterFormat::R8G8B8A8 => FormatCode::R8G8B8A8,
            RasterFormat::R8G8B8X8 => FormatCode::R8G8B8X8,
            RasterFormat::B8G8R8A8 => FormatCode::B8G8R8A8,
            RasterFormat::B8G8R8X8 => FormatCode::B8G8R8X8,
        }
    }

    impl RasterBackend for PixmanRaster {
        type Image = Image<'static, 'static>;

        unsafe fn create_image(
            &self,
            format: RasterFormat,
            width: u32,
            height: u32,
            stride: u32,
            pixels: *mut u8,
            len: usize,
        ) -> Option<Self::Image> {
            // pixman trusts the caller with the extent of the bits.
            if (len as u64) < u64::from(height) * u64::from(stride) {
                return None;
            }
            Image::from_raw_mut(
                format_code(format),
                width as usize,
                height as usize,
                pixels.cast::<u32>(),
                stride as usize,
                false,
            )
            .ok()
        }
    }

}
