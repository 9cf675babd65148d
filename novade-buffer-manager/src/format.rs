//! Pixel format translation.
//!
//! Frame producers describe pixel layouts with DRM fourcc codes. The shared-memory
//! surface (`wl_shm`) and the raster layer each have their own enumeration, and this
//! module maps between them. All functions here are pure.

use std::fmt;

/// Bit 31 of a DRM fourcc marks a big-endian layout.
pub const BIG_ENDIAN_FLAG: u32 = 1 << 31;

/// A DRM fourcc pixel-format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fourcc(pub u32);

impl Fourcc {
    /// 32-bit ARGB, little-endian `[B, G, R, A]` in memory.
    pub const ARGB8888: Fourcc = Fourcc::from_chars(*b"AR24");
    /// 32-bit XRGB, alpha byte ignored.
    pub const XRGB8888: Fourcc = Fourcc::from_chars(*b"XR24");
    pub const ABGR8888: Fourcc = Fourcc::from_chars(*b"AB24");
    pub const XBGR8888: Fourcc = Fourcc::from_chars(*b"XB24");
    pub const RGBA8888: Fourcc = Fourcc::from_chars(*b"RA24");
    pub const RGBX8888: Fourcc = Fourcc::from_chars(*b"RX24");
    pub const BGRA8888: Fourcc = Fourcc::from_chars(*b"BA24");
    pub const BGRX8888: Fourcc = Fourcc::from_chars(*b"BX24");

    /// Builds a code from its four characters, first character in the low byte.
    pub const fn from_chars(chars: [u8; 4]) -> Self {
        Fourcc(
            chars[0] as u32
                | (chars[1] as u32) << 8
                | (chars[2] as u32) << 16
                | (chars[3] as u32) << 24,
        )
    }

    /// Returns the raw numeric value of the code.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether the DRM big-endian flag is set on this code.
    pub const fn is_big_endian(self) -> bool {
        self.0 & BIG_ENDIAN_FLAG != 0
    }
}

impl fmt::Display for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.0 & !BIG_ENDIAN_FLAG;
        for shift in [0, 8, 16, 24] {
            let byte = ((code >> shift) & 0xff) as u8;
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        if self.is_big_endian() {
            write!(f, " (big-endian)")?;
        }
        Ok(())
    }
}

/// A `wl_shm` format value.
///
/// Only ARGB8888 and XRGB8888 have dedicated protocol values; every other fourcc is
/// carried through as-is, so consumers must accept values outside the two named
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat(u32);

impl SurfaceFormat {
    pub const ARGB8888: SurfaceFormat = SurfaceFormat(0);
    pub const XRGB8888: SurfaceFormat = SurfaceFormat(1);

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Raster image formats, named after their pixman counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    A8R8G8B8,
    X8R8G8B8,
    A8B8G8R8,
    X8B8G8R8,
    R8G8B8A8,
    R8G8B8X8,
    B8G8R8A8,
    B8G8R8X8,
}

impl RasterFormat {
    /// Every supported raster format packs a pixel into one 32-bit word.
    pub const fn bytes_per_pixel(self) -> u32 {
        4
    }

    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            RasterFormat::A8R8G8B8
                | RasterFormat::A8B8G8R8
                | RasterFormat::R8G8B8A8
                | RasterFormat::B8G8R8A8
        )
    }
}

/// Maps a fourcc to the `wl_shm` format used when creating surface buffers.
///
/// # Panics
///
/// Panics if `code` carries the big-endian flag.
pub fn to_surface_format(code: Fourcc) -> SurfaceFormat {
    assert!(
        !code.is_big_endian(),
        "big-endian pixel format {} is not supported",
        code
    );

    match code {
        Fourcc::ARGB8888 => SurfaceFormat::ARGB8888,
        Fourcc::XRGB8888 => SurfaceFormat::XRGB8888,
        // wl_shm reuses the DRM fourcc values for everything else.
        other => SurfaceFormat(other.raw()),
    }
}

/// Maps a fourcc to a raster format, or `None` if the raster layer cannot draw it.
///
/// # Panics
///
/// Panics if `code` carries the big-endian flag.
pub fn to_raster_format(code: Fourcc) -> Option<RasterFormat> {
    assert!(
        !code.is_big_endian(),
        "big-endian pixel format {} is not supported",
        code
    );

    let format = match code {
        Fourcc::ARGB8888 => RasterFormat::A8R8G8B8,
        Fourcc::XRGB8888 => RasterFormat::X8R8G8B8,
        Fourcc::ABGR8888 => RasterFormat::A8B8G8R8,
        Fourcc::XBGR8888 => RasterFormat::X8B8G8R8,
        Fourcc::RGBA8888 => RasterFormat::R8G8B8A8,
        Fourcc::RGBX8888 => RasterFormat::R8G8B8X8,
        Fourcc::BGRA8888 => RasterFormat::B8G8R8A8,
        Fourcc::BGRX8888 => RasterFormat::B8G8R8X8,
        _ => return None,
    };
    Some(format)
}
