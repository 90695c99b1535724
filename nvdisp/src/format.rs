//! Window pixel formats and fixed-point coordinates.

/// Pixel formats a window can scan out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit palettized
    P8,
    /// 16-bit ARGB 4:4:4:4
    A4R4G4B4,
    /// 16-bit ARGB 1:5:5:5
    A1R5G5B5,
    /// 16-bit RGB 5:6:5
    R5G6B5,
    /// 32-bit ARGB 8:8:8:8
    A8R8G8B8,
    /// 32-bit ABGR 8:8:8:8
    A8B8G8R8,
    /// 32-bit ARGB 2:10:10:10
    A2R10G10B10,
    /// Packed YUV 4:2:2 (UYVY)
    YCbCr422,
    /// Three-plane YUV 4:2:0
    YCbCr420P,
    /// Three-plane YUV 4:2:2
    YCbCr422P,
    /// Two-plane YUV 4:2:0 (luma + interleaved chroma)
    YCbCr420SP,
    /// Two-plane YUV 4:2:2
    YCbCr422SP,
}

impl PixelFormat {
    /// Value programmed into the colour depth register.
    pub const fn hw_code(&self) -> u32 {
        match self {
            PixelFormat::P8 => 3,
            PixelFormat::A4R4G4B4 => 4,
            PixelFormat::A1R5G5B5 => 5,
            PixelFormat::R5G6B5 => 6,
            PixelFormat::A8R8G8B8 => 12,
            PixelFormat::A8B8G8R8 => 13,
            PixelFormat::A2R10G10B10 => 14,
            PixelFormat::YCbCr422 => 16,
            PixelFormat::YCbCr420P => 18,
            PixelFormat::YCbCr422P => 19,
            PixelFormat::YCbCr420SP => 42,
            PixelFormat::YCbCr422SP => 43,
        }
    }

    /// Get bits per pixel of the luma/RGB plane
    pub const fn bits_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::P8 => 8,
            PixelFormat::A4R4G4B4
            | PixelFormat::A1R5G5B5
            | PixelFormat::R5G6B5
            | PixelFormat::YCbCr422 => 16,
            PixelFormat::A8R8G8B8 | PixelFormat::A8B8G8R8 | PixelFormat::A2R10G10B10 => 32,
            PixelFormat::YCbCr420P
            | PixelFormat::YCbCr422P
            | PixelFormat::YCbCr420SP
            | PixelFormat::YCbCr422SP => 8,
        }
    }

    pub const fn is_yuv(&self) -> bool {
        matches!(
            self,
            PixelFormat::YCbCr422
                | PixelFormat::YCbCr420P
                | PixelFormat::YCbCr422P
                | PixelFormat::YCbCr420SP
                | PixelFormat::YCbCr422SP
        )
    }

    /// Separate U and V planes.
    pub const fn is_yuv_planar(&self) -> bool {
        matches!(self, PixelFormat::YCbCr420P | PixelFormat::YCbCr422P)
    }

    /// One interleaved UV plane.
    pub const fn is_yuv_semi_planar(&self) -> bool {
        matches!(self, PixelFormat::YCbCr420SP | PixelFormat::YCbCr422SP)
    }
}

/// Unsigned 20.12 fixed-point value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed20_12(pub u32);

impl Fixed20_12 {
    pub const FRAC_BITS: u32 = 12;

    pub const fn from_int(value: u32) -> Self {
        Self(value << Self::FRAC_BITS)
    }

    /// Integer part, fraction discarded.
    pub const fn trunc(self) -> u32 {
        self.0 >> Self::FRAC_BITS
    }
}
