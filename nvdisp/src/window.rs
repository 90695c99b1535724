//! Windows: hardware scan-out engines and their per-update parameters.

use core::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;

use crate::format::{Fixed20_12, PixelFormat};

bitflags! {
    /// Per-update window flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const ENABLED = 1 << 0;
        /// Source is premultiplied by alpha.
        const BLEND_PREMULT = 1 << 1;
        /// Blend by per-pixel coverage.
        const BLEND_COVERAGE = 1 << 2;
        const INVERT_H = 1 << 4;
        const INVERT_V = 1 << 5;
        const SCAN_COLUMN = 1 << 6;
        /// Surface already holds separate fields.
        const INTERLACE = 1 << 7;
        /// Window scans out the console framebuffer.
        const FB = 1 << 8;
    }
}

impl WindowFlags {
    /// Bits the blender cares about.
    pub const BLEND_MASK: Self = Self::BLEND_PREMULT.union(Self::BLEND_COVERAGE);

    pub fn blend_bits(self) -> Self {
        self & Self::BLEND_MASK
    }
}

bitflags! {
    /// Post-processing flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct PpFlags: u32 {
        /// Colour processing (CSC/LUT) enable.
        const CP_ENABLE = 1 << 0;
    }
}

/// Memory layout of a window surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SurfaceLayout {
    /// Linear, pitch-addressed.
    #[default]
    Pitch,
    /// Legacy 16x16 tiles.
    Tiled,
    /// Block-linear with `2^block_height_log2` GOBs per block.
    BlockLinear { block_height_log2: u32 },
}

/// Render parameters supplied with every update of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    pub flags: WindowFlags,
    pub pp_flags: PpFlags,
    pub format: PixelFormat,
    pub layout: SurfaceLayout,
    /// Output position on the head.
    pub out_x: u32,
    pub out_y: u32,
    /// Output size on the head.
    pub out_w: u32,
    pub out_h: u32,
    /// Source crop size.
    pub w: Fixed20_12,
    pub h: Fixed20_12,
    pub z: u32,
    pub global_alpha: u8,
    pub phys_addr: u64,
    pub phys_addr_u: u64,
    pub phys_addr_v: u64,
    /// Second-field addresses for interlaced scan-out.
    pub phys_addr2: u64,
    pub phys_addr_u2: u64,
    pub phys_addr_v2: u64,
    /// Line pitch in bytes.
    pub stride: u32,
    /// Chroma line pitch in bytes.
    pub stride_uv: u32,
    /// Compression metadata surface, if any.
    pub cde_addr: Option<u64>,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            flags: WindowFlags::ENABLED,
            pp_flags: PpFlags::empty(),
            format: PixelFormat::A8R8G8B8,
            layout: SurfaceLayout::Pitch,
            out_x: 0,
            out_y: 0,
            out_w: 0,
            out_h: 0,
            w: Fixed20_12(0),
            h: Fixed20_12(0),
            z: 0,
            global_alpha: 0xFF,
            phys_addr: 0,
            phys_addr_u: 0,
            phys_addr_v: 0,
            phys_addr2: 0,
            phys_addr_u2: 0,
            phys_addr_v2: 0,
            stride: 0,
            stride_uv: 0,
            cde_addr: None,
        }
    }
}

impl WindowParams {
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(WindowFlags::ENABLED)
    }
}

/// One entry of an update batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    /// Window index on the controller.
    pub index: usize,
    pub params: WindowParams,
    /// Set once the request has been programmed.
    pub dirty: bool,
}

impl WindowRequest {
    pub fn new(index: usize, params: WindowParams) -> Self {
        Self {
            index,
            params,
            dirty: false,
        }
    }
}

/// Damage rectangle attached to a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

/// A hardware window engine.
///
/// Lives for the lifetime of the controller. Ownership is tracked by the
/// [`WindowRegistry`](crate::registry::WindowRegistry), not here.
#[derive(Debug)]
pub struct Window {
    index: usize,
    /// Programmed state not yet latched by hardware.
    dirty: AtomicBool,
}

impl Window {
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            dirty: AtomicBool::new(false),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }
}
