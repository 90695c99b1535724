//! Window and head register selectors and field encoders.
//!
//! Only the registers the window pipeline touches are modelled. Offsets
//! are relative to the start of the window (or head) register block.

use bitflags::bitflags;

/// Window register selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WinReg {
    SetControl,
    ActControl,
    ColorDepth,
    Position,
    Size,
    Options,
    CroppedSizeIn,
    StartAddr,
    StartAddrHi,
    PlanarStorage,
    StartAddrU,
    StartAddrHiU,
    StartAddrV,
    StartAddrHiV,
    PlanarStorageUv,
    SetParams,
    CroppedPoint,
    StartAddrFld2,
    StartAddrFld2Hi,
    StartAddrFld2U,
    StartAddrFld2HiU,
    StartAddrFld2V,
    StartAddrFld2HiV,
    CroppedPointFld2,
    SurfaceKind,
    BlendLayerControl,
    BlendMatchSelect,
    BlendNomatchSelect,
}

impl WinReg {
    /// Byte offset inside the window register block.
    pub const fn offset(self) -> u32 {
        match self {
            WinReg::SetControl => 0x0000,
            WinReg::ActControl => 0x0008,
            WinReg::ColorDepth => 0x0010,
            WinReg::Position => 0x0014,
            WinReg::Size => 0x0018,
            WinReg::Options => 0x001C,
            WinReg::CroppedSizeIn => 0x0020,
            WinReg::StartAddr => 0x0040,
            WinReg::StartAddrHi => 0x0044,
            WinReg::PlanarStorage => 0x0048,
            WinReg::StartAddrU => 0x004C,
            WinReg::StartAddrHiU => 0x0050,
            WinReg::StartAddrV => 0x0054,
            WinReg::StartAddrHiV => 0x0058,
            WinReg::PlanarStorageUv => 0x005C,
            WinReg::SetParams => 0x0060,
            WinReg::CroppedPoint => 0x0064,
            WinReg::StartAddrFld2 => 0x0070,
            WinReg::StartAddrFld2Hi => 0x0074,
            WinReg::StartAddrFld2U => 0x0078,
            WinReg::StartAddrFld2HiU => 0x007C,
            WinReg::StartAddrFld2V => 0x0080,
            WinReg::StartAddrFld2HiV => 0x0084,
            WinReg::CroppedPointFld2 => 0x0088,
            WinReg::SurfaceKind => 0x0090,
            WinReg::BlendLayerControl => 0x00A0,
            WinReg::BlendMatchSelect => 0x00A4,
            WinReg::BlendNomatchSelect => 0x00A8,
        }
    }
}

/// Head command register selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadReg {
    CmdStateCtrl,
    CmdIntStatus,
    CmdIntMask,
}

impl HeadReg {
    /// Byte offset inside the head command block.
    pub const fn offset(self) -> u32 {
        match self {
            HeadReg::CmdStateCtrl => 0x0104,
            HeadReg::CmdIntStatus => 0x0DC,
            HeadReg::CmdIntMask => 0x0E0,
        }
    }
}

/// Window registers are spaced this far apart in the aperture.
pub const WINDOW_BLOCK_SIZE: u64 = 0x1000;

/// Head command blocks are spaced this far apart in the aperture.
pub const HEAD_BLOCK_SIZE: u64 = 0x1_0000;

bitflags! {
    /// Head command state control (activation requests).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StateCtrl: u32 {
        const GENERAL_ACT_REQ = 1 << 0;
        const WIN_A_ACT_REQ = 1 << 1;
        const COMMON_ACT_REQ = 1 << 16;
        const COMMON_ACT_UPDATE = 1 << 17;
        const HOST_TRIG = 1 << 24;
    }
}

impl StateCtrl {
    /// Activation request bit for window `index`.
    pub const fn win_act_req(index: usize) -> Self {
        Self::from_bits_retain(Self::WIN_A_ACT_REQ.bits() << index)
    }

    /// Moves request bits into the matching update positions.
    pub const fn as_update(self) -> Self {
        Self::from_bits_retain(self.bits() << 8)
    }
}

bitflags! {
    /// Head interrupt status/mask bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IntStatus: u32 {
        const FRAME_END = 1 << 1;
        const V_BLANK = 1 << 2;
        const UNDERFLOW = 1 << 3;
    }
}

bitflags! {
    /// Window option bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WinOptions: u32 {
        const H_DIRECTION_DECREMENT = 1 << 0;
        const V_DIRECTION_DECREMENT = 1 << 2;
        const SCAN_COLUMN = 1 << 4;
        const COLOR_EXPAND = 1 << 6;
        const CP_ENABLE = 1 << 16;
        const WIN_ENABLE = 1 << 30;
    }
}

/// Activation trigger select
pub mod act_control {
    pub const CTRL_SEL_VCOUNTER: u32 = 0x0;
    pub const CTRL_SEL_HCOUNTER: u32 = 0x1;
}

/// Window owner field
pub mod set_control {
    pub const OWNER_NONE: u32 = 0xF;

    pub const fn owner(head: u32) -> u32 {
        head & 0xF
    }
}

/// Packs a (horizontal, vertical) pair into the common 15/15 layout used by
/// the position, size and cropped-size registers.
pub const fn hv(h: u32, v: u32) -> u32 {
    ((v & 0x7FFF) << 16) | (h & 0x7FFF)
}

/// Planar chroma pitch register
pub mod planar_storage_uv {
    pub const fn uv0(pitch: u32) -> u32 {
        pitch & 0x1FFF
    }

    pub const fn uv1(pitch: u32) -> u32 {
        (pitch & 0x1FFF) << 16
    }
}

/// Input colour parameters
pub mod set_params {
    pub const CS_RANGE_RGB: u32 = 0x0;
    pub const CS_RANGE_YUV_709: u32 = 0x2;
    pub const IN_RANGE_BYPASS: u32 = 0x0 << 4;
    pub const DEGAMMA_RANGE_NONE: u32 = 0x0 << 8;
}

/// Second-field crop point
pub mod cropped_point_fld2 {
    pub const fn h(offset: u32) -> u32 {
        offset & 0x7FFF
    }

    pub const fn v(offset: u32) -> u32 {
        (offset & 0x7FFF) << 16
    }
}

/// Surface memory layout
pub mod surface_kind {
    pub const KIND_PITCH: u32 = 0x0;
    pub const KIND_TILED: u32 = 0x1;
    pub const KIND_BL: u32 = 0x2;

    pub const fn block_height(log2: u32) -> u32 {
        (log2 & 0x7) << 4
    }
}

/// Blender layer control
pub mod layer_control {
    pub const BLEND_ENABLE: u32 = 0x0 << 24;
    pub const BLEND_BYPASS: u32 = 0x1 << 24;

    pub const fn depth(z: u32) -> u32 {
        z & 0xFF
    }

    pub const fn k1(alpha: u32) -> u32 {
        (alpha & 0xFF) << 8
    }

    pub const fn k2(value: u32) -> u32 {
        (value & 0xFF) << 16
    }
}

/// Low 32 bits of a physical address.
pub const fn lo32(addr: u64) -> u32 {
    addr as u32
}

/// High 32 bits of a physical address.
pub const fn hi32(addr: u64) -> u32 {
    (addr >> 32) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_update_bits() {
        let mask = StateCtrl::GENERAL_ACT_REQ | StateCtrl::win_act_req(2);
        assert_eq!(mask.bits(), 0b1001);
        assert_eq!(mask.as_update().bits(), 0b1001 << 8);
        assert!(!mask.as_update().intersects(StateCtrl::COMMON_ACT_UPDATE));
    }

    #[test]
    fn test_address_split() {
        let addr = 0x0000_0003_8000_1000u64;
        assert_eq!(lo32(addr), 0x8000_1000);
        assert_eq!(hi32(addr), 0x3);
    }

    #[test]
    fn test_hv_packing() {
        assert_eq!(hv(1920, 1080), (1080 << 16) | 1920);
    }
}
