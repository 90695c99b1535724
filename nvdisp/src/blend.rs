//! Window blending.
//!
//! The controller keeps the last blend inputs written to every window
//! slot, whichever head wrote them. A window's blend registers are rewritten only when its depth or
//! blend flags change, or, on gen-2 blenders, when its global alpha
//! changes. Mode selection ([`BlendMode::select`]) and register encoding
//! ([`BlendMode::encode`]) are kept apart so each can be checked on its own.

use crate::config::MAX_WINDOWS;
use crate::head::BlenderGeneration;
use crate::port::RegisterPort;
use crate::regs::{layer_control, WinReg};
use crate::window::WindowFlags;

/// Blend factor selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BlendFactor {
    Zero = 0,
    One = 1,
    K1 = 2,
    K2 = 3,
    K1TimesDst = 4,
    NegK1TimesDst = 5,
    K1TimesSrc = 6,
    NegK1TimesSrc = 7,
}

/// Factor selection for one match case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorSelect {
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl FactorSelect {
    pub const fn bits(&self) -> u32 {
        (self.src_color as u32)
            | (self.dst_color as u32) << 8
            | (self.src_alpha as u32) << 16
            | (self.dst_alpha as u32) << 24
    }
}

/// How a window combines with the layers beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Colour weighted by coverage, destination alpha dropped.
    Coverage,
    /// Source already multiplied by alpha.
    Premultiplied,
    /// Opaque, blending disabled.
    Bypass,
}

/// Register values for one blend programming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendRegs {
    /// Match and no-match factor selections; absent in bypass.
    pub factors: Option<(FactorSelect, FactorSelect)>,
    pub layer_control: u32,
}

impl BlendMode {
    /// Coverage wins over premultiplied; anything else is bypass.
    pub fn select(flags: WindowFlags) -> Self {
        if flags.contains(WindowFlags::BLEND_COVERAGE) {
            BlendMode::Coverage
        } else if flags.contains(WindowFlags::BLEND_PREMULT) {
            BlendMode::Premultiplied
        } else {
            BlendMode::Bypass
        }
    }

    pub fn encode(self, z: u32, alpha: u8) -> BlendRegs {
        use BlendFactor::*;

        let depth = layer_control::depth(z);
        let blended = depth
            | layer_control::k2(0xFF)
            | layer_control::k1(alpha as u32)
            | layer_control::BLEND_ENABLE;

        match self {
            BlendMode::Coverage => {
                let select = FactorSelect {
                    src_color: K1TimesSrc,
                    dst_color: NegK1TimesSrc,
                    src_alpha: K2,
                    dst_alpha: Zero,
                };
                BlendRegs {
                    factors: Some((select, select)),
                    layer_control: blended,
                }
            }
            BlendMode::Premultiplied => BlendRegs {
                factors: Some((
                    FactorSelect {
                        src_color: K1,
                        dst_color: NegK1TimesSrc,
                        src_alpha: K2,
                        dst_alpha: Zero,
                    },
                    FactorSelect {
                        src_color: NegK1TimesDst,
                        dst_color: K1,
                        src_alpha: K2,
                        dst_alpha: Zero,
                    },
                )),
                layer_control: blended,
            },
            BlendMode::Bypass => BlendRegs {
                factors: None,
                layer_control: depth | layer_control::BLEND_BYPASS,
            },
        }
    }
}

/// Last blend inputs applied to a window slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub z: u32,
    pub flags: WindowFlags,
    pub alpha: u8,
}

impl BlendState {
    /// Never matches a real request, so the first pass always programs.
    pub const RESET: Self = Self {
        z: u32::MAX,
        flags: WindowFlags::empty(),
        alpha: 0,
    };
}

/// Blend state for every window slot on the controller.
#[derive(Debug, Clone)]
pub struct BlendTable {
    slots: [BlendState; MAX_WINDOWS],
}

impl BlendTable {
    pub const fn new() -> Self {
        Self {
            slots: [BlendState::RESET; MAX_WINDOWS],
        }
    }

    pub fn get(&self, index: usize) -> Option<&BlendState> {
        self.slots.get(index)
    }

    /// Record a request for `index` and report whether the blend
    /// registers have to be rewritten.
    pub fn update(
        &mut self,
        index: usize,
        z: u32,
        flags: WindowFlags,
        alpha: u8,
        blender: BlenderGeneration,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        let flags = flags.blend_bits();

        let mut rewrite = slot.z != z || slot.flags != flags;
        if blender == BlenderGeneration::Gen2 && slot.alpha != alpha {
            rewrite = true;
        }

        // Later comparisons must see the latest request even when
        // nothing is written.
        *slot = BlendState { z, flags, alpha };
        rewrite
    }
}

impl Default for BlendTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Bring a window's blender in line with the requested inputs.
///
/// Returns the mode that was programmed, or `None` when the cached state
/// already matched and no register was touched.
pub fn apply<P: RegisterPort + ?Sized>(
    port: &P,
    table: &mut BlendTable,
    index: usize,
    z: u32,
    flags: WindowFlags,
    alpha: u8,
    blender: BlenderGeneration,
) -> Option<BlendMode> {
    if !table.update(index, z, flags, alpha, blender) {
        return None;
    }

    let mode = BlendMode::select(flags);
    let regs = mode.encode(z, alpha);
    if let Some((matched, unmatched)) = regs.factors {
        port.write(index, WinReg::BlendMatchSelect, matched.bits());
        port.write(index, WinReg::BlendNomatchSelect, unmatched.bits());
    }
    port.write(index, WinReg::BlendLayerControl, regs.layer_control);

    log::trace!("[NVDISP] win {} blend {:?} z={} alpha={}", index, mode, z, alpha);
    Some(mode)
}
