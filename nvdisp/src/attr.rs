//! Window attribute programming.
//!
//! Turns a window's render parameters into the ordered register writes
//! that describe its surface, geometry and format to the window engine.
//! Compilation is pure; [`program`] replays the result through a port.

use alloc::vec::Vec;

use crate::config::PITCH_ALIGN_SHIFT;
use crate::port::RegisterPort;
use crate::regs::{
    cropped_point_fld2, hi32, hv, lo32, planar_storage_uv, set_params, surface_kind, WinOptions,
    WinReg,
};
use crate::window::{PpFlags, SurfaceLayout, WindowFlags, WindowParams};

/// Ordered register writes for one window.
pub type RegWrites = Vec<(WinReg, u32)>;

fn options(params: &WindowParams) -> WinOptions {
    let mut opts = WinOptions::WIN_ENABLE;
    if params.flags.contains(WindowFlags::SCAN_COLUMN) {
        opts |= WinOptions::SCAN_COLUMN;
    }
    if params.flags.contains(WindowFlags::INVERT_H) {
        opts |= WinOptions::H_DIRECTION_DECREMENT;
    }
    if params.flags.contains(WindowFlags::INVERT_V) {
        opts |= WinOptions::V_DIRECTION_DECREMENT;
    }
    if params.format.bits_per_pixel() < 24 {
        opts |= WinOptions::COLOR_EXPAND;
    }
    if params.pp_flags.contains(PpFlags::CP_ENABLE) {
        opts |= WinOptions::CP_ENABLE;
    }
    opts
}

fn surface_kind_bits(layout: SurfaceLayout) -> u32 {
    match layout {
        SurfaceLayout::BlockLinear { block_height_log2 } => {
            surface_kind::KIND_BL | surface_kind::block_height(block_height_log2)
        }
        SurfaceLayout::Tiled => surface_kind::KIND_TILED,
        SurfaceLayout::Pitch => surface_kind::KIND_PITCH,
    }
}

fn push_addr(out: &mut RegWrites, lo: WinReg, hi: WinReg, addr: u64) {
    out.push((lo, lo32(addr)));
    out.push((hi, hi32(addr)));
}

/// Compile the attribute writes for one window.
///
/// `interlaced` is true when the head scans out interlaced and this
/// window slot supports it.
pub fn compile(params: &WindowParams, interlaced: bool) -> RegWrites {
    let fmt = params.format;
    let yuvp = fmt.is_yuv_planar();
    let yuvsp = fmt.is_yuv_semi_planar();
    let mut out = RegWrites::with_capacity(24);

    out.push((WinReg::ColorDepth, fmt.hw_code()));
    out.push((WinReg::Position, hv(params.out_x, params.out_y)));

    let out_h = if interlaced {
        params.out_h >> 1
    } else {
        params.out_h
    };
    out.push((WinReg::Size, hv(params.out_w, out_h)));
    out.push((WinReg::Options, options(params).bits()));
    out.push((WinReg::CroppedSizeIn, hv(params.w.trunc(), params.h.trunc())));

    push_addr(&mut out, WinReg::StartAddr, WinReg::StartAddrHi, params.phys_addr);
    out.push((WinReg::PlanarStorage, params.stride >> PITCH_ALIGN_SHIFT));

    let uv_pitch = params.stride_uv >> PITCH_ALIGN_SHIFT;
    if yuvp {
        push_addr(&mut out, WinReg::StartAddrU, WinReg::StartAddrHiU, params.phys_addr_u);
        push_addr(&mut out, WinReg::StartAddrV, WinReg::StartAddrHiV, params.phys_addr_v);
        out.push((
            WinReg::PlanarStorageUv,
            planar_storage_uv::uv0(uv_pitch) | planar_storage_uv::uv1(uv_pitch),
        ));
    } else if yuvsp {
        push_addr(&mut out, WinReg::StartAddrU, WinReg::StartAddrHiU, params.phys_addr_u);
        out.push((WinReg::PlanarStorageUv, planar_storage_uv::uv0(uv_pitch)));
    }

    let cs_range = if fmt.is_yuv() {
        set_params::CS_RANGE_YUV_709
    } else {
        set_params::CS_RANGE_RGB
    };
    out.push((
        WinReg::SetParams,
        cs_range | set_params::IN_RANGE_BYPASS | set_params::DEGAMMA_RANGE_NONE,
    ));

    // Crop offsets are not supported; the image is always displayed from
    // the surface origin.
    let (h_offset, v_offset) = (0u32, 0u32);
    out.push((WinReg::CroppedPoint, hv(h_offset, v_offset)));

    if interlaced {
        compile_field2(params, h_offset, v_offset, &mut out);
    }

    out.push((WinReg::SurfaceKind, surface_kind_bits(params.layout)));
    out
}

fn compile_field2(params: &WindowParams, h_offset: u32, v_offset: u32, out: &mut RegWrites) {
    let fmt = params.format;
    let source_interlaced = params.flags.contains(WindowFlags::INTERLACE);

    // A progressive framebuffer scans both fields from the same lines.
    let addr2 = if params.flags.contains(WindowFlags::FB) && !source_interlaced {
        params.phys_addr
    } else {
        params.phys_addr2
    };
    push_addr(out, WinReg::StartAddrFld2, WinReg::StartAddrFld2Hi, addr2);

    if fmt.is_yuv_planar() {
        push_addr(out, WinReg::StartAddrFld2U, WinReg::StartAddrFld2HiU, params.phys_addr_u2);
        push_addr(out, WinReg::StartAddrFld2V, WinReg::StartAddrFld2HiV, params.phys_addr_v2);
    } else if fmt.is_yuv_semi_planar() {
        push_addr(out, WinReg::StartAddrFld2U, WinReg::StartAddrFld2HiU, params.phys_addr_u2);
    }

    out.push((WinReg::CroppedPointFld2, cropped_point_fld2::h(h_offset)));

    // Progressive sources start the second field one line down.
    let v2 = if source_interlaced {
        v_offset
    } else {
        v_offset + 1
    };
    out.push((WinReg::CroppedPointFld2, cropped_point_fld2::v(v2)));
}

/// Compile and write a window's attributes.
pub fn program<P: RegisterPort + ?Sized>(
    port: &P,
    index: usize,
    params: &WindowParams,
    interlaced: bool,
) {
    for (reg, value) in compile(params, interlaced) {
        port.write(index, reg, value);
    }
}
