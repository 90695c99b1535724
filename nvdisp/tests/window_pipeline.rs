//! End-to-end checks of the window pipeline through the public API.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nvdisp::config::MAX_WINDOWS;
use nvdisp::regs::{HeadReg, StateCtrl, WinReg};
use nvdisp::{
    BlenderGeneration, DcConfig, DcError, DisplayController, Fixed20_12, HeadDescriptor, HeadId,
    IntMaskRegister, IntStatus, ManualClock, PixelFormat, RecordingPort, RegisterPort,
    SurfaceLayout, WindowCaps, WindowFlags, WindowParams, WindowRequest,
};

const PRIMARY: HeadId = HeadId(0);
const EXTERNAL: HeadId = HeadId(1);

fn controller(primary: HeadDescriptor) -> (DisplayController<RecordingPort>, Arc<ManualClock>) {
    let port = Arc::new(RecordingPort::new());
    let irq = Arc::new(IntMaskRegister::new(port.clone()));
    let clock = Arc::new(ManualClock::new());
    let dc = DisplayController::new(
        port,
        irq,
        clock.clone(),
        DcConfig::default(),
        [primary, HeadDescriptor::new(EXTERNAL)],
    );
    (dc, clock)
}

fn video_plane(index: usize) -> WindowRequest {
    WindowRequest::new(
        index,
        WindowParams {
            flags: WindowFlags::ENABLED | WindowFlags::BLEND_PREMULT,
            format: PixelFormat::YCbCr420P,
            layout: SurfaceLayout::BlockLinear {
                block_height_log2: 4,
            },
            out_x: 100,
            out_y: 50,
            out_w: 1920,
            out_h: 1080,
            w: Fixed20_12::from_int(1920),
            h: Fixed20_12::from_int(1080),
            z: 1,
            global_alpha: 0xFF,
            phys_addr: 0x1_0000_0000,
            phys_addr_u: 0x1_0020_0000,
            phys_addr_v: 0x1_0030_0000,
            stride: 2048,
            stride_uv: 1024,
            ..WindowParams::default()
        },
    )
}

fn cursor_plane(index: usize) -> WindowRequest {
    WindowRequest::new(
        index,
        WindowParams {
            flags: WindowFlags::ENABLED | WindowFlags::BLEND_COVERAGE,
            format: PixelFormat::A8R8G8B8,
            out_w: 64,
            out_h: 64,
            w: Fixed20_12::from_int(64),
            h: Fixed20_12::from_int(64),
            z: 5,
            global_alpha: 0xC0,
            phys_addr: 0x9000_0000,
            stride: 256,
            ..WindowParams::default()
        },
    )
}

#[test]
fn test_window_moves_between_heads_only_via_detach() {
    let (dc, _) = controller(HeadDescriptor::new(PRIMARY));

    dc.assign_window(PRIMARY, 2).unwrap();
    assert_eq!(
        dc.assign_window(EXTERNAL, 2),
        Err(DcError::OwnershipConflict {
            window: 2,
            owner: PRIMARY
        })
    );
    assert_eq!(dc.window_owner(2), Some(PRIMARY));

    assert_eq!(
        dc.detach_window(EXTERNAL, 2),
        Err(DcError::OwnershipError {
            window: 2,
            head: EXTERNAL
        })
    );
    assert_eq!(dc.window_owner(2), Some(PRIMARY));

    dc.detach_window(PRIMARY, 2).unwrap();
    dc.assign_window(EXTERNAL, 2).unwrap();
    assert_eq!(dc.window_owner(2), Some(EXTERNAL));
    assert!(!dc.head(PRIMARY).unwrap().is_valid(2));
    assert!(dc.head(EXTERNAL).unwrap().is_valid(2));
}

#[test]
fn test_concurrent_assign_has_single_winner() {
    let (dc, _) = controller(HeadDescriptor::new(PRIMARY));
    let dc = Arc::new(dc);

    let handles: Vec<_> = [PRIMARY, EXTERNAL]
        .into_iter()
        .map(|head| {
            let dc = dc.clone();
            thread::spawn(move || {
                (0..MAX_WINDOWS)
                    .filter(|&index| dc.assign_window(head, index).is_ok())
                    .count()
            })
        })
        .collect();
    let won: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(won, MAX_WINDOWS);

    let primary = dc.head(PRIMARY).unwrap().valid_windows();
    let external = dc.head(EXTERNAL).unwrap().valid_windows();
    assert_eq!(primary & external, 0);
    assert_eq!(primary | external, (1 << MAX_WINDOWS) - 1);
}

#[test]
fn test_vblank_flip_round_trip() {
    let (dc, _) = controller(HeadDescriptor::new(PRIMARY));
    dc.assign_window(PRIMARY, 0).unwrap();
    dc.assign_window(PRIMARY, 1).unwrap();
    dc.port().clear_log();

    let mut batch = [video_plane(0), cursor_plane(1)];
    dc.update_windows(PRIMARY, &mut batch, None, true).unwrap();
    assert!(batch.iter().all(|req| req.dirty));

    let port = dc.port();
    // Planar video: two chroma planes plus the shared chroma pitch.
    assert_eq!(port.read(0, WinReg::StartAddrHiU), 0x1);
    assert_eq!(port.read(0, WinReg::StartAddrV), 0x0030_0000);
    assert_eq!(port.read(0, WinReg::PlanarStorageUv), 16 | (16 << 16));
    assert_eq!(port.read(0, WinReg::SurfaceKind), 0x2 | (4 << 4));
    // Cursor: RGB, no chroma programming at all.
    assert!(port
        .window_writes(1)
        .iter()
        .all(|(reg, _)| *reg != WinReg::StartAddrU && *reg != WinReg::PlanarStorageUv));

    let activate = StateCtrl::GENERAL_ACT_REQ | StateCtrl::win_act_req(0) | StateCtrl::win_act_req(1);
    assert_eq!(port.head_read(PRIMARY, HeadReg::CmdStateCtrl), activate.bits());

    assert!(dc.window(0).unwrap().is_dirty());
    let outcome = dc
        .handle_interrupt(PRIMARY, IntStatus::FRAME_END | IntStatus::V_BLANK)
        .unwrap();
    assert!(outcome.flip_completed);
    assert!(!dc.window(0).unwrap().is_dirty());
    assert!(!dc.window(1).unwrap().is_dirty());
}

#[test]
fn test_partial_batch_is_not_rolled_back() {
    let (dc, _) = controller(HeadDescriptor::new(PRIMARY));
    dc.assign_window(PRIMARY, 0).unwrap();
    dc.assign_window(PRIMARY, 2).unwrap();
    dc.port().clear_log();

    let mut batch = [video_plane(0), cursor_plane(1), cursor_plane(2)];
    assert_eq!(
        dc.update_windows(PRIMARY, &mut batch, None, false),
        Err(DcError::InvalidWindow {
            window: 1,
            head: PRIMARY
        })
    );

    assert_eq!(dc.port().read(0, WinReg::StartAddrHi), 0x1);
    assert_eq!(dc.port().read(0, WinReg::ColorDepth), PixelFormat::YCbCr420P.hw_code());
    assert!(dc.port().window_writes(2).is_empty());
    assert!(dc.window(0).unwrap().is_dirty());
    assert!(!dc.window(2).unwrap().is_dirty());
}

#[test]
fn test_repeated_commit_suppresses_blend_writes() {
    let (dc, _) = controller(HeadDescriptor::new(PRIMARY));
    dc.assign_window(PRIMARY, 3).unwrap();

    let mut req = cursor_plane(3);
    dc.update_windows(PRIMARY, std::slice::from_mut(&mut req), None, false)
        .unwrap();
    dc.port().clear_log();

    // Gen-1 blender: an alpha-only change is cached but not written.
    req.params.global_alpha = 0x20;
    dc.update_windows(PRIMARY, std::slice::from_mut(&mut req), None, false)
        .unwrap();
    assert!(dc.port().window_writes(3).iter().all(|(reg, _)| !matches!(
        reg,
        WinReg::BlendLayerControl | WinReg::BlendMatchSelect | WinReg::BlendNomatchSelect
    )));
}

#[test]
fn test_one_shot_panel_retriggers_after_delay() {
    let caps = WindowCaps {
        supports_interlace: false,
        blender: BlenderGeneration::Gen2,
    };
    let desc = HeadDescriptor::new(PRIMARY)
        .with_one_shot(33)
        .with_window_caps(caps);
    let (dc, clock) = controller(desc);
    dc.assign_window(PRIMARY, 0).unwrap();

    dc.update_windows(PRIMARY, &mut [cursor_plane(0)], None, false)
        .unwrap();
    assert!(dc.head(PRIMARY).unwrap().crc_pending());

    clock.advance(Duration::from_millis(32));
    assert_eq!(dc.run_deferred(), 0);

    dc.port().clear_log();
    clock.advance(Duration::from_millis(1));
    assert_eq!(dc.run_deferred(), 1);
    assert_eq!(
        dc.port().head_writes(PRIMARY),
        vec![(
            HeadReg::CmdStateCtrl,
            (StateCtrl::HOST_TRIG | StateCtrl::COMMON_ACT_REQ).bits()
        )]
    );
}

#[test]
fn test_line_stride_readback() {
    let (dc, _) = controller(HeadDescriptor::new(PRIMARY));
    dc.assign_window(PRIMARY, 5).unwrap();

    let mut req = cursor_plane(5);
    req.params.stride = 4096;
    dc.update_windows(PRIMARY, std::slice::from_mut(&mut req), None, false)
        .unwrap();
    assert_eq!(dc.get_line_stride(PRIMARY, 5), Ok(4096));
    assert_eq!(
        dc.get_line_stride(EXTERNAL, 5),
        Err(DcError::InvalidWindow {
            window: 5,
            head: EXTERNAL
        })
    );
}
