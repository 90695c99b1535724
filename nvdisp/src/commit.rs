//! Commit sequencing.
//!
//! [`DisplayController::update_windows`] programs a batch of windows on
//! one head and activates all of them with a single state-control write.
//! The call never waits for hardware: with `wait_for_vblank` set it arms
//! the head's interrupts and leaves completion to
//! [`DisplayController::handle_interrupt`].
//!
//! Validation is per window and not transactional. If the n-th request is
//! invalid the batch stops there, but registers already written for the
//! requests before it stay written.

use core::time::Duration;

use crate::attr;
use crate::blend;
use crate::config::PITCH_ALIGN_SHIFT;
use crate::controller::{Deferred, DisplayController};
use crate::error::{DcError, Result};
use crate::head::{DisplayHead, HeadId};
use crate::port::RegisterPort;
use crate::regs::{act_control, HeadReg, IntStatus, StateCtrl, WinReg};
use crate::window::{DirtyRect, WindowParams, WindowRequest};

impl<P: RegisterPort> DisplayController<P> {
    /// Program and activate `windows` on `head`.
    pub fn update_windows(
        &self,
        head: HeadId,
        windows: &mut [WindowRequest],
        dirty_rect: Option<DirtyRect>,
        wait_for_vblank: bool,
    ) -> Result<()> {
        let dc_head = self.head(head)?;
        let desc = dc_head.descriptor();
        let mut update_mask = StateCtrl::GENERAL_ACT_REQ;

        if let Some(rect) = dirty_rect {
            log::trace!(
                "[NVDISP] head {} dirty rect {}x{}+{}+{} (full update)",
                head.0,
                rect.w,
                rect.h,
                rect.x,
                rect.y
            );
        }

        for req in windows.iter_mut() {
            let index = req.index;
            let Some(bound) = self.bound_window(dc_head, index) else {
                log::error!("[NVDISP] invalid window {} to update on head {}", index, head.0);
                return Err(DcError::InvalidWindow { window: index, head });
            };

            if !req.params.is_enabled() {
                bound.set_dirty(!self.config.no_vsync);
                continue;
            }

            update_mask |= StateCtrl::win_act_req(index);

            let act = if wait_for_vblank {
                act_control::CTRL_SEL_VCOUNTER
            } else {
                act_control::CTRL_SEL_HCOUNTER
            };
            self.port.write(index, WinReg::ActControl, act);

            let caps = desc.caps(index);
            {
                let mut table = self.blend.lock();
                blend::apply(
                    &*self.port,
                    &mut table,
                    index,
                    req.params.z,
                    req.params.flags,
                    req.params.global_alpha,
                    caps.blender,
                );
            }
            self.program_scaler(index, &req.params);
            if let Some(addr) = req.params.cde_addr {
                self.program_compression(index, addr);
            }
            attr::program(
                &*self.port,
                index,
                &req.params,
                desc.interlaced && caps.supports_interlace,
            );

            bound.set_dirty(true);
            req.dirty = true;
            log::trace!(
                "[NVDISP] head {} win {} fmt {:?} {}x{}@{},{} z={}",
                head.0,
                index,
                req.params.format,
                req.params.out_w,
                req.params.out_h,
                req.params.out_x,
                req.params.out_y,
                req.params.z
            );
        }

        if self.config.simulated {
            // The simulator never raises these; acknowledge them up front.
            self.port.head_write(
                head,
                HeadReg::CmdIntStatus,
                (IntStatus::FRAME_END | IntStatus::V_BLANK).bits(),
            );
        }

        self.port.head_write(
            head,
            HeadReg::CmdStateCtrl,
            (update_mask.as_update() | StateCtrl::COMMON_ACT_UPDATE).bits(),
        );

        if wait_for_vblank {
            dc_head.set_flip_pending(true);
            self.irq.unmask(
                head,
                IntStatus::FRAME_END | IntStatus::V_BLANK | IntStatus::UNDERFLOW,
            );
        }

        if desc.one_shot {
            self.schedule_one_shot(dc_head);
        }
        dc_head.set_crc_pending(true);

        if desc.one_shot {
            update_mask |= StateCtrl::HOST_TRIG | StateCtrl::COMMON_ACT_REQ;
        }
        self.port
            .head_write(head, HeadReg::CmdStateCtrl, update_mask.bits());

        Ok(())
    }

    /// Line pitch in bytes currently programmed for window `index`.
    pub fn get_line_stride(&self, head: HeadId, index: usize) -> Result<u32> {
        let dc_head = self.head(head)?;
        if self.bound_window(dc_head, index).is_none() {
            log::error!("[NVDISP] window {} does not belong to head {}", index, head.0);
            return Err(DcError::InvalidWindow { window: index, head });
        }
        Ok(self.port.read(index, WinReg::PlanarStorage) << PITCH_ALIGN_SHIFT)
    }

    /// Windows are scanned out 1:1; the scaler is left in its reset state.
    fn program_scaler(&self, index: usize, params: &WindowParams) {
        if params.w.trunc() != params.out_w || params.h.trunc() != params.out_h {
            log::debug!(
                "[NVDISP] win {}: scaling {}x{} -> {}x{} not supported, scanning 1:1",
                index,
                params.w.trunc(),
                params.h.trunc(),
                params.out_w,
                params.out_h
            );
        }
    }

    /// Compressed surfaces are scanned out through the uncompressed path.
    fn program_compression(&self, index: usize, addr: u64) {
        log::debug!(
            "[NVDISP] win {}: compression surface {:#x} not supported",
            index,
            addr
        );
    }

    /// Queue the next frame push for a one-shot head. An already
    /// outstanding continuation keeps its deadline.
    fn schedule_one_shot(&self, head: &DisplayHead) {
        let id = head.id();
        let mut outstanding = self.one_shot.lock();
        if outstanding.get(&id).map_or(false, |token| token.is_pending()) {
            return;
        }

        let delay = Duration::from_millis(head.descriptor().one_shot_delay_ms);
        let token = self
            .deferred
            .schedule(self.clock.now(), delay, Deferred::OneShotTrigger(id));
        outstanding.insert(id, token);
    }

    pub(crate) fn retrigger_one_shot(&self, head: HeadId) {
        if self.head(head).is_err() {
            return;
        }
        log::trace!("[NVDISP] head {} one-shot trigger", head.0);
        self.port.head_write(
            head,
            HeadReg::CmdStateCtrl,
            (StateCtrl::HOST_TRIG | StateCtrl::COMMON_ACT_REQ).bits(),
        );
    }
}
