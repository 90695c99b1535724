//! Head interrupts.
//!
//! A vblank-gated commit only arms interrupts; completion is observed here
//! when frame-end or vblank fires and a flip is pending, at which point
//! every window of the head is marked clean again.

use alloc::sync::Arc;

use crate::head::{DisplayHead, HeadId};
use crate::port::RegisterPort;
use crate::regs::{HeadReg, IntStatus};
use crate::window::Window;

/// Interrupt mask control for a head.
pub trait InterruptController: Send + Sync {
    fn unmask(&self, head: HeadId, sources: IntStatus);
    fn mask(&self, head: HeadId, sources: IntStatus);
}

/// Interrupt controller backed by the head's own mask register.
///
/// `unmask` and `mask` read and then write the register in two port calls;
/// callers serialize the interrupt and commit paths of a head.
pub struct IntMaskRegister<P: RegisterPort> {
    port: Arc<P>,
}

impl<P: RegisterPort> IntMaskRegister<P> {
    pub fn new(port: Arc<P>) -> Self {
        Self { port }
    }
}

impl<P: RegisterPort> InterruptController for IntMaskRegister<P> {
    fn unmask(&self, head: HeadId, sources: IntStatus) {
        let enabled = self.port.head_read(head, HeadReg::CmdIntMask);
        self.port
            .head_write(head, HeadReg::CmdIntMask, enabled | sources.bits());
    }

    fn mask(&self, head: HeadId, sources: IntStatus) {
        let enabled = self.port.head_read(head, HeadReg::CmdIntMask);
        self.port
            .head_write(head, HeadReg::CmdIntMask, enabled & !sources.bits());
    }
}

/// What an interrupt did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrqOutcome {
    /// A pending flip completed and dirty flags were cleared.
    pub flip_completed: bool,
    pub underflow: bool,
}

/// Handle `status` for `head`.
///
/// `windows` is the controller's full window set; only those valid for
/// `head` are touched.
pub fn service(head: &DisplayHead, windows: &[Window], status: IntStatus) -> IrqOutcome {
    let mut outcome = IrqOutcome::default();

    if status.intersects(IntStatus::UNDERFLOW) {
        let count = head.record_underflow();
        log::warn!("[NVDISP] head {} underflow (total {})", head.id().0, count);
        outcome.underflow = true;
    }

    if status.intersects(IntStatus::FRAME_END | IntStatus::V_BLANK) && head.take_flip_pending() {
        for win in windows.iter().filter(|w| head.is_valid(w.index())) {
            win.set_dirty(false);
        }
        outcome.flip_completed = true;
        log::trace!("[NVDISP] head {} flip complete", head.id().0);
    }

    outcome
}
