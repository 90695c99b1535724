//! Display controller.
//!
//! Bundles the register port, window registry, heads and windows of one
//! controller instance. Commit sequencing lives in [`crate::commit`].

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use crate::blend::BlendTable;
use crate::config::{DcConfig, MAX_HEADS, MAX_WINDOWS};
use crate::error::{DcError, Result};
use crate::head::{DisplayHead, HeadDescriptor, HeadId};
use crate::irq::{self, InterruptController, IrqOutcome};
use crate::port::RegisterPort;
use crate::registry::WindowRegistry;
use crate::regs::{HeadReg, IntStatus};
use crate::window::Window;
use crate::workqueue::{CancelToken, Clock, WorkQueue};

/// Work deferred past the end of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Push another frame out of a one-shot head.
    OneShotTrigger(HeadId),
}

/// One display controller and everything it owns.
pub struct DisplayController<P: RegisterPort> {
    pub(crate) port: Arc<P>,
    pub(crate) config: DcConfig,
    pub(crate) registry: WindowRegistry,
    pub(crate) heads: Vec<DisplayHead>,
    pub(crate) windows: Vec<Window>,
    /// Last blend state written to each window slot, whichever head owns it.
    pub(crate) blend: Mutex<BlendTable>,
    pub(crate) irq: Arc<dyn InterruptController>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) deferred: WorkQueue<Deferred>,
    /// Outstanding one-shot continuation per head.
    pub(crate) one_shot: Mutex<BTreeMap<HeadId, CancelToken>>,
}

impl<P: RegisterPort> DisplayController<P> {
    /// Create a controller with every window unowned.
    ///
    /// Head ids must be below [`MAX_HEADS`] and unique. Descriptors that
    /// break either rule are logged and left out, so operations naming
    /// them fail with [`DcError::InvalidHead`].
    pub fn new(
        port: Arc<P>,
        irq: Arc<dyn InterruptController>,
        clock: Arc<dyn Clock>,
        config: DcConfig,
        heads: impl IntoIterator<Item = HeadDescriptor>,
    ) -> Self {
        let mut present: Vec<DisplayHead> = Vec::with_capacity(MAX_HEADS);
        for desc in heads {
            if desc.id.0 as usize >= MAX_HEADS {
                log::error!(
                    "[NVDISP] head {} out of range (max {}), ignored",
                    desc.id.0,
                    MAX_HEADS
                );
                continue;
            }
            if present.iter().any(|h| h.id() == desc.id) {
                log::error!("[NVDISP] duplicate head {}, ignored", desc.id.0);
                continue;
            }
            present.push(DisplayHead::new(desc));
        }
        let windows = (0..MAX_WINDOWS).map(Window::new).collect();

        log::info!(
            "[NVDISP] controller up: {} heads, {} windows{}",
            present.len(),
            MAX_WINDOWS,
            if config.simulated { " (simulator)" } else { "" }
        );

        Self {
            port,
            config,
            registry: WindowRegistry::new(),
            heads: present,
            windows,
            blend: Mutex::new(BlendTable::new()),
            irq,
            clock,
            deferred: WorkQueue::new(),
            one_shot: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn port(&self) -> &Arc<P> {
        &self.port
    }

    pub fn config(&self) -> &DcConfig {
        &self.config
    }

    pub fn head(&self, id: HeadId) -> Result<&DisplayHead> {
        self.heads
            .iter()
            .find(|h| h.id() == id)
            .ok_or(DcError::InvalidHead(id))
    }

    pub fn window(&self, index: usize) -> Option<&Window> {
        self.windows.get(index)
    }

    pub fn window_owner(&self, index: usize) -> Option<HeadId> {
        self.registry.owner(index)
    }

    /// The window bound to `head` at `index`, if `head` owns it.
    pub(crate) fn bound_window(&self, head: &DisplayHead, index: usize) -> Option<&Window> {
        if head.is_valid(index) {
            self.windows.get(index)
        } else {
            None
        }
    }

    /// Give `head` ownership of window `index`.
    pub fn assign_window(&self, head: HeadId, index: usize) -> Result<()> {
        let head = self.head(head)?;
        self.registry.assign(&*self.port, head, index)
    }

    /// Release window `index` from `head`.
    pub fn detach_window(&self, head: HeadId, index: usize) -> Result<()> {
        let head = self.head(head)?;
        self.registry.detach(&*self.port, head, index)
    }

    /// Interrupt entry for `head`: acknowledge `status` and complete any
    /// pending flip.
    pub fn handle_interrupt(&self, head: HeadId, status: IntStatus) -> Result<IrqOutcome> {
        let dc_head = self.head(head)?;
        self.port
            .head_write(head, HeadReg::CmdIntStatus, status.bits());
        Ok(irq::service(dc_head, &self.windows, status))
    }

    /// Run deferred work that is due. Returns how many items ran.
    pub fn run_deferred(&self) -> usize {
        let due = self.deferred.run_due(self.clock.now());
        let count = due.len();
        for work in due {
            match work {
                Deferred::OneShotTrigger(head) => self.retrigger_one_shot(head),
            }
        }
        count
    }

    /// Drop a head's outstanding one-shot continuation, if any.
    pub fn cancel_one_shot(&self, head: HeadId) -> bool {
        match self.one_shot.lock().remove(&head) {
            Some(token) => token.cancel(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irq::IntMaskRegister;
    use crate::port::RecordingPort;
    use crate::workqueue::ManualClock;

    fn controller() -> DisplayController<RecordingPort> {
        let port = Arc::new(RecordingPort::new());
        let irq = Arc::new(IntMaskRegister::new(port.clone()));
        DisplayController::new(
            port,
            irq,
            Arc::new(ManualClock::new()),
            DcConfig::default(),
            [HeadDescriptor::new(HeadId(0)), HeadDescriptor::new(HeadId(1))],
        )
    }

    #[test]
    fn test_unknown_head_rejected() {
        let dc = controller();
        assert_eq!(dc.assign_window(HeadId(7), 0), Err(DcError::InvalidHead(HeadId(7))));
        assert!(dc.handle_interrupt(HeadId(7), IntStatus::V_BLANK).is_err());
    }

    #[test]
    fn test_ownership_exclusive_across_heads() {
        let dc = controller();
        dc.assign_window(HeadId(0), 1).unwrap();
        assert!(dc.assign_window(HeadId(1), 1).is_err());

        for index in 0..MAX_WINDOWS {
            let owners = dc.heads.iter().filter(|h| h.is_valid(index)).count();
            assert!(owners <= 1);
        }
        assert_eq!(dc.window_owner(1), Some(HeadId(0)));
    }

    #[test]
    fn test_out_of_range_and_duplicate_heads_dropped() {
        let port = Arc::new(RecordingPort::new());
        let irq = Arc::new(IntMaskRegister::new(port.clone()));
        let dc = DisplayController::new(
            port,
            irq,
            Arc::new(ManualClock::new()),
            DcConfig::default(),
            [
                HeadDescriptor::new(HeadId(0)),
                HeadDescriptor::new(HeadId(16)),
                HeadDescriptor::new(HeadId(15)),
                HeadDescriptor::new(HeadId(0)).with_one_shot(5),
                HeadDescriptor::new(HeadId(2)),
            ],
        );

        assert_eq!(dc.heads.len(), 2);
        assert!(!dc.head(HeadId(0)).unwrap().descriptor().one_shot);
        assert!(dc.head(HeadId(2)).is_ok());

        // Out-of-range ids never reach the owner field.
        assert_eq!(
            dc.assign_window(HeadId(16), 2),
            Err(DcError::InvalidHead(HeadId(16)))
        );
        assert_eq!(
            dc.assign_window(HeadId(15), 2),
            Err(DcError::InvalidHead(HeadId(15)))
        );
        assert_eq!(dc.window_owner(2), None);
        assert!(dc.port().writes().is_empty());
    }

    #[test]
    fn test_interrupt_acknowledges_status() {
        let dc = controller();
        dc.handle_interrupt(HeadId(1), IntStatus::FRAME_END).unwrap();
        assert_eq!(
            dc.port().head_writes(HeadId(1)),
            alloc::vec![(HeadReg::CmdIntStatus, IntStatus::FRAME_END.bits())]
        );
    }
}
