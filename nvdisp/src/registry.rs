//! Window ownership.
//!
//! A window can be programmed and activated only by the head that owns
//! it. Ownership moves between heads by an explicit detach followed by
//! an assign; both run under one registry-wide lock, so other callers
//! never see a head's valid bit and the window's owner disagree.

use spin::Mutex;

use crate::config::MAX_WINDOWS;
use crate::error::{DcError, Result};
use crate::head::{DisplayHead, HeadId};
use crate::port::RegisterPort;
use crate::regs::{set_control, WinReg};

/// Owner of every window on the controller.
pub struct WindowRegistry {
    owners: Mutex<[Option<HeadId>; MAX_WINDOWS]>,
}

impl WindowRegistry {
    pub const fn new() -> Self {
        Self {
            owners: Mutex::new([None; MAX_WINDOWS]),
        }
    }

    /// Current owner of `index`, if any.
    pub fn owner(&self, index: usize) -> Option<HeadId> {
        self.owners.lock().get(index).copied().flatten()
    }

    /// Give `head` ownership of window `index`.
    ///
    /// Succeeds without side effects if `head` already owns it. Fails with
    /// [`DcError::OwnershipConflict`] if another head does; nothing is
    /// changed in that case.
    pub fn assign<P: RegisterPort + ?Sized>(
        &self,
        port: &P,
        head: &DisplayHead,
        index: usize,
    ) -> Result<()> {
        let id = head.id();
        if index >= MAX_WINDOWS {
            log::error!("[NVDISP] assign: window {} out of range for head {}", index, id.0);
            return Err(DcError::InvalidWindow { window: index, head: id });
        }

        let mut owners = self.owners.lock();
        if owners[index] == Some(id) {
            return Ok(());
        }

        head.set_valid(index);
        if let Some(owner) = owners[index] {
            head.clear_valid(index);
            log::error!(
                "[NVDISP] cannot assign win {} to head {}, it is owned by {}",
                index,
                id.0,
                owner.0
            );
            return Err(DcError::OwnershipConflict {
                window: index,
                owner,
            });
        }

        owners[index] = Some(id);
        port.write(index, WinReg::SetControl, set_control::owner(id.0));
        log::debug!("[NVDISP] win {} assigned to head {}", index, id.0);
        Ok(())
    }

    /// Release window `index` from `head`.
    ///
    /// Fails with [`DcError::OwnershipError`] unless `head` is the owner.
    pub fn detach<P: RegisterPort + ?Sized>(
        &self,
        port: &P,
        head: &DisplayHead,
        index: usize,
    ) -> Result<()> {
        let id = head.id();
        let mut owners = self.owners.lock();

        match owners.get(index) {
            Some(Some(owner)) if *owner == id => {}
            _ => {
                log::error!("[NVDISP] window {} does not belong to head {}", index, id.0);
                return Err(DcError::OwnershipError { window: index, head: id });
            }
        }

        port.write(index, WinReg::SetControl, set_control::OWNER_NONE);
        head.clear_valid(index);
        owners[index] = None;
        log::debug!("[NVDISP] win {} detached from head {}", index, id.0);
        Ok(())
    }
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
