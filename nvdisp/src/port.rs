//! Register access.
//!
//! The pipeline never touches hardware directly; every read and write goes
//! through a [`RegisterPort`]. [`MmioPort`] drives real silicon,
//! [`RecordingPort`] is a software register file used by the simulator
//! bring-up path and by tests.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use spin::Mutex;

use crate::head::HeadId;
use crate::regs::{HeadReg, WinReg, HEAD_BLOCK_SIZE, WINDOW_BLOCK_SIZE};

/// Scoped access to window and head register blocks.
///
/// Accesses are assumed to complete synchronously and cannot fail.
pub trait RegisterPort: Send + Sync {
    fn read(&self, window: usize, reg: WinReg) -> u32;
    fn write(&self, window: usize, reg: WinReg, value: u32);
    fn head_read(&self, head: HeadId, reg: HeadReg) -> u32;
    fn head_write(&self, head: HeadId, reg: HeadReg, value: u32);
}

/// Memory-mapped register aperture.
pub struct MmioPort {
    /// Virtual address of window 0's register block
    window_base: u64,
    /// Virtual address of head 0's command block
    head_base: u64,
}

impl MmioPort {
    /// Create a port over mapped register apertures.
    ///
    /// # Safety
    ///
    /// Both bases must be mapped uncached for the full extent of every
    /// window and head block, for as long as the port is alive.
    pub unsafe fn new(window_base: u64, head_base: u64) -> Self {
        Self {
            window_base,
            head_base,
        }
    }

    fn window_addr(&self, window: usize, reg: WinReg) -> u64 {
        self.window_base + window as u64 * WINDOW_BLOCK_SIZE + reg.offset() as u64
    }

    fn head_addr(&self, head: HeadId, reg: HeadReg) -> u64 {
        self.head_base + head.0 as u64 * HEAD_BLOCK_SIZE + reg.offset() as u64
    }
}

impl RegisterPort for MmioPort {
    fn read(&self, window: usize, reg: WinReg) -> u32 {
        unsafe { core::ptr::read_volatile(self.window_addr(window, reg) as *const u32) }
    }

    fn write(&self, window: usize, reg: WinReg, value: u32) {
        unsafe {
            core::ptr::write_volatile(self.window_addr(window, reg) as *mut u32, value);
        }
    }

    fn head_read(&self, head: HeadId, reg: HeadReg) -> u32 {
        unsafe { core::ptr::read_volatile(self.head_addr(head, reg) as *const u32) }
    }

    fn head_write(&self, head: HeadId, reg: HeadReg, value: u32) {
        unsafe {
            core::ptr::write_volatile(self.head_addr(head, reg) as *mut u32, value);
        }
    }
}

/// One register write observed by a [`RecordingPort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegAccess {
    Window { window: usize, reg: WinReg, value: u32 },
    Head { head: HeadId, reg: HeadReg, value: u32 },
}

#[derive(Default)]
struct RegisterFile {
    window_regs: BTreeMap<(usize, WinReg), u32>,
    head_regs: BTreeMap<(HeadId, HeadReg), u32>,
    log: Vec<RegAccess>,
}

/// Software register file that keeps every write in issue order.
#[derive(Default)]
pub struct RecordingPort {
    inner: Mutex<RegisterFile>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes since creation or the last [`clear_log`](Self::clear_log).
    pub fn writes(&self) -> Vec<RegAccess> {
        self.inner.lock().log.clone()
    }

    /// Writes to one window, in order.
    pub fn window_writes(&self, window: usize) -> Vec<(WinReg, u32)> {
        self.inner
            .lock()
            .log
            .iter()
            .filter_map(|access| match *access {
                RegAccess::Window {
                    window: w,
                    reg,
                    value,
                } if w == window => Some((reg, value)),
                _ => None,
            })
            .collect()
    }

    /// Writes to one head's command block, in order.
    pub fn head_writes(&self, head: HeadId) -> Vec<(HeadReg, u32)> {
        self.inner
            .lock()
            .log
            .iter()
            .filter_map(|access| match *access {
                RegAccess::Head { head: h, reg, value } if h == head => Some((reg, value)),
                _ => None,
            })
            .collect()
    }

    /// Forget the write log; register contents are kept.
    pub fn clear_log(&self) {
        self.inner.lock().log.clear();
    }
}

impl RegisterPort for RecordingPort {
    fn read(&self, window: usize, reg: WinReg) -> u32 {
        self.inner
            .lock()
            .window_regs
            .get(&(window, reg))
            .copied()
            .unwrap_or(0)
    }

    fn write(&self, window: usize, reg: WinReg, value: u32) {
        let mut file = self.inner.lock();
        file.window_regs.insert((window, reg), value);
        file.log.push(RegAccess::Window { window, reg, value });
    }

    fn head_read(&self, head: HeadId, reg: HeadReg) -> u32 {
        self.inner
            .lock()
            .head_regs
            .get(&(head, reg))
            .copied()
            .unwrap_or(0)
    }

    fn head_write(&self, head: HeadId, reg: HeadReg, value: u32) {
        let mut file = self.inner.lock();
        file.head_regs.insert((head, reg), value);
        file.log.push(RegAccess::Head { head, reg, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_port_keeps_order_and_values() {
        let port = RecordingPort::new();
        port.write(1, WinReg::Position, 7);
        port.head_write(HeadId(0), HeadReg::CmdStateCtrl, 3);
        port.write(1, WinReg::Position, 9);

        assert_eq!(port.read(1, WinReg::Position), 9);
        assert_eq!(port.read(2, WinReg::Position), 0);
        assert_eq!(
            port.window_writes(1),
            alloc::vec![(WinReg::Position, 7), (WinReg::Position, 9)]
        );
        assert_eq!(port.head_writes(HeadId(0)), alloc::vec![(HeadReg::CmdStateCtrl, 3)]);

        port.clear_log();
        assert!(port.writes().is_empty());
        assert_eq!(port.head_read(HeadId(0), HeadReg::CmdStateCtrl), 3);
    }

    #[test]
    fn test_mmio_port_against_backing_memory() {
        let mut windows = alloc::vec![0u32; (2 * WINDOW_BLOCK_SIZE as usize) / 4];
        let mut heads = alloc::vec![0u32; HEAD_BLOCK_SIZE as usize / 4];
        let port = unsafe {
            MmioPort::new(windows.as_mut_ptr() as u64, heads.as_mut_ptr() as u64)
        };

        port.write(1, WinReg::PlanarStorage, 64);
        port.head_write(HeadId(0), HeadReg::CmdStateCtrl, 0x2_0003);

        assert_eq!(port.read(1, WinReg::PlanarStorage), 64);
        assert_eq!(port.head_read(HeadId(0), HeadReg::CmdStateCtrl), 0x2_0003);
        let word = (WINDOW_BLOCK_SIZE as usize + WinReg::PlanarStorage.offset() as usize) / 4;
        assert_eq!(windows[word], 64);
    }
}
