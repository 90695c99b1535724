//! Display heads.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::config::{DEFAULT_ONE_SHOT_DELAY_MS, MAX_WINDOWS};

/// Head controller number, as written into window owner fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadId(pub u32);

/// Blender revision behind a window slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlenderGeneration {
    #[default]
    Gen1,
    /// Global alpha is part of the blend sequence.
    Gen2,
}

/// What a window slot supports on this head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCaps {
    pub supports_interlace: bool,
    pub blender: BlenderGeneration,
}

/// Static description of a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadDescriptor {
    pub id: HeadId,
    /// Current mode scans out interlaced.
    pub interlaced: bool,
    /// Output refreshes on demand rather than continuously.
    pub one_shot: bool,
    pub one_shot_delay_ms: u64,
    pub window_caps: [WindowCaps; MAX_WINDOWS],
}

impl HeadDescriptor {
    /// Progressive, continuously refreshed head with gen-1 blenders.
    pub fn new(id: HeadId) -> Self {
        Self {
            id,
            interlaced: false,
            one_shot: false,
            one_shot_delay_ms: DEFAULT_ONE_SHOT_DELAY_MS,
            window_caps: [WindowCaps::default(); MAX_WINDOWS],
        }
    }

    pub fn with_interlace(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    pub fn with_one_shot(mut self, delay_ms: u64) -> Self {
        self.one_shot = true;
        self.one_shot_delay_ms = delay_ms;
        self
    }

    /// Apply the same capabilities to every window slot.
    pub fn with_window_caps(mut self, caps: WindowCaps) -> Self {
        self.window_caps = [caps; MAX_WINDOWS];
        self
    }

    pub fn caps(&self, index: usize) -> WindowCaps {
        self.window_caps.get(index).copied().unwrap_or_default()
    }
}

/// A display head and its mutable bookkeeping.
pub struct DisplayHead {
    desc: HeadDescriptor,
    /// Windows this head may program, one bit per index. Only written
    /// while the registry lock is held.
    valid_windows: AtomicU32,
    /// A vblank-gated flip is waiting for the interrupt handler.
    pending_flip: AtomicBool,
    crc_pending: AtomicBool,
    underflows: AtomicU64,
}

impl DisplayHead {
    pub fn new(desc: HeadDescriptor) -> Self {
        Self {
            desc,
            valid_windows: AtomicU32::new(0),
            pending_flip: AtomicBool::new(false),
            crc_pending: AtomicBool::new(false),
            underflows: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> HeadId {
        self.desc.id
    }

    pub fn descriptor(&self) -> &HeadDescriptor {
        &self.desc
    }

    pub fn valid_windows(&self) -> u32 {
        self.valid_windows.load(Ordering::Acquire)
    }

    pub fn is_valid(&self, index: usize) -> bool {
        index < MAX_WINDOWS && self.valid_windows() & (1 << index) != 0
    }

    pub(crate) fn set_valid(&self, index: usize) {
        self.valid_windows.fetch_or(1 << index, Ordering::AcqRel);
    }

    pub(crate) fn clear_valid(&self, index: usize) {
        self.valid_windows.fetch_and(!(1 << index), Ordering::AcqRel);
    }

    pub fn flip_pending(&self) -> bool {
        self.pending_flip.load(Ordering::Acquire)
    }

    pub(crate) fn set_flip_pending(&self, pending: bool) {
        self.pending_flip.store(pending, Ordering::Release);
    }

    /// Clear the pending-flip marker, returning whether it was set.
    pub(crate) fn take_flip_pending(&self) -> bool {
        self.pending_flip.swap(false, Ordering::AcqRel)
    }

    pub fn crc_pending(&self) -> bool {
        self.crc_pending.load(Ordering::Acquire)
    }

    pub(crate) fn set_crc_pending(&self, pending: bool) {
        self.crc_pending.store(pending, Ordering::Release);
    }

    pub fn underflow_count(&self) -> u64 {
        self.underflows.load(Ordering::Relaxed)
    }

    pub(crate) fn record_underflow(&self) -> u64 {
        self.underflows.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mask_bits() {
        let head = DisplayHead::new(HeadDescriptor::new(HeadId(0)));
        head.set_valid(1);
        head.set_valid(4);
        assert_eq!(head.valid_windows(), 0b1_0010);
        assert!(head.is_valid(4));
        head.clear_valid(4);
        assert!(!head.is_valid(4));
        assert!(!head.is_valid(MAX_WINDOWS + 3));
    }

    #[test]
    fn test_caps_out_of_range_defaults() {
        let desc = HeadDescriptor::new(HeadId(1)).with_window_caps(WindowCaps {
            supports_interlace: true,
            blender: BlenderGeneration::Gen2,
        });
        assert!(desc.caps(0).supports_interlace);
        assert_eq!(desc.caps(MAX_WINDOWS), WindowCaps::default());
    }
}
