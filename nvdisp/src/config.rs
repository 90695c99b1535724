//! Display controller configuration.
//!
//! Compile-time limits of the window pipeline, plus the runtime policy
//! knobs a board or simulator build can override.

/// Number of window engines on the controller.
pub const MAX_WINDOWS: usize = 6;

/// Number of display heads on the controller.
pub const MAX_HEADS: usize = 3;

/// Surface pitches are programmed in units of this many bytes.
pub const PITCH_ALIGN_SHIFT: u32 = 6;

/// Default delay before a one-shot head is re-triggered.
pub const DEFAULT_ONE_SHOT_DELAY_MS: u64 = 20;

/// Runtime configuration of a [`DisplayController`](crate::DisplayController).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DcConfig {
    /// Skip-vsync policy: disabled windows in a commit are left clean
    /// instead of being marked dirty.
    pub no_vsync: bool,
    /// Running on the hardware simulator. Frame-end and vblank status
    /// are acknowledged up front because the simulator never raises them.
    pub simulated: bool,
}

impl DcConfig {
    /// Configuration for silicon.
    pub const fn hardware() -> Self {
        Self {
            no_vsync: false,
            simulated: false,
        }
    }

    /// Configuration for the hardware simulator.
    pub const fn simulator() -> Self {
        Self {
            no_vsync: false,
            simulated: true,
        }
    }
}

impl Default for DcConfig {
    fn default() -> Self {
        Self::hardware()
    }
}
