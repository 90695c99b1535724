//! nvdisplay window pipeline
//!
//! This crate drives the overlay windows of an nvdisplay-class display
//! controller: it tracks which head owns each window, programs blending
//! and surface attributes, and commits batches of window updates with a
//! single activation write, either immediately or gated on vblank.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │               DisplayController                │
//! │  assign/detach      update_windows    irq/work │
//! ├──────────────┬─────────────────────────────────┤
//! │   registry   │  commit ──> blend ──> attr      │
//! └──────┬───────┴──────────────┬──────────────────┘
//!        │                      │
//!        └────── RegisterPort ──┘
//!                (MMIO / recording)
//! ```
//!
//! # Modules
//!
//! - `registry`: window ownership between heads
//! - `blend`: blend mode selection and change suppression
//! - `attr`: window geometry, format and surface programming
//! - `commit`: batch programming and activation
//! - `irq`: interrupt masking and flip completion
//! - `workqueue`: delayed continuations for one-shot heads
//! - `port`: register access

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod attr;
pub mod blend;
pub mod commit;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod head;
pub mod irq;
pub mod port;
pub mod registry;
pub mod regs;
pub mod window;
pub mod workqueue;

// Re-exports for convenience
pub use config::DcConfig;
pub use controller::{Deferred, DisplayController};
pub use error::{DcError, Result};
pub use format::{Fixed20_12, PixelFormat};
pub use head::{BlenderGeneration, HeadDescriptor, HeadId, WindowCaps};
pub use irq::{InterruptController, IntMaskRegister, IrqOutcome};
pub use port::{MmioPort, RecordingPort, RegisterPort};
pub use regs::IntStatus;
pub use window::{DirtyRect, PpFlags, SurfaceLayout, WindowFlags, WindowParams, WindowRequest};
pub use workqueue::{Clock, ManualClock};
