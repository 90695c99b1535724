//! Display controller error types

use core::fmt;

use crate::head::HeadId;

/// Errors reported by the window pipeline.
///
/// None of these leave partial ownership state behind. `InvalidWindow`
/// returned from a commit does not undo writes already issued for
/// earlier windows of the same batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DcError {
    /// Window is owned by another head
    OwnershipConflict {
        /// Window index
        window: usize,
        /// Head that currently owns the window
        owner: HeadId,
    },
    /// Detach requested by a head that does not own the window
    OwnershipError {
        /// Window index
        window: usize,
        /// Head that issued the request
        head: HeadId,
    },
    /// Window index is out of range or not bound to the head
    InvalidWindow {
        /// Window index
        window: usize,
        /// Head that issued the request
        head: HeadId,
    },
    /// Head is not present on this controller
    InvalidHead(HeadId),
}

impl fmt::Display for DcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DcError::OwnershipConflict { window, owner } => {
                write!(f, "window {} is owned by head {}", window, owner.0)
            }
            DcError::OwnershipError { window, head } => {
                write!(f, "window {} does not belong to head {}", window, head.0)
            }
            DcError::InvalidWindow { window, head } => {
                write!(f, "invalid window {} for head {}", window, head.0)
            }
            DcError::InvalidHead(head) => write!(f, "no such head {}", head.0),
        }
    }
}

/// Result type for display controller operations
pub type Result<T> = core::result::Result<T, DcError>;
