//! Delayed work.
//!
//! Deferred continuations (such as re-triggering a one-shot head) are
//! queued here with a deadline and a [`CancelToken`]. Nothing runs on its
//! own: the owner of the queue calls [`WorkQueue::run_due`] from its worker
//! context and executes whatever comes back.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use core::time::Duration;

use spin::Mutex;

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Clock advanced by hand; used by the simulator and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self {
            nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

const PENDING: u8 = 0;
const CANCELLED: u8 = 1;
const FIRED: u8 = 2;

/// Handle to one queued work item.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<AtomicU8>,
}

impl CancelToken {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Prevent the item from running. Returns false if it already ran
    /// or was already cancelled.
    pub fn cancel(&self) -> bool {
        self.state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    fn fire(&self) -> bool {
        self.state
            .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

struct DelayedWork<T> {
    deadline: Duration,
    token: CancelToken,
    payload: T,
}

/// Queue of deadline-ordered work items.
pub struct WorkQueue<T> {
    items: Mutex<Vec<DelayedWork<T>>>,
}

impl<T> WorkQueue<T> {
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Queue `payload` to become due `delay` after `now`.
    pub fn schedule(&self, now: Duration, delay: Duration, payload: T) -> CancelToken {
        let token = CancelToken::new();
        let deadline = now + delay;

        let mut items = self.items.lock();
        let pos = items.partition_point(|item| item.deadline <= deadline);
        items.insert(
            pos,
            DelayedWork {
                deadline,
                token: token.clone(),
                payload,
            },
        );
        token
    }

    /// Take every item whose deadline has passed, in deadline order.
    /// Cancelled items are discarded.
    pub fn run_due(&self, now: Duration) -> Vec<T> {
        let mut items = self.items.lock();
        let split = items.partition_point(|item| item.deadline <= now);

        items
            .drain(..split)
            .filter(|item| item.token.fire())
            .map(|item| item.payload)
            .collect()
    }

    /// Items still waiting, cancelled ones included until they are reaped.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
