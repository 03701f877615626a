//! Synchronization primitives.
//!
//! The queues themselves are unsynchronized; callers that share one between
//! an interrupt handler and foreground code wrap it in an [`IrqSpinLock`].

mod irq_spinlock;
pub(crate) mod loom_compat;

pub use irq_spinlock::{IrqSpinLock, IrqSpinLockGuard};
