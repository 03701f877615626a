//! Interrupt-safe spin lock.
//!
//! Masks interrupts before acquiring the inner spin flag and restores the
//! previous mask on release. A lock shared between an interrupt handler and
//! foreground code therefore can never be re-entered by the handler while
//! the foreground holds it on the same core.
//!
//! On hosted targets there is no interrupt mask to touch and the lock is a
//! plain test-and-test-and-set spin lock.

use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use super::loom_compat::{AtomicBool, Ordering, UnsafeCell, spin_loop};

/// A spin lock that masks interrupts while held.
pub struct IrqSpinLock<T> {
    locked: AtomicBool,
    name: &'static str,
    data: UnsafeCell<T>,
}

// SAFETY: The atomic `locked` flag guarantees exclusive access to `data`.
// `T: Send` is required because the holder may be on another core.
unsafe impl<T: Send> Send for IrqSpinLock<T> {}
unsafe impl<T: Send> Sync for IrqSpinLock<T> {}

#[cfg(not(loom))]
impl<T> IrqSpinLock<T> {
    /// Creates a new unlocked `IrqSpinLock`.
    pub const fn new(value: T) -> Self {
        Self::named("<unnamed>", value)
    }

    /// Creates a new unlocked `IrqSpinLock` with a diagnostic name.
    pub const fn named(name: &'static str, value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            name,
            data: UnsafeCell::new(value),
        }
    }
}

// Loom's atomics are not const-constructible.
#[cfg(loom)]
impl<T> IrqSpinLock<T> {
    /// Creates a new unlocked `IrqSpinLock`.
    pub fn new(value: T) -> Self {
        Self::named("<unnamed>", value)
    }

    /// Creates a new unlocked `IrqSpinLock` with a diagnostic name.
    pub fn named(name: &'static str, value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            name,
            data: UnsafeCell::new(value),
        }
    }
}

impl<T> IrqSpinLock<T> {
    /// Returns the diagnostic name given at construction.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Acquires the lock, masking interrupts first.
    pub fn lock(&self) -> IrqSpinLockGuard<'_, T> {
        let saved = save_and_mask();

        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return IrqSpinLockGuard {
                    lock: self,
                    saved,
                    _not_send: PhantomData,
                };
            }
            while self.locked.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
    }

    /// Attempts to acquire the lock without spinning.
    ///
    /// The interrupt mask is left untouched when the lock is already held.
    pub fn try_lock(&self) -> Option<IrqSpinLockGuard<'_, T>> {
        let saved = save_and_mask();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(IrqSpinLockGuard {
                lock: self,
                saved,
                _not_send: PhantomData,
            })
        } else {
            restore(saved);
            None
        }
    }

    /// Returns true if some guard currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Returns a mutable reference to the data; exclusive borrow makes locking unnecessary.
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: `&mut self` rules out any guard or other borrow.
        self.data.with_mut(|ptr| unsafe { &mut *ptr })
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for IrqSpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> core::fmt::Debug for IrqSpinLock<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IrqSpinLock")
            .field("name", &self.name)
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// RAII guard that releases the lock and restores the interrupt mask on drop.
///
/// Neither `Send` nor `Sync`: the saved mask belongs to the core that took it.
pub struct IrqSpinLockGuard<'a, T> {
    lock: &'a IrqSpinLock<T>,
    saved: SavedMask,
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for IrqSpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: The lock is held, so we have exclusive access to the data.
        self.lock.data.with(|ptr| unsafe { &*ptr })
    }
}

impl<T> DerefMut for IrqSpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The lock is held, so we have exclusive access to the data.
        self.lock.data.with_mut(|ptr| unsafe { &mut *ptr })
    }
}

impl<T> Drop for IrqSpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
        restore(self.saved);
    }
}

// ---------------------------------------------------------------------------
// Interrupt mask save/restore
// ---------------------------------------------------------------------------

/// Interrupt state captured when a guard was taken.
type SavedMask = usize;

/// Cortex-M: PRIMASK bit 0 set means interrupts are already masked.
#[cfg(all(target_os = "none", target_arch = "arm"))]
#[inline]
fn save_and_mask() -> SavedMask {
    let primask: u32;
    // SAFETY: Reading PRIMASK and executing `cpsid i` are valid in privileged thread
    // or handler mode and have no memory effects.
    unsafe {
        core::arch::asm!(
            "mrs {}, PRIMASK",
            "cpsid i",
            out(reg) primask,
            options(nomem, nostack, preserves_flags),
        );
    }
    core::sync::atomic::compiler_fence(Ordering::SeqCst);
    primask as SavedMask
}

#[cfg(all(target_os = "none", target_arch = "arm"))]
#[inline]
fn restore(saved: SavedMask) {
    core::sync::atomic::compiler_fence(Ordering::SeqCst);
    if saved & 1 == 0 {
        // SAFETY: Interrupts were enabled when the guard was taken; re-enabling
        // them restores that state.
        unsafe {
            core::arch::asm!("cpsie i", options(nomem, nostack, preserves_flags));
        }
    }
}

/// x86_64: RFLAGS.IF (bit 9) set means interrupts were enabled.
#[cfg(all(target_os = "none", target_arch = "x86_64"))]
#[inline]
fn save_and_mask() -> SavedMask {
    let flags: u64;
    // SAFETY: Reading RFLAGS and disabling interrupts is valid in ring 0.
    unsafe {
        core::arch::asm!(
            "pushfq",
            "pop {}",
            "cli",
            out(reg) flags,
            options(nomem),
        );
    }
    flags as SavedMask
}

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
#[inline]
fn restore(saved: SavedMask) {
    if saved & (1 << 9) != 0 {
        // SAFETY: Re-enabling interrupts restores the state seen at acquire.
        unsafe {
            core::arch::asm!("sti", options(nomem, nostack, preserves_flags));
        }
    }
}

#[cfg(not(all(
    target_os = "none",
    any(target_arch = "arm", target_arch = "x86_64")
)))]
#[inline]
fn save_and_mask() -> SavedMask {
    0
}

#[cfg(not(all(
    target_os = "none",
    any(target_arch = "arm", target_arch = "x86_64")
)))]
#[inline]
fn restore(_saved: SavedMask) {}
