//! Handle-level element queue API.
//!
//! Mirrors the firmware's C-style interface: signed capacity arguments,
//! possibly absent queue and element handles, and a `-1` sentinel for
//! errors. Each function validates its inputs and then defers to
//! [`ElementFifo`].

use crate::error::FifoError;

use super::{ElementFifo, ReleaseReport};

/// Creates a queue, or returns `None` if the bounds are invalid.
///
/// See [`try_create`] for the rules.
#[must_use]
pub fn create<T>(initial: i64, max_capacity: i64) -> Option<ElementFifo<T>> {
    try_create(initial, max_capacity).ok()
}

/// Creates a queue from signed bounds.
///
/// # Errors
///
/// Checked in order: [`FifoError::ZeroMaxCapacity`] if `max_capacity <= 0`,
/// [`FifoError::NegativeCapacity`] if `initial < 0`, and
/// [`FifoError::InitialExceedsMax`] if `initial > max_capacity`. Bounds that
/// pass those checks but cannot be allocated give [`FifoError::AllocFailed`].
pub fn try_create<T>(initial: i64, max_capacity: i64) -> Result<ElementFifo<T>, FifoError> {
    if max_capacity <= 0 {
        return Err(FifoError::ZeroMaxCapacity);
    }
    if initial < 0 {
        return Err(FifoError::NegativeCapacity);
    }
    let max = usize::try_from(max_capacity).unwrap_or(usize::MAX);
    if initial > max_capacity {
        return Err(FifoError::InitialExceedsMax {
            initial: usize::try_from(initial).unwrap_or(usize::MAX),
            max,
        });
    }
    // An arena wider than the address space can never be allocated.
    let initial = usize::try_from(initial).map_err(|_| FifoError::AllocFailed)?;
    ElementFifo::new(initial, max)
}

/// Appends `element` to `queue` and returns the new length.
///
/// # Errors
///
/// [`FifoError::MissingQueue`] or [`FifoError::MissingElement`] when either
/// handle is absent, and [`FifoError::AllocFailed`] when a needed slot
/// cannot be allocated. A full queue is not an error; it evicts.
pub fn enqueue<T>(
    queue: Option<&mut ElementFifo<T>>,
    element: Option<T>,
) -> Result<usize, FifoError> {
    let queue = queue.ok_or(FifoError::MissingQueue)?;
    let element = element.ok_or(FifoError::MissingElement)?;
    queue.enqueue(element)
}

/// Removes the oldest element; `None` if the queue is absent or empty.
pub fn dequeue<T>(queue: Option<&mut ElementFifo<T>>) -> Option<T> {
    queue?.dequeue()
}

/// Number of live elements.
///
/// # Errors
///
/// [`FifoError::MissingQueue`] when `queue` is absent.
pub fn length<T>(queue: Option<&ElementFifo<T>>) -> Result<usize, FifoError> {
    queue.map(ElementFifo::len).ok_or(FifoError::MissingQueue)
}

/// Number of slots owned.
///
/// # Errors
///
/// [`FifoError::MissingQueue`] when `queue` is absent.
pub fn capacity<T>(queue: Option<&ElementFifo<T>>) -> Result<usize, FifoError> {
    queue.map(ElementFifo::capacity).ok_or(FifoError::MissingQueue)
}

/// Ceiling on the number of slots.
///
/// # Errors
///
/// [`FifoError::MissingQueue`] when `queue` is absent.
pub fn max_capacity<T>(queue: Option<&ElementFifo<T>>) -> Result<usize, FifoError> {
    queue
        .map(ElementFifo::max_capacity)
        .ok_or(FifoError::MissingQueue)
}

/// Releases `queue` and everything in it. Absent queues are ignored.
pub fn destroy<T>(queue: Option<ElementFifo<T>>) -> Option<ReleaseReport> {
    queue.map(ElementFifo::destroy)
}

/// Flattens a count-or-error into the raw integer convention.
#[must_use]
pub fn raw(result: Result<usize, FifoError>) -> i64 {
    match result {
        Ok(n) => i64::try_from(n).unwrap_or(i64::MAX),
        Err(err) => err.to_sentinel(),
    }
}
