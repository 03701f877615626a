//! Growable, lossy FIFO of element handles.
//!
//! An [`ElementFifo`] keeps its elements in a singly linked chain of slots.
//! The slots from `head` to `tail` hold live elements in arrival order; the
//! slots after `tail` are vacant and get reused before anything new is
//! allocated.
//!
//! Storage grows in two stages:
//!
//! 1. `initial` slots are allocated up front as one contiguous arena.
//! 2. Past that, each enqueue that finds no vacant slot boxes one new slot,
//!    until the queue owns `max_capacity` slots.
//!
//! Capacity never shrinks. Once the ceiling is reached, an enqueue into a
//! full queue evicts the oldest element and reuses its slot.
//!
//! ```text
//!   head              tail
//!    v                 v
//!   [a] -> [b] -> [c] -> [ ] -> [ ] -> None
//!    live elements       vacant slots
//! ```
//!
//! The [`checked`] module wraps the typed API for callers that pass possibly
//! absent queues and elements and expect the `-1` error sentinel.

pub mod checked;
mod slot;

use core::fmt;

use tether_core::{tdebug, ttrace};

use crate::error::FifoError;
#[cfg(debug_assertions)]
use slot::SlotOrigin;
use slot::{SlotRef, SlotStore};

/// Allocation counts for an [`ElementFifo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocStats {
    /// Slots in the preallocated arena.
    pub arena_slots: usize,
    /// Slots allocated one at a time during growth.
    pub individual_slots: usize,
    /// Live allocations: one for a non-empty arena plus one per individual slot.
    pub allocations: usize,
}

/// What [`ElementFifo::destroy`] released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleaseReport {
    /// Whether a non-empty arena was released.
    pub arena_released: bool,
    /// Number of individually owned slots released.
    pub individual_released: usize,
}

impl ReleaseReport {
    /// Total number of allocations released.
    #[must_use]
    pub fn releases(&self) -> usize {
        self.individual_released + usize::from(self.arena_released)
    }
}

/// A bounded-growth FIFO that evicts its oldest element when full.
///
/// Not synchronized: callers sharing a queue provide their own exclusion.
pub struct ElementFifo<T> {
    store: SlotStore<T>,
    /// Oldest live element, or the first vacant slot when empty.
    head: Option<SlotRef>,
    /// Newest live element; `None` when empty.
    tail: Option<SlotRef>,
    len: usize,
    max_capacity: usize,
}

impl<T> ElementFifo<T> {
    /// Creates a queue with `initial` preallocated slots and a ceiling of
    /// `max_capacity` slots.
    ///
    /// # Errors
    ///
    /// [`FifoError::ZeroMaxCapacity`] if `max_capacity` is zero,
    /// [`FifoError::InitialExceedsMax`] if `initial > max_capacity`, and
    /// [`FifoError::AllocFailed`] if the arena cannot be allocated.
    pub fn new(initial: usize, max_capacity: usize) -> Result<Self, FifoError> {
        if max_capacity == 0 {
            return Err(FifoError::ZeroMaxCapacity);
        }
        if initial > max_capacity {
            return Err(FifoError::InitialExceedsMax {
                initial,
                max: max_capacity,
            });
        }

        let store = SlotStore::with_arena(initial)?;
        let fifo = Self {
            head: store.arena_head(),
            store,
            tail: None,
            len: 0,
            max_capacity,
        };
        fifo.check();
        Ok(fifo)
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no elements are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots owned, live or vacant.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    /// Ceiling on [`capacity`](Self::capacity), fixed at construction.
    #[must_use]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Returns true if the next enqueue will evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.max_capacity
    }

    /// Returns the oldest element without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.store.get(self.head?).value.as_ref()
    }

    /// Appends `value` and returns the new length.
    ///
    /// When the queue is at its ceiling and full, the oldest element is
    /// dropped to make room; its `Drop` runs any cleanup it owns.
    ///
    /// # Errors
    ///
    /// [`FifoError::AllocFailed`] if a new slot was needed and could not be
    /// allocated. The queue is left unchanged.
    pub fn enqueue(&mut self, value: T) -> Result<usize, FifoError> {
        self.enqueue_evicting(value).map(|(len, _)| len)
    }

    /// Appends `value`, returning the new length and the element evicted to
    /// make room, if any.
    ///
    /// # Errors
    ///
    /// As for [`enqueue`](Self::enqueue).
    pub fn enqueue_evicting(&mut self, value: T) -> Result<(usize, Option<T>), FifoError> {
        let mut evicted = None;
        // Runs at most twice: an eviction always leaves a vacant slot.
        let at = loop {
            if let Some(at) = self.vacant_slot() {
                break at;
            }
            if self.capacity() < self.max_capacity {
                break self.grow()?;
            }
            ttrace!(
                "fifo: full at {} slots, evicting oldest\n",
                self.max_capacity
            );
            evicted = self.dequeue();
        };

        self.store.get_mut(at).value = Some(value);
        if self.len == 0 {
            self.head = Some(at);
        }
        self.tail = Some(at);
        self.len += 1;
        self.check();
        Ok((self.len, evicted))
    }

    /// Removes and returns the oldest element.
    ///
    /// The emptied slot is relinked after the tail, so capacity is unchanged.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let old = self.head?;
        let value = self.store.get_mut(old).value.take();
        self.len -= 1;

        if self.len == 0 {
            // The single live slot becomes the first vacant one in place.
            self.tail = None;
        } else if let Some(tail) = self.tail {
            let after_tail = self.store.get(tail).next;
            let slot = self.store.get_mut(old);
            let new_head = slot.next;
            slot.next = after_tail;
            self.store.get_mut(tail).next = Some(old);
            self.head = new_head;
        }

        self.check();
        value
    }

    /// Number of slots reachable from the head of the chain.
    ///
    /// Always equal to [`capacity`](Self::capacity).
    #[must_use]
    pub fn chain_len(&self) -> usize {
        self.store.walk(self.head).count()
    }

    /// Number of chained slots currently holding an element.
    ///
    /// Always equal to [`len`](Self::len).
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.store
            .walk(self.head)
            .filter(|(_, slot)| slot.value.is_some())
            .count()
    }

    /// Current allocation counts.
    #[must_use]
    pub fn alloc_stats(&self) -> AllocStats {
        let arena_slots = self.store.arena_len();
        let individual_slots = self.store.individual_len();
        AllocStats {
            arena_slots,
            individual_slots,
            allocations: usize::from(arena_slots > 0) + individual_slots,
        }
    }

    /// Releases every slot and any elements still queued.
    ///
    /// Individually owned slots are released one at a time; the arena is
    /// released as a single unit. Safe on a queue that never allocated.
    pub fn destroy(self) -> ReleaseReport {
        #[cfg(debug_assertions)]
        self.check_origins();

        let dropped = self.len;
        let (arena, individual) = self.store.into_parts();
        let mut report = ReleaseReport::default();
        for slot in individual {
            drop(slot);
            report.individual_released += 1;
        }
        if !arena.is_empty() {
            drop(arena);
            report.arena_released = true;
        }

        tdebug!(
            "fifo: destroyed, {} allocations released, {} elements dropped\n",
            report.releases(),
            dropped
        );
        report
    }

    /// Asserts every owned slot is chained exactly once, counted by origin.
    #[cfg(debug_assertions)]
    fn check_origins(&self) {
        let (mut arena, mut individual) = (0usize, 0usize);
        for (at, _) in self.store.walk(self.head) {
            match at.origin {
                SlotOrigin::Arena => arena += 1,
                SlotOrigin::Individual => individual += 1,
            }
        }
        assert_eq!(arena, self.store.arena_len(), "arena slot missing from chain");
        assert_eq!(
            individual,
            self.store.individual_len(),
            "individual slot missing from chain"
        );
    }

    /// First vacant slot available to the next enqueue.
    fn vacant_slot(&self) -> Option<SlotRef> {
        match self.tail {
            Some(tail) => self.store.get(tail).next,
            None => self.head,
        }
    }

    /// Boxes one more slot and links it after the tail.
    fn grow(&mut self) -> Result<SlotRef, FifoError> {
        let at = self.store.push_individual()?;
        match self.tail {
            Some(tail) => self.store.get_mut(tail).next = Some(at),
            None => self.head = Some(at),
        }
        tdebug!(
            "fifo: grew to {} of {} slots\n",
            self.capacity(),
            self.max_capacity
        );
        Ok(at)
    }

    /// Walks the whole chain and asserts the structural invariants.
    #[cfg(any(test, tether_fifo_check))]
    fn check(&self) {
        assert!(self.capacity() <= self.max_capacity, "capacity over ceiling");
        assert!(self.len <= self.capacity(), "length over capacity");
        assert_eq!(self.chain_len(), self.capacity(), "chain does not cover every slot");

        let mut last_live = None;
        for (i, (at, slot)) in self.store.walk(self.head).enumerate() {
            assert_eq!(slot.value.is_some(), i < self.len, "live slot out of place");
            if i + 1 == self.len {
                last_live = Some(at);
            }
        }
        assert_eq!(last_live, self.tail, "tail is not the newest element");
    }

    #[cfg(not(any(test, tether_fifo_check)))]
    #[inline]
    fn check(&self) {}
}

impl<T> fmt::Debug for ElementFifo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementFifo")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("max_capacity", &self.max_capacity)
            .finish_non_exhaustive()
    }
}
