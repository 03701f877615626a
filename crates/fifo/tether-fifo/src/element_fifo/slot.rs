//! Slot storage for [`ElementFifo`](super::ElementFifo).
//!
//! Slots come from two places. The arena is one boxed slice allocated at
//! construction and released as a unit. Individually owned slots are boxed
//! one at a time as the queue grows and are released one at a time. A
//! [`SlotRef`] names a slot by origin and index, so the chain links never
//! need to compare addresses to tell the two apart.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::FifoError;

/// Which allocation a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotOrigin {
    /// Part of the contiguous block allocated at construction.
    Arena,
    /// Allocated on its own during growth.
    Individual,
}

/// Position of a slot inside a [`SlotStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotRef {
    pub(crate) origin: SlotOrigin,
    pub(crate) index: usize,
}

impl SlotRef {
    const fn arena(index: usize) -> Self {
        Self {
            origin: SlotOrigin::Arena,
            index,
        }
    }

    const fn individual(index: usize) -> Self {
        Self {
            origin: SlotOrigin::Individual,
            index,
        }
    }
}

/// One link in the chain.
pub(crate) struct Slot<T> {
    /// The element, if this slot is between head and tail.
    pub(crate) value: Option<T>,
    pub(crate) next: Option<SlotRef>,
}

impl<T> Slot<T> {
    const fn vacant(next: Option<SlotRef>) -> Self {
        Self { value: None, next }
    }
}

/// Owner of every slot a queue has ever allocated.
pub(crate) struct SlotStore<T> {
    arena: Box<[Slot<T>]>,
    individual: Vec<Box<Slot<T>>>,
}

impl<T> SlotStore<T> {
    /// Allocates `slots` arena slots, already linked in index order.
    ///
    /// Fails instead of aborting when the arena cannot be allocated.
    pub(crate) fn with_arena(slots: usize) -> Result<Self, FifoError> {
        let mut arena = Vec::new();
        arena
            .try_reserve_exact(slots)
            .map_err(|_| FifoError::AllocFailed)?;
        arena.extend(
            (0..slots).map(|i| Slot::vacant((i + 1 < slots).then_some(SlotRef::arena(i + 1)))),
        );
        Ok(Self {
            arena: arena.into_boxed_slice(),
            individual: Vec::new(),
        })
    }

    /// First slot of the arena chain, if the arena is non-empty.
    pub(crate) fn arena_head(&self) -> Option<SlotRef> {
        (!self.arena.is_empty()).then_some(SlotRef::arena(0))
    }

    /// Boxes one new vacant, unlinked slot.
    ///
    /// Reserves the index entry first, so a failed reservation leaves the
    /// store unchanged.
    pub(crate) fn push_individual(&mut self) -> Result<SlotRef, FifoError> {
        self.individual
            .try_reserve(1)
            .map_err(|_| FifoError::AllocFailed)?;
        self.individual.push(Box::new(Slot::vacant(None)));
        Ok(SlotRef::individual(self.individual.len() - 1))
    }

    pub(crate) fn arena_len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn individual_len(&self) -> usize {
        self.individual.len()
    }

    /// Total number of slots owned.
    pub(crate) fn len(&self) -> usize {
        self.arena.len() + self.individual.len()
    }

    pub(crate) fn get(&self, at: SlotRef) -> &Slot<T> {
        match at.origin {
            SlotOrigin::Arena => &self.arena[at.index],
            SlotOrigin::Individual => &*self.individual[at.index],
        }
    }

    pub(crate) fn get_mut(&mut self, at: SlotRef) -> &mut Slot<T> {
        match at.origin {
            SlotOrigin::Arena => &mut self.arena[at.index],
            SlotOrigin::Individual => &mut *self.individual[at.index],
        }
    }

    /// Iterates the chain starting at `from`, yielding each slot's position.
    pub(crate) fn walk(&self, from: Option<SlotRef>) -> Walk<'_, T> {
        Walk {
            store: self,
            next: from,
            remaining: self.len(),
        }
    }

    /// Splits the store into its two allocations.
    pub(crate) fn into_parts(self) -> (Box<[Slot<T>]>, Vec<Box<Slot<T>>>) {
        (self.arena, self.individual)
    }
}

/// Iterator over a slot chain.
///
/// Stops after visiting as many slots as the store owns, so a corrupted
/// chain with a cycle cannot loop forever.
pub(crate) struct Walk<'a, T> {
    store: &'a SlotStore<T>,
    next: Option<SlotRef>,
    remaining: usize,
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = (SlotRef, &'a Slot<T>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let at = self.next?;
        let slot = self.store.get(at);
        self.next = slot.next;
        self.remaining -= 1;
        Some((at, slot))
    }
}
