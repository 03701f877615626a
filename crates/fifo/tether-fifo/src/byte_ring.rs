//! Fixed-capacity circular byte buffer.
//!
//! [`ByteRing`] stores an ordered byte stream in a `CAP`-byte array using a
//! read cursor, a write cursor and a `full` flag. Unlike a "one slot empty"
//! ring, every byte of the backing array is usable: when the cursors coincide
//! the flag tells an empty ring from a full one.
//!
//! Transfers never fail. [`ByteRing::enqueue`] and [`ByteRing::dequeue`] move
//! `min(requested, possible)` bytes and return the count; a caller that needs
//! to move more must call again. This is the backpressure contract between an
//! interrupt handler and foreground code.
//!
//! # Wraparound
//!
//! A transfer that runs past the end of the array is split into two
//! contiguous copies: the tail segment up to the physical end, then the head
//! segment starting at index 0.
//!
//! ```text
//!         write                read
//!           v                    v
//!   |*******|--------------------|*********|
//!    head segment                 tail segment
//! ```

use core::fmt;

/// A fixed-capacity circular byte buffer.
///
/// Not synchronized; wrap it in an
/// [`IrqSpinLock`](tether_core::sync::IrqSpinLock) to share it between an
/// interrupt handler and foreground code (see [`ByteChannels`](crate::ByteChannels)).
#[derive(Clone)]
pub struct ByteRing<const CAP: usize> {
    storage: [u8; CAP],
    /// Index of the oldest queued byte.
    read: usize,
    /// Index the next enqueued byte lands on.
    write: usize,
    /// Set iff the ring holds exactly `CAP` bytes.
    full: bool,
}

impl<const CAP: usize> Default for ByteRing<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> ByteRing<CAP> {
    /// Creates an empty ring with both cursors at the start of storage.
    ///
    /// A zero `CAP` is rejected at compile time.
    #[must_use]
    pub const fn new() -> Self {
        const { assert!(CAP > 0, "ByteRing capacity must be positive") };
        Self {
            storage: [0; CAP],
            read: 0,
            write: 0,
            full: false,
        }
    }

    /// Returns the fixed capacity in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Returns the number of queued bytes, derived from the cursors and the
    /// `full` flag.
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.write == self.read {
            if self.full { CAP } else { 0 }
        } else if self.write > self.read {
            self.write - self.read
        } else {
            CAP - (self.read - self.write)
        }
    }

    /// Returns the number of bytes that can be enqueued before the ring is full.
    #[must_use]
    pub const fn free(&self) -> usize {
        CAP - self.len()
    }

    /// Returns true if no bytes are queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.read == self.write && !self.full
    }

    /// Returns true if the ring holds exactly [`capacity`](Self::capacity) bytes.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.full
    }

    /// Copies as many bytes of `bytes` as fit, in order, and returns that count.
    ///
    /// Returns 0 when the ring is already full or `bytes` is empty. A short
    /// count is not an error: the caller retries with the remainder.
    pub fn enqueue(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.free());
        if n == 0 {
            return 0;
        }

        let tail = n.min(CAP - self.write);
        self.storage[self.write..self.write + tail].copy_from_slice(&bytes[..tail]);
        let head = n - tail;
        if head > 0 {
            self.storage[..head].copy_from_slice(&bytes[tail..n]);
        }

        self.write = (self.write + n) % CAP;
        if self.write == self.read {
            self.full = true;
        }
        n
    }

    /// Moves up to `out.len()` of the oldest bytes into `out` and returns the count.
    ///
    /// Returns 0 when the ring is empty or `out` is empty.
    pub fn dequeue(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.len());
        if n == 0 {
            return 0;
        }

        let tail = n.min(CAP - self.read);
        out[..tail].copy_from_slice(&self.storage[self.read..self.read + tail]);
        let head = n - tail;
        if head > 0 {
            out[tail..n].copy_from_slice(&self.storage[..head]);
        }

        self.read = (self.read + n) % CAP;
        // Any successful dequeue leaves at least one free byte.
        self.full = false;
        n
    }

    /// Empties the ring: both cursors return to the start and `full` clears.
    ///
    /// Previously queued bytes become unreachable; capacity is unchanged.
    pub fn reset(&mut self) {
        self.read = 0;
        self.write = 0;
        self.full = false;
    }

    #[cfg(test)]
    fn cursors(&self) -> (usize, usize) {
        (self.read, self.write)
    }
}

impl<const CAP: usize> fmt::Debug for ByteRing<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRing")
            .field("capacity", &CAP)
            .field("len", &self.len())
            .field("read", &self.read)
            .field("write", &self.write)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[test]
    fn new_is_empty() {
        let ring = ByteRing::<8>::new();
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.free(), 8);
    }

    #[test]
    fn round_trip_in_order() {
        let mut ring = ByteRing::<16>::new();
        assert_eq!(ring.enqueue(b"hello"), 5);
        assert_eq!(ring.enqueue(b" world"), 6);
        assert_eq!(ring.len(), 11);

        let mut out = [0u8; 11];
        assert_eq!(ring.dequeue(&mut out), 11);
        assert_eq!(&out, b"hello world");
        assert!(ring.is_empty());
    }

    #[test]
    fn enqueue_clamps_to_capacity() {
        let mut ring = ByteRing::<8>::new();
        let data: Vec<u8> = (0..11).collect();
        assert_eq!(ring.enqueue(&data), 8);
        assert!(ring.is_full());
        assert_eq!(ring.len(), 8);
        // Full ring takes nothing until space frees up.
        assert_eq!(ring.enqueue(&data[8..]), 0);

        let mut out = [0u8; 3];
        assert_eq!(ring.dequeue(&mut out), 3);
        assert_eq!(ring.enqueue(&data[8..]), 3);

        let mut all = [0u8; 8];
        assert_eq!(ring.dequeue(&mut all), 8);
        assert_eq!(&all, &[3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn dequeue_clamps_to_length() {
        let mut ring = ByteRing::<8>::new();
        ring.enqueue(&[1, 2, 3]);
        let mut out = [0u8; 6];
        assert_eq!(ring.dequeue(&mut out), 3);
        assert_eq!(&out[..3], &[1, 2, 3]);
        assert_eq!(ring.dequeue(&mut out), 0);
    }

    #[test]
    fn zero_length_transfers_are_noops() {
        let mut ring = ByteRing::<4>::new();
        assert_eq!(ring.enqueue(&[]), 0);
        ring.enqueue(&[9]);
        assert_eq!(ring.dequeue(&mut []), 0);
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.cursors(), (0, 1));
    }

    #[test]
    fn wraparound_uses_two_segments() {
        let mut ring = ByteRing::<8>::new();
        assert_eq!(ring.enqueue(&[0, 1, 2, 3, 4, 5, 6, 7]), 8);

        let mut out = [0u8; 5];
        assert_eq!(ring.dequeue(&mut out), 5);
        assert_eq!(&out, &[0, 1, 2, 3, 4]);
        assert_eq!(ring.cursors(), (5, 0));

        // Write cursor is at 0 after filling; refill the 5 freed bytes.
        assert_eq!(ring.enqueue(&[8, 9, 10, 11, 12]), 5);
        assert!(ring.is_full());

        // Read crosses the physical end: 5,6,7 then 8..12.
        let mut all = [0u8; 8];
        assert_eq!(ring.dequeue(&mut all), 8);
        assert_eq!(&all, &[5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn enqueue_split_across_end() {
        let mut ring = ByteRing::<6>::new();
        ring.enqueue(&[0; 4]);
        let mut sink = [0u8; 4];
        ring.dequeue(&mut sink);
        assert_eq!(ring.cursors(), (4, 4));

        // 2 bytes land at 4..6, 3 bytes wrap to 0..3.
        assert_eq!(ring.enqueue(&[10, 11, 12, 13, 14]), 5);
        assert_eq!(ring.cursors(), (4, 3));
        assert_eq!(ring.len(), 5);

        let mut out = [0u8; 5];
        assert_eq!(ring.dequeue(&mut out), 5);
        assert_eq!(&out, &[10, 11, 12, 13, 14]);
    }

    #[test]
    fn full_flag_tracks_exact_capacity() {
        let mut ring = ByteRing::<4>::new();
        ring.enqueue(&[1, 2, 3, 4]);
        assert!(ring.is_full());
        let mut one = [0u8; 1];
        ring.dequeue(&mut one);
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 3);
        ring.enqueue(&[5]);
        assert!(ring.is_full());
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn reset_empties_without_changing_capacity() {
        let mut ring = ByteRing::<4>::new();
        ring.enqueue(&[1, 2, 3, 4]);
        ring.reset();
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 4);
        assert!(!ring.is_full());
        assert_eq!(ring.cursors(), (0, 0));

        // Reset of an already empty ring is a no-op.
        ring.reset();
        assert_eq!(ring.len(), 0);

        ring.enqueue(&[7]);
        let mut out = [0u8; 4];
        assert_eq!(ring.dequeue(&mut out), 1);
        assert_eq!(out[0], 7);
    }

    #[test]
    fn single_byte_capacity() {
        let mut ring = ByteRing::<1>::new();
        assert_eq!(ring.enqueue(&[1, 2]), 1);
        assert!(ring.is_full());
        let mut out = [0u8; 2];
        assert_eq!(ring.dequeue(&mut out), 1);
        assert_eq!(out[0], 1);
        assert!(ring.is_empty());
    }

    /// Drives random-sized transfers against a `VecDeque` model.
    #[test]
    fn matches_model_under_random_transfers() {
        const CAP: usize = 127;
        let mut ring = ByteRing::<CAP>::new();
        let mut model = VecDeque::new();
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        let mut counter = 0u8;

        for _ in 0..5_000 {
            let r = next();
            let size = (r >> 8) as usize % (CAP + 20);
            if r & 1 == 0 {
                let chunk: Vec<u8> = (0..size)
                    .map(|_| {
                        counter = counter.wrapping_add(1);
                        counter
                    })
                    .collect();
                let n = ring.enqueue(&chunk);
                assert_eq!(n, size.min(CAP - model.len()));
                model.extend(&chunk[..n]);
            } else {
                let mut out = vec![0u8; size];
                let n = ring.dequeue(&mut out);
                assert_eq!(n, size.min(model.len()));
                let expected: Vec<u8> = model.drain(..n).collect();
                assert_eq!(&out[..n], &expected[..]);
            }
            assert_eq!(ring.len(), model.len());
            assert_eq!(ring.is_full(), model.len() == CAP);
        }
    }
}
