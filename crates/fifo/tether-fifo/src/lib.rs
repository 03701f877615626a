//! Bounded queues for interrupt-driven firmware.
//!
//! Two independent structures live here:
//!
//! - [`ByteRing`]: a fixed-capacity circular byte buffer that clamps short
//!   transfers instead of failing. [`ByteChannels`] pairs two of them (receive
//!   and transmit), each behind its own [`IrqSpinLock`](tether_core::sync::IrqSpinLock),
//!   selected by [`ChannelId`].
//! - [`ElementFifo`]: a growable queue of element handles. Slots come from a
//!   contiguous preallocated arena first, then from individually owned
//!   allocations up to a hard ceiling; past the ceiling the oldest element is
//!   evicted to make room.
//!
//! Neither structure synchronizes internally; see [`ByteChannels`] for the
//! locked pairing used between an interrupt handler and foreground code.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod byte_ring;
pub mod channels;
pub mod config;
pub mod element_fifo;
pub mod error;

pub use byte_ring::ByteRing;
pub use channels::{ByteChannels, ChannelId};
pub use element_fifo::{AllocStats, ElementFifo, ReleaseReport};
pub use error::FifoError;
