//! Shared plumbing for the tether queues.
//!
//! Holds the pieces every queue crate leans on but none of them owns:
//! leveled logging with a registrable sink, compile-time configuration
//! read from the build environment, and the interrupt-safe spin lock used
//! to give each byte channel a single mutator at a time.
//!
//! Everything here is `no_std` and allocation-free so it can be linked into
//! firmware images as well as host test binaries.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod config;
pub mod log;
pub mod sync;
