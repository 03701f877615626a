//! Queue configuration bridge.
//!
//! Compile-time values for the byte channels, read from the build
//! environment through [`tether_core::config`].

use tether_core::config::parse_usize_or;

/// Capacity of the firmware's receive and transmit queues.
const DEFAULT_BYTE_QUEUE_CAPACITY: usize = 127;

/// Capacity, in bytes, of each channel in a default [`ByteChannels`](crate::ByteChannels).
///
/// Override with `TETHER_BYTE_QUEUE_CAPACITY=<n>` at build time.
pub const BYTE_QUEUE_CAPACITY: usize = parse_usize_or(
    option_env!("TETHER_BYTE_QUEUE_CAPACITY"),
    DEFAULT_BYTE_QUEUE_CAPACITY,
);

const _: () = assert!(BYTE_QUEUE_CAPACITY > 0, "byte queue capacity must be positive");

/// Raw selector of the receive channel.
pub const RX_CHANNEL_SELECTOR: u8 = 0;

/// Raw selector of the transmit channel.
pub const TX_CHANNEL_SELECTOR: u8 = 1;
