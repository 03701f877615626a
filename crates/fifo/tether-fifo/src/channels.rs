//! Receive and transmit byte channels.
//!
//! [`ByteChannels`] owns exactly two [`ByteRing`]s of equal capacity, one per
//! [`ChannelId`]. Each ring sits behind its own [`IrqSpinLock`], so an
//! interrupt handler draining the transmit channel never contends with
//! foreground code reading the receive channel.
//!
//! The registry is const-constructible and is typically placed in a `static`
//! next to the UART it serves:
//!
//! ```
//! use tether_fifo::{ByteChannels, ChannelId};
//!
//! static CHANNELS: ByteChannels = ByteChannels::new();
//!
//! CHANNELS.init();
//! assert_eq!(CHANNELS.enqueue(ChannelId::Transmit, b"ok\r\n"), 4);
//! assert_eq!(CHANNELS.length(ChannelId::Transmit), 4);
//! assert_eq!(CHANNELS.length(ChannelId::Receive), 0);
//! ```

use core::fmt;

use tether_core::sync::IrqSpinLock;
use tether_core::{tdebug, tinfo};

use crate::byte_ring::ByteRing;
use crate::config::{BYTE_QUEUE_CAPACITY, RX_CHANNEL_SELECTOR, TX_CHANNEL_SELECTOR};
use crate::error::FifoError;

/// Selects one of the two byte channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelId {
    /// Bytes arriving from the peripheral, consumed by the application.
    Receive = RX_CHANNEL_SELECTOR,
    /// Bytes produced by the application, drained by the peripheral.
    Transmit = TX_CHANNEL_SELECTOR,
}

impl ChannelId {
    /// Both channels, receive first.
    pub const ALL: [Self; 2] = [Self::Receive, Self::Transmit];

    /// Returns the raw selector value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Short name used in log output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Receive => "rx",
            Self::Transmit => "tx",
        }
    }
}

impl TryFrom<u8> for ChannelId {
    type Error = FifoError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            RX_CHANNEL_SELECTOR => Ok(Self::Receive),
            TX_CHANNEL_SELECTOR => Ok(Self::Transmit),
            other => Err(FifoError::InvalidChannel(other)),
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The receive/transmit pair of byte rings.
///
/// Every operation locks only the selected channel, for the duration of that
/// one call.
pub struct ByteChannels<const CAP: usize = BYTE_QUEUE_CAPACITY> {
    rx: IrqSpinLock<ByteRing<CAP>>,
    tx: IrqSpinLock<ByteRing<CAP>>,
}

#[cfg(not(loom))]
impl<const CAP: usize> ByteChannels<CAP> {
    /// Creates both channels, empty.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx: IrqSpinLock::named("RX_CHANNEL", ByteRing::new()),
            tx: IrqSpinLock::named("TX_CHANNEL", ByteRing::new()),
        }
    }
}

#[cfg(loom)]
impl<const CAP: usize> ByteChannels<CAP> {
    /// Creates both channels, empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rx: IrqSpinLock::named("RX_CHANNEL", ByteRing::new()),
            tx: IrqSpinLock::named("TX_CHANNEL", ByteRing::new()),
        }
    }
}

impl<const CAP: usize> ByteChannels<CAP> {
    fn channel(&self, id: ChannelId) -> &IrqSpinLock<ByteRing<CAP>> {
        match id {
            ChannelId::Receive => &self.rx,
            ChannelId::Transmit => &self.tx,
        }
    }

    /// Resets both channels to empty.
    ///
    /// Called once at startup; calling it again discards anything queued.
    pub fn init(&self) {
        for id in ChannelId::ALL {
            self.channel(id).lock().reset();
        }
        tinfo!("fifo: byte channels ready, {} bytes each\n", CAP);
    }

    /// Copies as many of `bytes` as fit into channel `id`; returns the count.
    pub fn enqueue(&self, id: ChannelId, bytes: &[u8]) -> usize {
        self.channel(id).lock().enqueue(bytes)
    }

    /// Moves up to `out.len()` bytes out of channel `id`; returns the count.
    pub fn dequeue(&self, id: ChannelId, out: &mut [u8]) -> usize {
        self.channel(id).lock().dequeue(out)
    }

    /// Returns the number of bytes queued on channel `id`.
    pub fn length(&self, id: ChannelId) -> usize {
        self.channel(id).lock().len()
    }

    /// Returns the fixed capacity of channel `id`.
    #[must_use]
    pub const fn capacity(&self, _id: ChannelId) -> usize {
        CAP
    }

    /// Discards everything queued on channel `id`.
    pub fn reset(&self, id: ChannelId) {
        self.channel(id).lock().reset();
        tdebug!("fifo: {} channel reset\n", id);
    }

    /// Runs `f` with channel `id` locked.
    ///
    /// For callers that need several ring operations to happen as one
    /// critical section.
    pub fn with<R>(&self, id: ChannelId, f: impl FnOnce(&mut ByteRing<CAP>) -> R) -> R {
        f(&mut self.channel(id).lock())
    }
}

impl<const CAP: usize> Default for ByteChannels<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> fmt::Debug for ByteChannels<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteChannels")
            .field("capacity", &CAP)
            .field("rx", &self.rx)
            .field("tx", &self.tx)
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn selector_conversion() {
        assert_eq!(ChannelId::try_from(0), Ok(ChannelId::Receive));
        assert_eq!(ChannelId::try_from(1), Ok(ChannelId::Transmit));
        assert_eq!(ChannelId::try_from(2), Err(FifoError::InvalidChannel(2)));
        assert_eq!(
            ChannelId::try_from(255),
            Err(FifoError::InvalidChannel(255))
        );
        assert_eq!(ChannelId::Transmit.raw(), 1);
    }

    #[test]
    fn default_capacity_is_firmware_size() {
        let channels: ByteChannels = ByteChannels::new();
        channels.init();
        assert_eq!(channels.capacity(ChannelId::Receive), BYTE_QUEUE_CAPACITY);
        assert_eq!(channels.capacity(ChannelId::Transmit), BYTE_QUEUE_CAPACITY);
    }

    #[test]
    fn channels_are_independent() {
        let channels = ByteChannels::<8>::new();
        channels.init();
        assert_eq!(channels.enqueue(ChannelId::Receive, b"abc"), 3);
        assert_eq!(channels.length(ChannelId::Receive), 3);
        assert_eq!(channels.length(ChannelId::Transmit), 0);

        channels.enqueue(ChannelId::Transmit, b"xy");
        channels.reset(ChannelId::Receive);
        assert_eq!(channels.length(ChannelId::Receive), 0);
        assert_eq!(channels.length(ChannelId::Transmit), 2);

        let mut out = [0u8; 4];
        assert_eq!(channels.dequeue(ChannelId::Transmit, &mut out), 2);
        assert_eq!(&out[..2], b"xy");
    }

    #[test]
    fn transmit_operations_leave_receive_alone() {
        let channels = ByteChannels::<8>::new();
        channels.init();
        assert_eq!(channels.enqueue(ChannelId::Receive, b"rx"), 2);

        assert_eq!(channels.enqueue(ChannelId::Transmit, b"abcdefghij"), 8);
        assert_eq!(channels.length(ChannelId::Receive), 2);

        let mut out = [0u8; 3];
        assert_eq!(channels.dequeue(ChannelId::Transmit, &mut out), 3);
        assert_eq!(channels.length(ChannelId::Receive), 2);

        channels.reset(ChannelId::Transmit);
        assert_eq!(channels.length(ChannelId::Transmit), 0);
        assert_eq!(channels.length(ChannelId::Receive), 2);

        let mut rx = [0u8; 2];
        assert_eq!(channels.dequeue(ChannelId::Receive, &mut rx), 2);
        assert_eq!(&rx, b"rx");
    }

    #[test]
    fn init_discards_queued_bytes() {
        let channels = ByteChannels::<4>::new();
        channels.enqueue(ChannelId::Receive, b"1234");
        channels.enqueue(ChannelId::Transmit, b"56");
        channels.init();
        for id in ChannelId::ALL {
            assert_eq!(channels.length(id), 0);
        }
    }

    #[test]
    fn clamping_through_registry() {
        let channels = ByteChannels::<4>::new();
        assert_eq!(channels.enqueue(ChannelId::Transmit, b"abcdef"), 4);
        assert_eq!(channels.enqueue(ChannelId::Transmit, b"g"), 0);
        let mut out = [0u8; 1];
        assert_eq!(channels.dequeue(ChannelId::Transmit, &mut out), 1);
        assert_eq!(&out, b"a");
    }

    #[test]
    fn with_holds_the_lock_across_calls() {
        let channels = ByteChannels::<4>::new();
        let moved = channels.with(ChannelId::Receive, |ring| {
            ring.enqueue(b"hi");
            let mut out = [0u8; 1];
            ring.dequeue(&mut out)
        });
        assert_eq!(moved, 1);
        assert_eq!(channels.length(ChannelId::Receive), 1);
    }

    #[test]
    fn spsc_preserves_order_across_threads() {
        const TOTAL: usize = 10_000;
        let channels = Arc::new(ByteChannels::<16>::new());

        let producer = {
            let channels = Arc::clone(&channels);
            thread::spawn(move || {
                let data: Vec<u8> = (0..TOTAL).map(|i| (i % 251) as u8).collect();
                let mut sent = 0;
                while sent < TOTAL {
                    let end = (sent + 7).min(TOTAL);
                    sent += channels.enqueue(ChannelId::Receive, &data[sent..end]);
                    thread::yield_now();
                }
            })
        };

        let mut received = Vec::with_capacity(TOTAL);
        let mut buf = [0u8; 5];
        while received.len() < TOTAL {
            let n = channels.dequeue(ChannelId::Receive, &mut buf);
            received.extend_from_slice(&buf[..n]);
            thread::yield_now();
        }
        producer.join().unwrap();

        assert!(
            received
                .iter()
                .enumerate()
                .all(|(i, &b)| b == (i % 251) as u8)
        );
        assert_eq!(channels.length(ChannelId::Receive), 0);
    }
}
