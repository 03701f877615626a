//! Serial port driver over the byte channels.
//!
//! The interrupt handler is the only code that touches the data register.
//! Received bytes go onto the receive channel; bytes queued on the transmit
//! channel are sent one per transmit-empty interrupt. The transmit interrupt
//! is switched off when the transmit channel runs dry and switched back on by
//! the next [`SerialPort::send`].
//!
//! # Lock ordering
//!
//! `tx_gate` is always taken before a channel lock. The gate makes "transmit
//! channel is empty, disable the interrupt" and "bytes were queued, enable
//! the interrupt" mutually exclusive, so a byte can never sit in the
//! transmit channel while the transmitter is idle.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use tether_core::sync::IrqSpinLock;
use tether_core::twarn;
use tether_fifo::config::BYTE_QUEUE_CAPACITY;
use tether_fifo::{ByteChannels, ChannelId};

use crate::status::UartStatus;

// ---------------------------------------------------------------------------
// Register access
// ---------------------------------------------------------------------------

/// Register-level access to one UART, implemented by the board layer.
///
/// Every method takes `&self`; implementations perform volatile MMIO or
/// port I/O and hold no Rust-visible state.
pub trait UartRegisters {
    /// Reads the status register.
    fn status(&self) -> UartStatus;

    /// Clears the given line-error flags.
    fn clear_errors(&self, errors: UartStatus);

    /// Reads the receive data register, clearing `RX_FULL`.
    fn read_data(&self) -> u8;

    /// Writes one byte to the transmit data register.
    fn write_data(&self, byte: u8);

    /// Returns true if the transmit-empty interrupt is enabled.
    fn tx_interrupt_enabled(&self) -> bool;

    /// Enables or disables the transmit-empty interrupt.
    fn set_tx_interrupt(&self, enabled: bool);
}

// ---------------------------------------------------------------------------
// Configuration and statistics
// ---------------------------------------------------------------------------

/// Driver behavior options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Queue every received byte for transmission as well, so a terminal
    /// user sees what they type.
    pub echo: bool,
}

impl SerialConfig {
    /// Echo on.
    pub const DEFAULT: Self = Self { echo: true };
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Counters kept by the interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerialStats {
    /// Received bytes discarded because the receive channel was full.
    pub rx_dropped: u32,
    /// Interrupts that reported a receive-line error.
    pub line_errors: u32,
}

// ---------------------------------------------------------------------------
// SerialPort
// ---------------------------------------------------------------------------

/// An interrupt-driven UART with receive and transmit queues.
pub struct SerialPort<R, const CAP: usize = BYTE_QUEUE_CAPACITY> {
    regs: R,
    channels: ByteChannels<CAP>,
    config: SerialConfig,
    tx_gate: IrqSpinLock<()>,
    rx_dropped: AtomicU32,
    line_errors: AtomicU32,
}

#[cfg(not(loom))]
impl<R, const CAP: usize> SerialPort<R, CAP> {
    /// Creates a port with empty channels.
    pub const fn new(regs: R, config: SerialConfig) -> Self {
        Self {
            regs,
            channels: ByteChannels::new(),
            config,
            tx_gate: IrqSpinLock::named("SERIAL_TX_GATE", ()),
            rx_dropped: AtomicU32::new(0),
            line_errors: AtomicU32::new(0),
        }
    }
}

#[cfg(loom)]
impl<R, const CAP: usize> SerialPort<R, CAP> {
    /// Creates a port with empty channels.
    pub fn new(regs: R, config: SerialConfig) -> Self {
        Self {
            regs,
            channels: ByteChannels::new(),
            config,
            tx_gate: IrqSpinLock::named("SERIAL_TX_GATE", ()),
            rx_dropped: AtomicU32::new(0),
            line_errors: AtomicU32::new(0),
        }
    }
}

impl<R, const CAP: usize> SerialPort<R, CAP> {

    /// Returns the register block.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Returns the receive/transmit channels.
    pub fn channels(&self) -> &ByteChannels<CAP> {
        &self.channels
    }

    /// Returns the active configuration.
    pub fn config(&self) -> SerialConfig {
        self.config
    }

    /// Snapshot of the interrupt handler's counters.
    pub fn stats(&self) -> SerialStats {
        SerialStats {
            rx_dropped: self.rx_dropped.load(Ordering::Relaxed),
            line_errors: self.line_errors.load(Ordering::Relaxed),
        }
    }
}

impl<R: UartRegisters, const CAP: usize> SerialPort<R, CAP> {
    /// Empties both channels and idles the transmitter.
    ///
    /// Call once before unmasking the UART interrupt.
    pub fn init(&self) {
        let _gate = self.tx_gate.lock();
        self.channels.init();
        self.regs.set_tx_interrupt(false);
    }

    /// Services one UART interrupt.
    ///
    /// Call from the UART's interrupt vector.
    pub fn handle_interrupt(&self) {
        let status = self.regs.status();
        if status.has_line_error() {
            let errors = status & UartStatus::LINE_ERRORS;
            self.regs.clear_errors(errors);
            // Discard the damaged byte; this also clears RX_FULL.
            let _ = self.regs.read_data();
            self.line_errors.fetch_add(1, Ordering::Relaxed);
            twarn!("serial: line error {:?}\n", errors);
        }

        let status = self.regs.status();
        if status.contains(UartStatus::RX_FULL) {
            self.receive(self.regs.read_data());
        }
        if status.contains(UartStatus::TX_EMPTY) {
            self.transmit_next();
        }
    }

    fn receive(&self, byte: u8) {
        if self.config.echo {
            self.send(&[byte]);
        }
        if self.channels.enqueue(ChannelId::Receive, &[byte]) == 0 {
            let dropped = self.rx_dropped.fetch_add(1, Ordering::Relaxed) + 1;
            twarn!("serial: rx queue full, dropped {:#04x} ({} total)\n", byte, dropped);
        }
    }

    /// Sends the next queued byte, or idles the transmitter if none is queued.
    fn transmit_next(&self) {
        let _gate = self.tx_gate.lock();
        if !self.regs.tx_interrupt_enabled() {
            return;
        }
        let mut byte = [0u8];
        if self.channels.dequeue(ChannelId::Transmit, &mut byte) == 1 {
            self.regs.write_data(byte[0]);
        } else {
            self.regs.set_tx_interrupt(false);
        }
    }

    /// Queues as much of `bytes` as fits for transmission; returns the count.
    ///
    /// Never blocks. If the transmitter is idle it is restarted.
    pub fn send(&self, bytes: &[u8]) -> usize {
        let queued = self.channels.enqueue(ChannelId::Transmit, bytes);
        if queued > 0 {
            self.start_transmitter();
        }
        queued
    }

    fn start_transmitter(&self) {
        let _gate = self.tx_gate.lock();
        if self.regs.tx_interrupt_enabled() {
            return;
        }
        if self.regs.status().contains(UartStatus::TX_EMPTY) {
            let mut byte = [0u8];
            if self.channels.dequeue(ChannelId::Transmit, &mut byte) == 1 {
                self.regs.write_data(byte[0]);
            }
        }
        self.regs.set_tx_interrupt(true);
    }

    /// Queues all of `bytes`, spinning while the transmit channel is full.
    ///
    /// Must not be called with the UART interrupt masked, or it never returns.
    pub fn send_all(&self, bytes: &[u8]) {
        let mut sent = 0;
        while sent < bytes.len() {
            sent += self.send(&bytes[sent..]);
            if sent < bytes.len() {
                core::hint::spin_loop();
            }
        }
    }

    /// Takes one received byte, if any.
    pub fn read_byte(&self) -> Option<u8> {
        let mut byte = [0u8];
        (self.channels.dequeue(ChannelId::Receive, &mut byte) == 1).then_some(byte[0])
    }

    /// Moves up to `out.len()` received bytes into `out`; returns the count.
    pub fn read(&self, out: &mut [u8]) -> usize {
        self.channels.dequeue(ChannelId::Receive, out)
    }

    /// Returns a [`fmt::Write`] adapter that sends through this port.
    pub fn writer(&self) -> SerialWriter<'_, R, CAP> {
        SerialWriter { port: self }
    }
}

impl<R, const CAP: usize> fmt::Debug for SerialPort<R, CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialPort")
            .field("channels", &self.channels)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Formatted output through a [`SerialPort`], blocking while the transmit
/// channel is full.
pub struct SerialWriter<'a, R, const CAP: usize> {
    port: &'a SerialPort<R, CAP>,
}

impl<R: UartRegisters, const CAP: usize> fmt::Write for SerialWriter<'_, R, CAP> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.port.send_all(s.as_bytes());
        Ok(())
    }
}
