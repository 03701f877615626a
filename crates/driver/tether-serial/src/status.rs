//! UART status register bits.

use bitflags::bitflags;

bitflags! {
    /// Status bits read from the UART at the top of each interrupt.
    ///
    /// Bit positions follow the Kinetis UART0 `S1` register so a board layer
    /// on that part can pass the register through unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UartStatus: u8 {
        /// Parity error on the last received byte.
        const PARITY    = 1 << 0;
        /// Framing error (missing stop bit).
        const FRAMING   = 1 << 1;
        /// Noise detected while sampling.
        const NOISE     = 1 << 2;
        /// A byte arrived before the previous one was read.
        const OVERRUN   = 1 << 3;
        /// Receive data register full.
        const RX_FULL   = 1 << 5;
        /// Transmit data register empty.
        const TX_EMPTY  = 1 << 7;

        /// Any receive-line error.
        const LINE_ERRORS = Self::OVERRUN.bits()
            | Self::NOISE.bits()
            | Self::FRAMING.bits()
            | Self::PARITY.bits();
    }
}

impl UartStatus {
    /// Returns true if any receive-line error bit is set.
    #[must_use]
    pub const fn has_line_error(self) -> bool {
        self.intersects(Self::LINE_ERRORS)
    }
}
