//! Interrupt-driven UART front end.
//!
//! [`SerialPort`] connects a UART's data and status registers to the
//! receive and transmit [`ByteChannels`](tether_fifo::ByteChannels). The
//! interrupt handler moves bytes between hardware and the channels; the
//! foreground only ever touches the channels.
//!
//! Register layout, clocking and interrupt vector wiring belong to the board
//! layer, which implements [`UartRegisters`].

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod port;
pub mod status;

pub use port::{SerialConfig, SerialPort, SerialStats, SerialWriter, UartRegisters};
pub use status::UartStatus;
