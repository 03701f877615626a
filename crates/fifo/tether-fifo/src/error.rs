//! Queue error types.

use core::fmt;

/// Usage errors reported by the queues.
///
/// Short byte transfers and a full element queue are *not* errors; they are
/// reported through counts and eviction respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifoError {
    /// `max_capacity` was zero or negative.
    ZeroMaxCapacity,
    /// `initial_capacity` was negative.
    NegativeCapacity,
    /// `initial_capacity` exceeded `max_capacity`.
    InitialExceedsMax {
        /// Requested preallocated slot count.
        initial: usize,
        /// Requested ceiling.
        max: usize,
    },
    /// An operation was given no queue.
    MissingQueue,
    /// An enqueue was given no element.
    MissingElement,
    /// A raw channel selector named neither the receive nor the transmit queue.
    InvalidChannel(u8),
    /// Slot storage could not be allocated.
    AllocFailed,
}

impl FifoError {
    /// Raw error value for callers that speak in integer returns.
    pub const SENTINEL: i64 = -1;

    /// Collapses any error into [`FifoError::SENTINEL`].
    #[must_use]
    pub const fn to_sentinel(self) -> i64 {
        Self::SENTINEL
    }
}

impl fmt::Display for FifoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxCapacity => f.write_str("max capacity must be positive"),
            Self::NegativeCapacity => f.write_str("initial capacity must not be negative"),
            Self::InitialExceedsMax { initial, max } => {
                write!(f, "initial capacity {initial} exceeds max capacity {max}")
            }
            Self::MissingQueue => f.write_str("no queue given"),
            Self::MissingElement => f.write_str("no element given"),
            Self::InvalidChannel(raw) => write!(f, "invalid channel selector {raw}"),
            Self::AllocFailed => f.write_str("slot allocation failed"),
        }
    }
}

impl core::error::Error for FifoError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_all_variants() {
        assert_eq!(
            format!("{}", FifoError::ZeroMaxCapacity),
            "max capacity must be positive"
        );
        assert_eq!(
            format!("{}", FifoError::NegativeCapacity),
            "initial capacity must not be negative"
        );
        assert_eq!(
            format!("{}", FifoError::InitialExceedsMax { initial: 5, max: 3 }),
            "initial capacity 5 exceeds max capacity 3"
        );
        assert_eq!(format!("{}", FifoError::MissingQueue), "no queue given");
        assert_eq!(format!("{}", FifoError::MissingElement), "no element given");
        assert_eq!(
            format!("{}", FifoError::InvalidChannel(7)),
            "invalid channel selector 7"
        );
        assert_eq!(format!("{}", FifoError::AllocFailed), "slot allocation failed");
    }

    #[test]
    fn every_error_maps_to_the_sentinel() {
        assert_eq!(FifoError::MissingQueue.to_sentinel(), -1);
        assert_eq!(FifoError::InvalidChannel(2).to_sentinel(), FifoError::SENTINEL);
    }
}
