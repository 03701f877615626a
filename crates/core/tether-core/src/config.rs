//! Compile-time configuration bridge.
//!
//! Values are read from the build environment (`option_env!`) and fall back
//! to the firmware defaults when a variable is unset or malformed.

use crate::log::LogLevel;

/// Maximum log level compiled into the default filter.
///
/// Set with `TETHER_LOG_LEVEL=error|warn|info|debug|trace` at build time.
/// The runtime filter starts here and can be changed with
/// [`set_max_level`](crate::log::set_max_level).
pub const MAX_LOG_LEVEL: LogLevel = match option_env!("TETHER_LOG_LEVEL") {
    Some(level) => match level.as_bytes() {
        b"fatal" => LogLevel::Fatal,
        b"error" => LogLevel::Error,
        b"warn" => LogLevel::Warn,
        b"info" => LogLevel::Info,
        b"trace" => LogLevel::Trace,
        _ => LogLevel::Debug,
    },
    None => LogLevel::Debug,
};

/// Parses a positive decimal integer from an optional build-time variable.
///
/// Returns `default` when the value is absent, empty, zero, contains a
/// non-digit, or overflows `usize`.
#[must_use]
pub const fn parse_usize_or(value: Option<&str>, default: usize) -> usize {
    let Some(value) = value else {
        return default;
    };
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        return default;
    }

    let mut acc: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        let Some(digit) = decimal_digit(bytes[i]) else {
            return default;
        };
        acc = match acc.checked_mul(10) {
            Some(v) => match v.checked_add(digit) {
                Some(v) => v,
                None => return default,
            },
            None => return default,
        };
        i += 1;
    }

    if acc == 0 { default } else { acc }
}

const fn decimal_digit(b: u8) -> Option<usize> {
    Some(match b {
        b'0' => 0,
        b'1' => 1,
        b'2' => 2,
        b'3' => 3,
        b'4' => 4,
        b'5' => 5,
        b'6' => 6,
        b'7' => 7,
        b'8' => 8,
        b'9' => 9,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absent_uses_default() {
        assert_eq!(parse_usize_or(None, 127), 127);
    }

    #[test]
    fn parse_plain_number() {
        assert_eq!(parse_usize_or(Some("256"), 127), 256);
        assert_eq!(parse_usize_or(Some("1234567890"), 1), 1_234_567_890);
        assert_eq!(parse_usize_or(Some("007"), 1), 7);
    }

    #[test]
    fn parse_rejects_garbage_and_zero() {
        assert_eq!(parse_usize_or(Some(""), 7), 7);
        assert_eq!(parse_usize_or(Some("0"), 7), 7);
        assert_eq!(parse_usize_or(Some("12a"), 7), 7);
        assert_eq!(parse_usize_or(Some("-5"), 7), 7);
    }

    #[test]
    fn parse_overflow_uses_default() {
        assert_eq!(parse_usize_or(Some("99999999999999999999999999"), 3), 3);
    }
}
