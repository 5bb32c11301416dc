//! Serial channel errors
//!
//! Every error is local to the call that produced it; the channel stays
//! usable afterwards. Receive-buffer overflow and malformed frames are
//! deliberately absent: overflow silently drops the oldest bytes, and the
//! receiver performs no framing validation.

use core::fmt;

/// Errors returned by the serial channel and its backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// The requested bytes did not arrive within the backend's read timeout
    ReadTimeout,
    /// A write was attempted on a channel without a TX pin
    NoTransmitPin,
    /// The baud rate yields a bit period of zero timer ticks
    BaudOutOfRange,
    /// Every remappable hardware UART unit is already assigned
    NoFreeUart,
    /// A read asked for more bytes than the receive buffer can hold
    ReadTooLarge,
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UartError::ReadTimeout => f.write_str("read timed out"),
            UartError::NoTransmitPin => f.write_str("no TX pin configured"),
            UartError::BaudOutOfRange => f.write_str("baud rate out of range for timer"),
            UartError::NoFreeUart => f.write_str("no free hardware UART"),
            UartError::ReadTooLarge => f.write_str("read exceeds receive buffer"),
        }
    }
}

impl embedded_io::Error for UartError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            UartError::ReadTimeout => embedded_io::ErrorKind::TimedOut,
            UartError::NoTransmitPin => embedded_io::ErrorKind::Unsupported,
            UartError::BaudOutOfRange => embedded_io::ErrorKind::InvalidInput,
            UartError::NoFreeUart => embedded_io::ErrorKind::OutOfMemory,
            UartError::ReadTooLarge => embedded_io::ErrorKind::InvalidInput,
        }
    }
}
