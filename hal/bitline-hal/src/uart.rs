//! UART serial communication abstractions
//!
//! The frame shape is fixed at 8-N-1: one start bit, eight data bits sent
//! LSB first, one stop bit, no parity.

/// GPIO pin number as used by the platform's pin numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinId(pub u8);

impl PinId {
    /// Raw pin number
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl From<u8> for PinId {
    fn from(pin: u8) -> Self {
        Self(pin)
    }
}

/// Hardware UART peripheral
///
/// The silicon UART the channel delegates to when the hardware backend is
/// selected. Reads follow the peripheral's own buffering: `read` and `peek`
/// are only meaningful when `available` is non-zero.
pub trait HardwareUart {
    /// Configure the peripheral for `baud` bits per second, 8-N-1
    fn begin(&mut self, baud: u32);

    /// Queue a single byte for transmission
    fn write_byte(&mut self, byte: u8);

    /// Queue a buffer for transmission
    fn write_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.write_byte(byte);
        }
    }

    /// Take the next received byte
    fn read(&mut self) -> u8;

    /// Look at the next received byte without consuming it
    fn peek(&mut self) -> u8;

    /// Fill `buf` from the receive buffer
    fn read_bytes(&mut self, buf: &mut [u8]) {
        for slot in buf.iter_mut() {
            *slot = self.read();
        }
    }

    /// Number of received bytes waiting to be read
    fn available(&mut self) -> usize;

    /// Most bytes `available` can ever report
    fn rx_capacity(&self) -> usize {
        usize::MAX
    }

    /// Flush pending transmit and receive buffers
    fn flush(&mut self);
}
