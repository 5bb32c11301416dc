//! Serial backends and backend selection
//!
//! A channel is bound once, at startup, to either a hardware UART unit or
//! the bit-banged software engine. Both sit behind [`SerialBackend`]; the
//! channel stores a trait object and never branches on the variant again.

use crate::config::{ChannelConfig, DebugPins};
use crate::error::UartError;

/// Which engine a backend runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendKind {
    Hardware,
    Software,
}

/// Byte-level serial engine behind a channel
///
/// `read_byte`, `peek_byte` and `read_bytes` do not wait; the channel calls
/// them only once `available` reports enough data. Called on an empty
/// backend they return zero bytes.
pub trait SerialBackend {
    /// Which engine this is
    fn kind(&self) -> BackendKind;

    /// Start the engine at `baud` bits per second
    fn begin(&mut self, baud: u32);

    /// Send one byte, blocking until it has left the engine
    fn write_byte(&mut self, byte: u8) -> Result<(), UartError>;

    /// Send a buffer
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), UartError> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Take the next received byte
    fn read_byte(&mut self) -> u8;

    /// Look at the next received byte without consuming it
    fn peek_byte(&mut self) -> u8;

    /// Take `buf.len()` received bytes
    fn read_bytes(&mut self, buf: &mut [u8]) {
        for slot in buf.iter_mut() {
            *slot = self.read_byte();
        }
    }

    /// Number of received, unread bytes
    fn available(&mut self) -> usize;

    /// Most bytes the engine can hold unread
    ///
    /// A read for more than this can never be satisfied.
    fn rx_capacity(&self) -> usize;

    /// Backend-specific flush
    ///
    /// Hardware flushes the peripheral's buffers; software discards every
    /// unread byte in the receive ring.
    fn flush(&mut self);

    /// How long a read waits for data before giving up
    fn read_timeout_ms(&self) -> u32;
}

/// Hardware UART unit number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartNum(pub u8);

impl UartNum {
    /// The primary debug/log UART
    pub const DEBUG: UartNum = UartNum(0);
}

/// Hands out hardware UART unit numbers
///
/// Unit 0 is the debug UART and is never handed out; the remaining units
/// are assigned in increasing order. Create one allocator during startup
/// and keep it for the life of the program. Units are never returned.
#[derive(Debug)]
pub struct UartNumAllocator {
    next: u8,
    end: u8,
}

impl UartNumAllocator {
    /// Create an allocator for a platform with `spare_units` hardware UARTs
    /// besides the debug UART that can be routed to arbitrary pins
    pub const fn new(spare_units: u8) -> Self {
        Self {
            next: 1,
            end: spare_units.saturating_add(1),
        }
    }

    /// Allocate the next free unit
    pub fn allocate(&mut self) -> Result<UartNum, UartError> {
        if self.next >= self.end {
            return Err(UartError::NoFreeUart);
        }
        let num = UartNum(self.next);
        self.next += 1;
        Ok(num)
    }

    /// Number of units still available
    pub fn remaining(&self) -> u8 {
        self.end - self.next
    }
}

/// Backend chosen for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backend {
    /// Bind to this hardware UART unit
    Hardware(UartNum),
    /// Bit-bang on GPIO
    Software,
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Hardware(_) => BackendKind::Hardware,
            Backend::Software => BackendKind::Software,
        }
    }
}

/// Choose the backend for `config`
///
/// Channels on the debug pins get hardware UART 0. Other channels take a
/// spare hardware unit while the allocator has one, and fall back to the
/// software engine otherwise.
pub fn select_backend(
    config: &ChannelConfig,
    debug_pins: &DebugPins,
    allocator: &mut UartNumAllocator,
) -> Backend {
    if debug_pins.matches(config) {
        debug!("Using default serial interface");
        return Backend::Hardware(UartNum::DEBUG);
    }

    match allocator.allocate() {
        Ok(num) => {
            debug!("Using hardware UART {}", num.0);
            Backend::Hardware(num)
        }
        Err(_) => {
            debug!("Using software serial");
            Backend::Software
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBUG_PINS: DebugPins = DebugPins::new(1, 3);

    #[test]
    fn test_allocator() {
        let mut alloc = UartNumAllocator::new(2);
        assert_eq!(alloc.remaining(), 2);

        assert_eq!(alloc.allocate(), Ok(UartNum(1)));
        assert_eq!(alloc.allocate(), Ok(UartNum(2)));

        // Exhausted, and stays exhausted
        assert_eq!(alloc.allocate(), Err(UartError::NoFreeUart));
        assert_eq!(alloc.allocate(), Err(UartError::NoFreeUart));
        assert_eq!(alloc.remaining(), 0);
    }

    #[test]
    fn test_allocator_saturates() {
        let mut alloc = UartNumAllocator::new(u8::MAX);
        assert_eq!(alloc.remaining(), u8::MAX - 1);
        assert_eq!(alloc.allocate(), Ok(UartNum(1)));
    }

    #[test]
    fn test_debug_pins_select_hardware() {
        let mut alloc = UartNumAllocator::new(0);
        let backend = select_backend(&ChannelConfig::new(1, 3, 115_200), &DEBUG_PINS, &mut alloc);
        assert_eq!(backend, Backend::Hardware(UartNum::DEBUG));
        assert_eq!(backend.kind(), BackendKind::Hardware);
    }

    #[test]
    fn test_other_pins_select_software() {
        let mut alloc = UartNumAllocator::new(0);
        let backend = select_backend(&ChannelConfig::new(4, 5, 9600), &DEBUG_PINS, &mut alloc);
        assert_eq!(backend, Backend::Software);
        assert_eq!(backend.kind(), BackendKind::Software);
    }

    #[test]
    fn test_spare_units_before_software() {
        let mut alloc = UartNumAllocator::new(1);

        let first = select_backend(&ChannelConfig::new(4, 5, 9600), &DEBUG_PINS, &mut alloc);
        let second = select_backend(&ChannelConfig::new(12, 13, 9600), &DEBUG_PINS, &mut alloc);
        // Debug pins do not consume a spare unit
        let debug = select_backend(&ChannelConfig::new(1, 3, 9600), &DEBUG_PINS, &mut alloc);

        assert_eq!(first, Backend::Hardware(UartNum(1)));
        assert_eq!(second, Backend::Software);
        assert_eq!(debug, Backend::Hardware(UartNum::DEBUG));
    }
}
