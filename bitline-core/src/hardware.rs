//! Hardware UART backend
//!
//! Delegates straight to a [`HardwareUart`] peripheral. [`IoUart`] adapts any
//! blocking `embedded-io` serial device to that interface.

use bitline_hal::HardwareUart;
use embedded_io::{Error as _, Read, ReadReady, Write};
use heapless::Deque;

use crate::backend::{BackendKind, SerialBackend, UartNum};
use crate::config::HARDWARE_READ_TIMEOUT_MS;
use crate::error::UartError;

/// Serial backend on a hardware UART unit
pub struct HardwareSerial<H> {
    uart: H,
    unit: UartNum,
}

impl<H: HardwareUart> HardwareSerial<H> {
    pub fn new(uart: H, unit: UartNum) -> Self {
        Self { uart, unit }
    }

    /// Hardware unit this backend drives
    pub fn unit(&self) -> UartNum {
        self.unit
    }

    /// Release the peripheral
    pub fn free(self) -> H {
        self.uart
    }
}

impl<H: HardwareUart> SerialBackend for HardwareSerial<H> {
    fn kind(&self) -> BackendKind {
        BackendKind::Hardware
    }

    fn begin(&mut self, baud: u32) {
        debug!("Hardware UART {} at {} baud", self.unit.0, baud);
        self.uart.begin(baud);
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), UartError> {
        self.uart.write_byte(byte);
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), UartError> {
        self.uart.write_bytes(data);
        Ok(())
    }

    fn read_byte(&mut self) -> u8 {
        self.uart.read()
    }

    fn peek_byte(&mut self) -> u8 {
        self.uart.peek()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) {
        self.uart.read_bytes(buf);
    }

    fn available(&mut self) -> usize {
        self.uart.available()
    }

    fn rx_capacity(&self) -> usize {
        self.uart.rx_capacity()
    }

    fn flush(&mut self) {
        self.uart.flush();
    }

    fn read_timeout_ms(&self) -> u32 {
        HARDWARE_READ_TIMEOUT_MS
    }
}

/// [`HardwareUart`] over a blocking `embedded-io` serial device
///
/// Received bytes are pulled into a `B`-byte look-ahead queue whenever the
/// device reports data ready, which is what `peek` and `available` count, so
/// `B` is also the largest read a channel will accept. `flush` empties the
/// queue and drains whatever the device still holds.
/// The device is expected to be configured already; `begin` only records the
/// baud rate. Device errors are logged and the byte is dropped.
pub struct IoUart<T, const B: usize> {
    io: T,
    rx: Deque<u8, B>,
    baud: u32,
}

impl<T, const B: usize> IoUart<T, B>
where
    T: Read + Write + ReadReady,
{
    pub fn new(io: T) -> Self {
        Self {
            io,
            rx: Deque::new(),
            baud: 0,
        }
    }

    /// Baud rate passed to the last `begin`
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Release the device
    pub fn free(self) -> T {
        self.io
    }

    /// Throw away everything the device has ready
    fn drain(&mut self) {
        let mut chunk = [0u8; 16];
        loop {
            match self.io.read_ready() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("UART read_ready failed: {}", e.kind());
                    break;
                }
            }

            match self.io.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => trace!("Discarded {} bytes", n),
                Err(e) => {
                    warn!("UART read failed: {}", e.kind());
                    break;
                }
            }
        }
    }

    /// Move everything the device has ready into the look-ahead queue
    fn pump(&mut self) {
        let mut chunk = [0u8; 16];
        while !self.rx.is_full() {
            match self.io.read_ready() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("UART read_ready failed: {}", e.kind());
                    break;
                }
            }

            let room = (B - self.rx.len()).min(chunk.len());
            match self.io.read(&mut chunk[..room]) {
                Ok(0) => break,
                Ok(n) => {
                    for &byte in &chunk[..n] {
                        // Cannot fail: at most `room` bytes were read
                        let _ = self.rx.push_back(byte);
                    }
                }
                Err(e) => {
                    warn!("UART read failed: {}", e.kind());
                    break;
                }
            }
        }
    }
}

impl<T, const B: usize> HardwareUart for IoUart<T, B>
where
    T: Read + Write + ReadReady,
{
    fn begin(&mut self, baud: u32) {
        self.baud = baud;
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_bytes(&[byte]);
    }

    fn write_bytes(&mut self, data: &[u8]) {
        if let Err(e) = self.io.write_all(data) {
            warn!("UART write failed: {}", e.kind());
        }
    }

    fn read(&mut self) -> u8 {
        if self.rx.is_empty() {
            self.pump();
        }
        self.rx.pop_front().unwrap_or(0)
    }

    fn peek(&mut self) -> u8 {
        if self.rx.is_empty() {
            self.pump();
        }
        self.rx.front().copied().unwrap_or(0)
    }

    fn available(&mut self) -> usize {
        self.pump();
        self.rx.len()
    }

    fn rx_capacity(&self) -> usize {
        B
    }

    fn flush(&mut self) {
        if let Err(e) = self.io.flush() {
            warn!("UART flush failed: {}", e.kind());
        }
        self.rx.clear();
        self.drain();
    }
}
