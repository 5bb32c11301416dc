//! Software (bit-banged) serial backend
//!
//! Owns the transmit engine and the consumer side of the receive ring. The
//! receive engine itself lives in the RX pin's interrupt handler and only
//! shares the ring with this backend.

use bitline_hal::{CycleCounter, InterruptControl, OutputPin};

use crate::backend::{BackendKind, SerialBackend};
use crate::config::SOFTWARE_READ_TIMEOUT_MS;
use crate::error::UartError;
use crate::ring::{RxRing, EMPTY_SENTINEL};
use crate::tx::BitBangTx;

/// Bit-banged serial backend
///
/// Either half may be absent: without a transmitter every write fails with
/// [`UartError::NoTransmitPin`]; without a ring nothing is ever available.
pub struct SoftSerial<'r, P, C, I, const N: usize> {
    tx: Option<BitBangTx<P, C, I>>,
    ring: Option<&'r RxRing<N>>,
}

impl<'r, P, C, I, const N: usize> SoftSerial<'r, P, C, I, N>
where
    P: OutputPin,
    C: CycleCounter,
    I: InterruptControl,
{
    pub fn new(tx: Option<BitBangTx<P, C, I>>, ring: Option<&'r RxRing<N>>) -> Self {
        Self { tx, ring }
    }

    /// Transmitter, if the channel has a TX pin
    pub fn tx(&self) -> Option<&BitBangTx<P, C, I>> {
        self.tx.as_ref()
    }
}

impl<'r, P, C, I, const N: usize> SerialBackend for SoftSerial<'r, P, C, I, N>
where
    P: OutputPin,
    C: CycleCounter,
    I: InterruptControl,
{
    fn kind(&self) -> BackendKind {
        BackendKind::Software
    }

    fn begin(&mut self, baud: u32) {
        // Bit timing was fixed when the transmitter and receiver were built
        debug!("Software serial at {} baud", baud);
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), UartError> {
        match self.tx.as_mut() {
            Some(tx) => {
                tx.transmit_byte(byte);
                Ok(())
            }
            None => {
                error!("UART doesn't have TX pin set!");
                Err(UartError::NoTransmitPin)
            }
        }
    }

    fn read_byte(&mut self) -> u8 {
        self.ring.map_or(EMPTY_SENTINEL, |ring| ring.pop())
    }

    fn peek_byte(&mut self) -> u8 {
        self.ring.map_or(EMPTY_SENTINEL, |ring| ring.peek())
    }

    fn available(&mut self) -> usize {
        self.ring.map_or(0, |ring| ring.available())
    }

    fn rx_capacity(&self) -> usize {
        N
    }

    fn flush(&mut self) {
        if let Some(ring) = self.ring {
            ring.clear();
        }
    }

    fn read_timeout_ms(&self) -> u32 {
        SOFTWARE_READ_TIMEOUT_MS
    }
}
