//! Bit-banged transmitter
//!
//! Emits 8-N-1 frames on a GPIO output by toggling the line against a
//! running deadline on the cycle counter. Deadlines are measured from the
//! frame's start tick, so time spent setting a pin never accumulates into
//! drift.

use bitline_hal::{CycleCounter, InterruptControl, OutputPin};

use crate::config::BitTiming;

/// Bit-banged UART transmitter
pub struct BitBangTx<P, C, I> {
    pin: P,
    counter: C,
    irq: I,
    timing: BitTiming,
}

impl<P, C, I> BitBangTx<P, C, I>
where
    P: OutputPin,
    C: CycleCounter,
    I: InterruptControl,
{
    /// Create a transmitter and drive the line to idle (high)
    pub fn new(mut pin: P, counter: C, irq: I, timing: BitTiming) -> Self {
        pin.set_high();
        Self {
            pin,
            counter,
            irq,
            timing,
        }
    }

    /// Transmit one frame
    ///
    /// Interrupts are masked for the whole frame and restored after the stop
    /// bit has been held for a full bit period.
    pub fn transmit_byte(&mut self, byte: u8) {
        let Self {
            pin,
            counter,
            irq,
            timing,
        } = self;
        let bit_period = timing.bit_period;

        irq.free(|| {
            let start = counter.now();
            let mut deadline = bit_period;
            let mut write_bit = |high: bool| {
                pin.set_state(high);
                counter.wait_until(start, deadline);
                deadline = deadline.wrapping_add(bit_period);
            };

            // Start bit
            write_bit(false);
            for bit in 0..8 {
                write_bit(byte & (1 << bit) != 0);
            }
            // Stop bit
            write_bit(true);
        });
    }

    /// Transmit a buffer, one frame at a time
    ///
    /// Interrupts are re-enabled between frames.
    pub fn transmit(&mut self, data: &[u8]) {
        for &byte in data {
            self.transmit_byte(byte);
        }
    }

    /// Bit timing in use
    pub fn timing(&self) -> BitTiming {
        self.timing
    }

    /// Release the output pin
    pub fn free(self) -> P {
        self.pin
    }
}
