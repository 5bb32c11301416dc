//! Bit-banged receiver
//!
//! Runs inside the RX pin's falling-edge interrupt. The edge that fires the
//! handler is the start bit; the handler then samples the eight data bits
//! near their centres by busy-waiting on the cycle counter and pushes the
//! byte into the shared [`RxRing`].
//!
//! No framing validation is done. The stop bit is waited out but never
//! checked, and a noise pulse on an idle line produces a byte that looks
//! just like a real one.

use bitline_hal::{CycleCounter, EdgeInterrupt};

use crate::config::BitTiming;
use crate::ring::RxRing;

/// Bit-banged UART receiver
pub struct BitBangRx<'r, P, C, const N: usize> {
    pin: P,
    counter: C,
    ring: &'r RxRing<N>,
    timing: BitTiming,
}

impl<'r, P, C, const N: usize> BitBangRx<'r, P, C, N>
where
    P: EdgeInterrupt,
    C: CycleCounter,
{
    pub fn new(pin: P, counter: C, ring: &'r RxRing<N>, timing: BitTiming) -> Self {
        Self {
            pin,
            counter,
            ring,
            timing,
        }
    }

    /// Arm the falling-edge interrupt
    pub fn listen(&mut self) {
        self.pin.clear_edge();
        self.pin.listen_falling_edge();
    }

    /// Falling-edge interrupt handler
    ///
    /// Captures one frame, stores it, and acknowledges the edge. Must be
    /// entered as soon as possible after the edge; the latency assumed by
    /// [`BitTiming::first_sample`] is subtracted from the first wait.
    pub fn on_falling_edge(&mut self) {
        let byte = self.capture();
        self.ring.push(byte);
        // The frame's own data-bit edges latched the flag again meanwhile
        self.pin.clear_edge();
    }

    /// Sample one frame starting from the current instant
    fn capture(&self) -> u8 {
        let start = self.counter.now();
        let mut deadline = self.timing.first_sample;
        let mut byte = 0u8;

        for bit in 0..8 {
            self.counter.wait_until(start, deadline);
            if self.pin.is_high() {
                byte |= 1 << bit;
            }
            deadline = deadline.wrapping_add(self.timing.bit_period);
        }

        // Stop bit, value discarded
        self.counter.wait_until(start, deadline);

        byte
    }

    /// Receive ring this engine feeds
    pub fn ring(&self) -> &'r RxRing<N> {
        self.ring
    }

    /// Mutable access to the RX pin, e.g. to await its edge from a task
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }

    /// Bit timing in use
    pub fn timing(&self) -> BitTiming {
        self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{frame_waveform, ReplayPin, SimCounter};

    const TIMER_HZ: u32 = 1_000_000;
    const BAUD: u32 = 10_000;
    const LATENCY: u32 = 5;

    fn receive(waveform: std::vec::Vec<(u32, bool)>) -> (RxRing<8>, ReplayPin, SimCounter) {
        let ring = RxRing::new();
        let counter = SimCounter::new(TIMER_HZ, 1);
        let pin = ReplayPin::new(waveform, counter.clone(), LATENCY);
        (ring, pin, counter)
    }

    #[test]
    fn test_receive_single_frame() {
        let (ring, pin, counter) = receive(frame_waveform(&[0x41], 100, 50));
        let timing = BitTiming::new(TIMER_HZ, BAUD, LATENCY).unwrap();
        let mut rx = BitBangRx::new(pin.clone(), counter, &ring, timing);
        rx.listen();

        pin.replay(|| rx.on_falling_edge());

        assert_eq!(ring.available(), 1);
        assert_eq!(ring.pop(), 0x41);
    }

    #[test]
    fn test_edge_flag_cleared_after_frame() {
        let (ring, pin, counter) = receive(frame_waveform(&[0x00], 100, 50));
        let timing = BitTiming::new(TIMER_HZ, BAUD, LATENCY).unwrap();
        let mut rx = BitBangRx::new(pin.clone(), counter, &ring, timing);
        rx.listen();
        assert!(pin.listening());

        // 0x00 has no falling edges inside the frame, so exactly one capture
        let captures = pin.replay(|| rx.on_falling_edge());
        assert_eq!(captures, 1);
        assert!(!pin.edge_pending());
        assert_eq!(ring.pop(), 0x00);
    }

    #[test]
    fn test_glitch_becomes_byte() {
        // A short low pulse on an idle line reads as 0xFF, not as an error
        let waveform = std::vec![(0, true), (50, false), (60, true)];
        let (ring, pin, counter) = receive(waveform);
        let timing = BitTiming::new(TIMER_HZ, BAUD, LATENCY).unwrap();
        let mut rx = BitBangRx::new(pin.clone(), counter, &ring, timing);
        rx.listen();

        pin.replay(|| rx.on_falling_edge());

        assert_eq!(ring.available(), 1);
        assert_eq!(ring.pop(), 0xFF);
    }

    #[test]
    fn test_samples_near_bit_centres() {
        let (ring, pin, counter) = receive(frame_waveform(&[0xA5], 100, 0));
        let timing = BitTiming::new(TIMER_HZ, BAUD, LATENCY).unwrap();
        let mut rx = BitBangRx::new(pin.clone(), counter, &ring, timing);
        rx.listen();

        pin.replay(|| rx.on_falling_edge());

        // First data bit spans [100, 200); sample lands a third of the way in
        let samples = pin.sample_times();
        assert_eq!(samples.len(), 8);
        assert!(samples[0] >= 133 && samples[0] <= 136, "first sample at {}", samples[0]);
        for pair in samples.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((99..=102).contains(&gap), "gap {}", gap);
        }
        assert_eq!(ring.pop(), 0xA5);
    }
}
