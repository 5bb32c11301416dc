//! Host-side simulation of pins, counters and peripherals for unit tests
//!
//! Time is a shared tick value that only moves when code reads the counter,
//! so busy-wait loops terminate deterministically and every pin access can
//! be stamped with the tick it happened at.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;
use std::vec::Vec;

use bitline_hal::{CycleCounter, EdgeInterrupt, HardwareUart, InputPin, InterruptControl, OutputPin};

/// Simulated counter: every `now()` returns the current tick, then advances
/// it by `step`
#[derive(Clone)]
pub struct SimCounter {
    ticks: Rc<Cell<u32>>,
    hz: u32,
    step: u32,
}

impl SimCounter {
    pub fn new(hz: u32, step: u32) -> Self {
        Self {
            ticks: Rc::new(Cell::new(0)),
            hz,
            step,
        }
    }

    /// Current tick without advancing
    pub fn peek(&self) -> u32 {
        self.ticks.get()
    }

    pub fn set(&self, ticks: u32) {
        self.ticks.set(ticks);
    }
}

impl CycleCounter for SimCounter {
    fn now(&self) -> u32 {
        let now = self.ticks.get();
        self.ticks.set(now.wrapping_add(self.step));
        now
    }

    fn frequency_hz(&self) -> u32 {
        self.hz
    }
}

/// Wall-clock microsecond counter
pub struct StdCounter {
    epoch: Instant,
}

impl StdCounter {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl CycleCounter for StdCounter {
    fn now(&self) -> u32 {
        self.epoch.elapsed().as_micros() as u32
    }

    fn frequency_hz(&self) -> u32 {
        1_000_000
    }
}

/// Output pin that logs every level it is set to, stamped with the counter
#[derive(Clone)]
pub struct RecordingPin {
    counter: SimCounter,
    level: Rc<Cell<bool>>,
    log: Rc<RefCell<Vec<(u32, bool)>>>,
}

impl RecordingPin {
    pub fn new(counter: SimCounter) -> Self {
        Self {
            counter,
            level: Rc::new(Cell::new(true)),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Levels in the order they were set
    pub fn levels(&self) -> Vec<bool> {
        self.log.borrow().iter().map(|&(_, level)| level).collect()
    }

    /// `(tick, level)` for every set, including repeats of the same level
    pub fn edges(&self) -> Vec<(u32, bool)> {
        self.log.borrow().clone()
    }
}

impl OutputPin for RecordingPin {
    fn set_high(&mut self) {
        self.set_state(true);
    }

    fn set_low(&mut self) {
        self.set_state(false);
    }

    fn set_state(&mut self, high: bool) {
        self.level.set(high);
        self.log.borrow_mut().push((self.counter.peek(), high));
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

/// Input pin that plays a recorded waveform back against a [`SimCounter`]
///
/// The line idles high before the first waveform entry.
#[derive(Clone)]
pub struct ReplayPin {
    waveform: Rc<Vec<(u32, bool)>>,
    counter: SimCounter,
    latency: u32,
    listening: Rc<Cell<bool>>,
    pending: Rc<Cell<bool>>,
    samples: Rc<RefCell<Vec<u32>>>,
}

impl ReplayPin {
    /// `latency` is the number of ticks between an edge and handler entry
    pub fn new(waveform: Vec<(u32, bool)>, counter: SimCounter, latency: u32) -> Self {
        Self {
            waveform: Rc::new(waveform),
            counter,
            latency,
            listening: Rc::new(Cell::new(false)),
            pending: Rc::new(Cell::new(false)),
            samples: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn level_at(&self, tick: u32) -> bool {
        self.waveform
            .iter()
            .take_while(|&&(at, _)| at <= tick)
            .last()
            .map_or(true, |&(_, level)| level)
    }

    fn falling_edges(&self) -> Vec<u32> {
        let mut previous = true;
        let mut edges = Vec::new();
        for &(at, level) in self.waveform.iter() {
            if previous && !level {
                edges.push(at);
            }
            previous = level;
        }
        edges
    }

    /// Run `handler` for every falling edge the interrupt would fire on
    ///
    /// Edges that arrive while a handler is still running are swallowed, as
    /// the handler clears the latched flag when it returns. Returns the
    /// number of handler invocations.
    pub fn replay(&self, mut handler: impl FnMut()) -> usize {
        let mut busy_until = 0;
        let mut captures = 0;

        for edge in self.falling_edges() {
            if edge < busy_until || !self.listening.get() {
                continue;
            }
            self.pending.set(true);
            self.counter.set(edge + self.latency);
            handler();
            captures += 1;
            busy_until = self.counter.peek();
        }

        captures
    }

    pub fn listening(&self) -> bool {
        self.listening.get()
    }

    pub fn edge_pending(&self) -> bool {
        self.pending.get()
    }

    /// Ticks at which the line was sampled
    pub fn sample_times(&self) -> Vec<u32> {
        self.samples.borrow().clone()
    }
}

impl InputPin for ReplayPin {
    fn is_high(&self) -> bool {
        let now = self.counter.peek();
        self.samples.borrow_mut().push(now);
        self.level_at(now)
    }
}

impl EdgeInterrupt for ReplayPin {
    fn listen_falling_edge(&mut self) {
        self.listening.set(true);
    }

    fn clear_edge(&mut self) {
        self.pending.set(false);
    }
}

/// Idealized waveform of 8-N-1 frames sent back to back
///
/// The line idles high until `lead`, then each frame takes ten bit periods.
pub fn frame_waveform(data: &[u8], bit_period: u32, lead: u32) -> Vec<(u32, bool)> {
    let mut waveform = std::vec![(0, true)];
    let mut start = lead;

    for &byte in data {
        waveform.push((start, false));
        for bit in 0..8 {
            waveform.push((start + (bit + 1) * bit_period, byte & (1 << bit) != 0));
        }
        waveform.push((start + 9 * bit_period, true));
        start += 10 * bit_period;
    }

    waveform
}

/// Interrupt control that only counts critical sections
#[derive(Default)]
pub struct NoInterrupts {
    sections: Cell<usize>,
    masked: Cell<bool>,
}

impl NoInterrupts {
    /// Number of critical sections entered so far
    pub fn sections(&self) -> usize {
        self.sections.get()
    }

    /// Whether a critical section is currently open
    pub fn masked(&self) -> bool {
        self.masked.get()
    }
}

impl InterruptControl for NoInterrupts {
    fn free<R>(&self, f: impl FnOnce() -> R) -> R {
        self.masked.set(true);
        self.sections.set(self.sections.get() + 1);
        let result = f();
        self.masked.set(false);
        result
    }
}

/// In-memory hardware UART
#[derive(Default)]
pub struct MockUart {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub baud: u32,
    pub flushes: u32,
}

impl HardwareUart for MockUart {
    fn begin(&mut self, baud: u32) {
        self.baud = baud;
    }

    fn write_byte(&mut self, byte: u8) {
        self.tx.push(byte);
    }

    fn read(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or(0)
    }

    fn peek(&mut self) -> u8 {
        self.rx.front().copied().unwrap_or(0)
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
