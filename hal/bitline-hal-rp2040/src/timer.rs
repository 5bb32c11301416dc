//! Tick counter on the embassy time driver
//!
//! The RP2040 time driver runs the 64-bit TIMER peripheral at 1 MHz. Only
//! the low 32 bits are used; the bit-bang engines work on wrapping offsets.

use bitline_hal::CycleCounter;
use embassy_time::{Instant, TICK_HZ};

/// Free-running counter backed by `embassy_time::Instant`
///
/// Reading the counter touches the TIMER registers directly, so it keeps
/// counting inside critical sections.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmbassyTicks;

impl CycleCounter for EmbassyTicks {
    #[inline(always)]
    fn now(&self) -> u32 {
        Instant::now().as_ticks() as u32
    }

    fn frequency_hz(&self) -> u32 {
        TICK_HZ as u32
    }
}
