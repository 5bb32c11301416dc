//! Free-running cycle counter
//!
//! Bit timing is measured against a counter that increments at a fixed,
//! known rate (CPU cycles, or a microsecond timer on chips without one).

/// Free-running tick counter
///
/// The counter is 32 bits wide and wraps; all arithmetic on its values must
/// use `wrapping_sub`.
pub trait CycleCounter {
    /// Current counter value
    fn now(&self) -> u32;

    /// Counter increment rate in Hz
    fn frequency_hz(&self) -> u32;

    /// Ticks elapsed since `start`
    fn elapsed_since(&self, start: u32) -> u32 {
        self.now().wrapping_sub(start)
    }

    /// Busy-wait until `deadline` ticks have passed since `start`
    ///
    /// This is a spin on the counter, not a sleep: a sleep primitive would
    /// drift and desynchronize the frame.
    #[inline(always)]
    fn wait_until(&self, start: u32, deadline: u32) {
        while self.elapsed_since(start) < deadline {}
    }

    /// Number of ticks in `ms` milliseconds
    fn ms_to_ticks(&self, ms: u32) -> u32 {
        ms.saturating_mul(self.frequency_hz() / 1000)
    }
}

impl<T: CycleCounter + ?Sized> CycleCounter for &T {
    fn now(&self) -> u32 {
        (**self).now()
    }

    fn frequency_hz(&self) -> u32 {
        (**self).frequency_hz()
    }
}
