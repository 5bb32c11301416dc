//! Global interrupt masking

/// Masks all interrupts for the duration of a closure
///
/// The transmitter runs each frame inside [`InterruptControl::free`] so the
/// receive interrupt cannot stretch a bit cell. Implementations must restore
/// the previous interrupt state on return, not unconditionally enable.
pub trait InterruptControl {
    /// Run `f` with interrupts disabled
    fn free<R>(&self, f: impl FnOnce() -> R) -> R;
}
