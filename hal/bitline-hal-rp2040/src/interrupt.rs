//! Interrupt masking

use bitline_hal::InterruptControl;

/// Masks interrupts on the current core with `critical_section::with`
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalSection;

impl InterruptControl for CriticalSection {
    fn free<R>(&self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}
