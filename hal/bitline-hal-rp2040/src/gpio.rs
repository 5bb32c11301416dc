//! GPIO adapters and pin bookkeeping
//!
//! The software UART drives TX through an embassy `Output` and samples RX
//! through an embassy `Input`. The RX falling edge is delivered by awaiting
//! [`SoftRxPin::wait_for_falling_edge`] from a task on an interrupt
//! executor. The edge flag the receive engine acknowledges is kept in
//! software, since embassy re-arms the GPIO interrupt on every wait.

use bitline_hal::{EdgeInterrupt, InputPin, OutputPin, PinId};
use embassy_rp::gpio::{Input, Output};
use heapless::FnvIndexSet;

/// Maximum number of GPIO pins on RP2040
pub const GPIO_COUNT: usize = 30;

/// Software UART transmit pin
pub struct SoftTxPin<'d> {
    pin: Output<'d>,
}

impl<'d> SoftTxPin<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for SoftTxPin<'_> {
    #[inline(always)]
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    #[inline(always)]
    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Latched falling-edge flag
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct EdgeLatch {
    armed: bool,
    pending: bool,
}

impl EdgeLatch {
    fn arm(&mut self) {
        self.armed = true;
    }

    /// Whether the next wait has to go to the hardware
    fn must_wait(&self) -> bool {
        !self.pending
    }

    fn set(&mut self) {
        self.pending = true;
    }

    fn clear(&mut self) {
        self.pending = false;
    }
}

/// Software UART receive pin
///
/// Construct the `Input` with a pull-up so a disconnected line idles high.
pub struct SoftRxPin<'d> {
    pin: Input<'d>,
    latch: EdgeLatch,
}

impl<'d> SoftRxPin<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self {
            pin,
            latch: EdgeLatch::default(),
        }
    }

    /// Wait for the next high-to-low transition
    ///
    /// Never completes before `listen_falling_edge`. Completes at once while
    /// the previous edge has not been cleared.
    pub async fn wait_for_falling_edge(&mut self) {
        if !self.latch.armed {
            core::future::pending::<()>().await;
        }
        if self.latch.must_wait() {
            self.pin.wait_for_falling_edge().await;
            self.latch.set();
        }
    }
}

impl InputPin for SoftRxPin<'_> {
    #[inline(always)]
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl EdgeInterrupt for SoftRxPin<'_> {
    fn listen_falling_edge(&mut self) {
        self.latch.arm();
    }

    fn clear_edge(&mut self) {
        self.latch.clear();
    }
}

/// Pin bookkeeping error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already claimed by another channel
    AlreadyTaken,
}

/// Tracks which GPIO pins serial channels have claimed
pub struct PinAllocator {
    allocated: FnvIndexSet<u8, 32>,
}

impl Default for PinAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PinAllocator {
    pub fn new() -> Self {
        Self {
            allocated: FnvIndexSet::new(),
        }
    }

    /// Claim a pin
    pub fn claim(&mut self, pin: PinId) -> Result<(), PinError> {
        if pin.number() as usize >= GPIO_COUNT {
            return Err(PinError::InvalidPin);
        }
        if self.allocated.contains(&pin.number()) {
            return Err(PinError::AlreadyTaken);
        }
        self.allocated
            .insert(pin.number())
            .map_err(|_| PinError::InvalidPin)?;
        Ok(())
    }

    /// Claim every pin a channel uses
    ///
    /// Nothing is claimed if any pin is unavailable.
    pub fn claim_channel(&mut self, tx: Option<PinId>, rx: Option<PinId>) -> Result<(), PinError> {
        for pin in [tx, rx].into_iter().flatten() {
            if pin.number() as usize >= GPIO_COUNT {
                return Err(PinError::InvalidPin);
            }
            if self.is_claimed(pin) {
                return Err(PinError::AlreadyTaken);
            }
        }
        if tx.is_some() && tx == rx {
            return Err(PinError::AlreadyTaken);
        }
        for pin in [tx, rx].into_iter().flatten() {
            self.claim(pin)?;
        }
        Ok(())
    }

    pub fn is_claimed(&self, pin: PinId) -> bool {
        self.allocated.contains(&pin.number())
    }

    pub fn claimed_count(&self) -> usize {
        self.allocated.len()
    }
}
