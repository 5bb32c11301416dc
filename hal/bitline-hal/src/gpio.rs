//! GPIO pin abstractions
//!
//! Provides traits for the digital pins a software UART drives and samples.
//! Pin mode (output / input with pull-up) is fixed when the platform pin
//! object is constructed.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip. Setting a level must be fast: the transmitter
/// calls it once per bit from inside a timing-critical section.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Input pin with a falling-edge interrupt source
///
/// The application binds the pin's interrupt vector to the receive engine;
/// these hooks only arm and acknowledge the edge detector.
pub trait EdgeInterrupt: InputPin {
    /// Enable the falling-edge interrupt for this pin
    fn listen_falling_edge(&mut self);

    /// Clear the pending edge status so the same transition does not
    /// re-trigger the handler
    fn clear_edge(&mut self);
}
