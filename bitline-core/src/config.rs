//! Channel configuration and bit timing
//!
//! A [`ChannelConfig`] is fixed when the channel is built and never mutated.
//! [`BitTiming`] turns its baud rate into timer ticks for the bit-bang
//! engines.

use bitline_hal::PinId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::UartError;

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout of the hardware backend in milliseconds
pub const HARDWARE_READ_TIMEOUT_MS: u32 = 1000;

/// Read timeout of the software backend in milliseconds
pub const SOFTWARE_READ_TIMEOUT_MS: u32 = 100;

/// Default receive ring capacity in bytes
pub const DEFAULT_RX_BUFFER_SIZE: usize = 64;

/// Serial channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelConfig {
    /// Transmit pin, if the channel can send
    pub tx_pin: Option<PinId>,
    /// Receive pin, if the channel can receive
    pub rx_pin: Option<PinId>,
    /// Baud rate in bits per second
    pub baud_rate: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            tx_pin: None,
            rx_pin: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl ChannelConfig {
    /// Create a config for a TX/RX pin pair
    pub const fn new(tx_pin: u8, rx_pin: u8, baud_rate: u32) -> Self {
        Self {
            tx_pin: Some(PinId(tx_pin)),
            rx_pin: Some(PinId(rx_pin)),
            baud_rate,
        }
    }

    /// Create a transmit-only config
    pub const fn tx_only(tx_pin: u8, baud_rate: u32) -> Self {
        Self {
            tx_pin: Some(PinId(tx_pin)),
            rx_pin: None,
            baud_rate,
        }
    }

    /// Create a receive-only config
    pub const fn rx_only(rx_pin: u8, baud_rate: u32) -> Self {
        Self {
            tx_pin: None,
            rx_pin: Some(PinId(rx_pin)),
            baud_rate,
        }
    }
}

/// The platform's primary debug/log UART pins
///
/// A channel configured on exactly these pins is bound to hardware UART 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebugPins {
    pub tx: PinId,
    pub rx: PinId,
}

impl DebugPins {
    pub const fn new(tx: u8, rx: u8) -> Self {
        Self {
            tx: PinId(tx),
            rx: PinId(rx),
        }
    }

    /// Check whether `config` sits on the debug UART pins
    pub fn matches(&self, config: &ChannelConfig) -> bool {
        config.tx_pin == Some(self.tx) && config.rx_pin == Some(self.rx)
    }
}

/// Bit timing in timer ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    /// Ticks per bit
    pub bit_period: u32,
    /// Ticks from interrupt entry to the first data-bit sample
    pub first_sample: u32,
}

impl BitTiming {
    /// Derive the bit timing for `baud_rate` on a timer running at `timer_hz`
    ///
    /// `rx_entry_latency` is the number of ticks between the falling edge and
    /// the receive handler reading the counter. The first sample lands a third
    /// of a bit into data bit 0, minus that latency.
    ///
    /// A bit period of zero ticks is rejected. The engines do not otherwise
    /// validate the period; baud rates close to the timer frequency give
    /// coarse, inaccurate bit cells.
    pub fn new(timer_hz: u32, baud_rate: u32, rx_entry_latency: u32) -> Result<Self, UartError> {
        let bit_period = timer_hz.checked_div(baud_rate).unwrap_or(0);
        if bit_period == 0 {
            return Err(UartError::BaudOutOfRange);
        }

        let first_sample = bit_period
            .saturating_add(bit_period / 3)
            .saturating_sub(rx_entry_latency);

        Ok(Self {
            bit_period,
            first_sample,
        })
    }
}
