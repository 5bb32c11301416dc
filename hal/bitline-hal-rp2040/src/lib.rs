//! RP2040-specific HAL for the Bitline software UART
//!
//! This crate provides RP2040 implementations of the `bitline-hal` traits:
//! - GPIO pin adapters for the bit-bang engines, plus pin bookkeeping
//! - Tick counter on the embassy time driver
//! - Interrupt masking through `critical-section`
//! - UART unit mapping and the buffered hardware UART backend

#![no_std]

pub mod gpio;
pub mod interrupt;
pub mod timer;
pub mod uart;

pub use gpio::{SoftRxPin, SoftTxPin};
pub use interrupt::CriticalSection;
pub use timer::EmbassyTicks;
