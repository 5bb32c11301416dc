//! Bitline Hardware Abstraction Layer
//!
//! This crate defines the platform primitives the Bitline serial channel is
//! built on. Chip-specific HALs (RP2040, ...) implement them; the
//! board-agnostic engine in `bitline-core` only ever talks to these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (bitline-firmware, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitline-core (channel, bit-bang engine)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitline-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ bitline-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::EdgeInterrupt`] - Digital I/O
//! - [`timer::CycleCounter`] - Free-running tick counter for bit timing
//! - [`interrupt::InterruptControl`] - Global interrupt masking
//! - [`uart::HardwareUart`] - Silicon UART peripheral

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod interrupt;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{EdgeInterrupt, InputPin, OutputPin};
pub use interrupt::InterruptControl;
pub use timer::CycleCounter;
pub use uart::{HardwareUart, PinId};
