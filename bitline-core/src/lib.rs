//! Board-agnostic software UART for the Bitline firmware
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Bit-banged 8-N-1 transmitter and receiver
//! - Lock-free receive ring shared with the RX interrupt
//! - Hardware and software serial backends and backend selection
//! - The [`UartChannel`] façade drivers talk to
//! - Configuration and bit timing
//!
//! Platform code supplies pins, the cycle counter and interrupt control
//! through the `bitline-hal` traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod backend;
pub mod channel;
pub mod config;
pub mod error;
pub mod hardware;
pub mod ring;
pub mod rx;
pub mod soft;
pub mod tx;

#[cfg(test)]
mod sim;

pub use backend::{select_backend, Backend, BackendKind, SerialBackend, UartNum, UartNumAllocator};
pub use channel::UartChannel;
pub use config::{BitTiming, ChannelConfig, DebugPins};
pub use error::UartError;
pub use hardware::{HardwareSerial, IoUart};
pub use ring::RxRing;
pub use rx::BitBangRx;
pub use soft::SoftSerial;
pub use tx::BitBangTx;
