//! UART peripheral mapping
//!
//! RP2040 has two UART peripherals. UART0 on GPIO 0/1 is the debug UART.
//! Unlike chips with a pin matrix, each UART is reachable only from a fixed
//! set of pins, so no spare unit is handed out for arbitrary pins; channels
//! elsewhere run on the software engine.

use bitline_core::{ChannelConfig, DebugPins, HardwareSerial, IoUart, UartNum};
use bitline_hal::PinId;
use embassy_rp::uart::BufferedUart;

/// Debug UART pins (UART0 TX/RX)
pub const DEBUG_PINS: DebugPins = DebugPins::new(0, 1);

/// Hardware UARTs that can be routed to arbitrary pins
pub const SPARE_UARTS: u8 = 0;

/// Look-ahead bytes buffered on top of the driver's own RX buffer
///
/// Also the largest single read a hardware channel accepts, so it matches
/// the driver's RX buffer.
pub const RX_LOOKAHEAD: usize = 256;

/// Hardware backend over an interrupt-driven buffered UART
pub type BufferedSerial = HardwareSerial<IoUart<BufferedUart, RX_LOOKAHEAD>>;

/// Wrap an initialized buffered UART as a hardware backend
pub fn buffered_serial(uart: BufferedUart, unit: UartNum) -> BufferedSerial {
    HardwareSerial::new(IoUart::new(uart), unit)
}

/// Determine which UART unit a GPIO pin can be muxed to
pub fn gpio_to_uart(gpio: PinId) -> Option<UartNum> {
    // UART0: GPIO 0/1, 12/13, 16/17, 28/29
    // UART1: GPIO 4/5, 8/9, 20/21, 24/25
    match gpio.number() {
        0 | 1 | 12 | 13 | 16 | 17 | 28 | 29 => Some(UartNum(0)),
        4 | 5 | 8 | 9 | 20 | 21 | 24 | 25 => Some(UartNum(1)),
        _ => None,
    }
}

/// UART unit that could serve a TX/RX pin pair directly
///
/// TX must sit on an even pin of a pair and RX on the odd one.
pub fn unit_for_pins(tx: PinId, rx: PinId) -> Option<UartNum> {
    let unit = gpio_to_uart(tx)?;
    let paired = tx.number() % 4 == 0 && rx.number() == tx.number() + 1;
    (paired && gpio_to_uart(rx) == Some(unit)).then_some(unit)
}

/// UART unit a channel's pins are wired to, if it has both and they pair up
pub fn channel_unit(config: &ChannelConfig) -> Option<UartNum> {
    unit_for_pins(config.tx_pin?, config.rx_pin?)
}
