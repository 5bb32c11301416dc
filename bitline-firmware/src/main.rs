//! Bitline - software UART bridge firmware
//!
//! Runs on an RP2040 board. The debug UART on GPIO 0/1 is bound to the
//! UART0 peripheral; a second channel on GPIO 6/7, where no UART can be
//! muxed, runs on the bit-banged engine. Lines received on either side are
//! forwarded to the other.
//!
//! The software receiver runs on a high-priority interrupt executor so an
//! RX edge preempts the bridge loop wherever it is. The transmitter's
//! critical section masks that executor for the length of a frame.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::{bind_interrupts, interrupt};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Timer;
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use bitline_core::config::DEFAULT_RX_BUFFER_SIZE;
use bitline_core::{
    select_backend, Backend, BitBangRx, BitBangTx, BitTiming, ChannelConfig, RxRing, SoftSerial,
    UartChannel, UartNumAllocator,
};
use bitline_hal::CycleCounter;
use bitline_hal_rp2040::gpio::PinAllocator;
use bitline_hal_rp2040::uart::{buffered_serial, channel_unit, DEBUG_PINS, SPARE_UARTS};
use bitline_hal_rp2040::{CriticalSection, EmbassyTicks, SoftRxPin, SoftTxPin};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Console on the debug UART
const CONSOLE: ChannelConfig = ChannelConfig::new(0, 1, 115_200);

/// Bridged device on plain GPIO
const DEVICE: ChannelConfig = ChannelConfig::new(6, 7, 9600);

/// Ticks from an RX edge until the receive task reads the counter
///
/// Covers the GPIO interrupt, the pended executor interrupt and the task
/// poll. Holds as long as nothing of equal or higher priority is running.
const RX_ENTRY_LATENCY_TICKS: u32 = 12;

/// Longest line forwarded in one piece
const LINE_LEN: usize = 128;

type SoftRx = BitBangRx<'static, SoftRxPin<'static>, EmbassyTicks, DEFAULT_RX_BUFFER_SIZE>;

static DEVICE_RX: RxRing<DEFAULT_RX_BUFFER_SIZE> = RxRing::new();

static EXECUTOR_RX: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    unsafe { EXECUTOR_RX.on_interrupt() }
}

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Software UART receive task
///
/// Stands in for the falling-edge interrupt handler: every edge on the RX
/// line wakes the task on `EXECUTOR_RX`, which captures one frame into the
/// ring before returning to thread mode.
#[embassy_executor::task]
async fn soft_rx_task(mut rx: SoftRx) {
    info!("Software UART RX task started");
    rx.listen();

    loop {
        rx.pin_mut().wait_for_falling_edge().await;
        rx.on_falling_edge();
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Bitline firmware starting...");

    let p = embassy_rp::init(Default::default());

    let mut pins = PinAllocator::new();
    unwrap!(pins.claim_channel(CONSOLE.tx_pin, CONSOLE.rx_pin));
    unwrap!(pins.claim_channel(DEVICE.tx_pin, DEVICE.rx_pin));

    let mut units = UartNumAllocator::new(SPARE_UARTS);

    // Console: always lands on UART0
    let console_backend = select_backend(&CONSOLE, &DEBUG_PINS, &mut units);
    let Backend::Hardware(console_unit) = console_backend else {
        defmt::panic!("Console must be on the debug UART");
    };
    if channel_unit(&CONSOLE) != Some(console_unit) {
        defmt::panic!("Console pins are not wired to UART{}", console_unit.0);
    }

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = CONSOLE.baud_rate;
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    let mut console_serial = buffered_serial(uart, console_unit);
    let mut console = UartChannel::new(CONSOLE, &mut console_serial, EmbassyTicks);
    console.setup();

    // Device: no spare unit on this chip, so software serial
    let device_backend = select_backend(&DEVICE, &DEBUG_PINS, &mut units);
    if device_backend != Backend::Software {
        defmt::panic!("Device channel was handed a hardware UART");
    }
    if let Some(unit) = channel_unit(&DEVICE) {
        warn!("Device pins could use UART{}, running software serial anyway", unit.0);
    }

    let timing = unwrap!(BitTiming::new(
        EmbassyTicks.frequency_hz(),
        DEVICE.baud_rate,
        RX_ENTRY_LATENCY_TICKS,
    ));
    info!(
        "Software UART: {} ticks/bit, first sample at {}",
        timing.bit_period, timing.first_sample
    );

    let tx_pin = SoftTxPin::new(Output::new(p.PIN_6, Level::High));
    let rx_pin = SoftRxPin::new(Input::new(p.PIN_7, Pull::Up));

    let tx = BitBangTx::new(tx_pin, EmbassyTicks, CriticalSection, timing);
    let rx = BitBangRx::new(rx_pin, EmbassyTicks, &DEVICE_RX, timing);

    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let rx_spawner = EXECUTOR_RX.start(interrupt::SWI_IRQ_1);
    rx_spawner.spawn(soft_rx_task(rx)).unwrap();

    let mut device_serial = SoftSerial::new(Some(tx), Some(&DEVICE_RX));
    let mut device = UartChannel::new(DEVICE, &mut device_serial, EmbassyTicks);
    device.setup();

    info!("Bridge running");

    let mut from_console: Vec<u8, LINE_LEN> = Vec::new();
    let mut from_device: Vec<u8, LINE_LEN> = Vec::new();

    loop {
        // Only read what is already buffered so one quiet side does not
        // hold up the other
        while console.available() > 0 {
            match console.read_byte() {
                Ok(byte) => {
                    if push_byte(&mut from_console, byte) {
                        if let Err(e) = device.write_bytes(&from_console) {
                            warn!("Device write failed: {}", e);
                        }
                        from_console.clear();
                    }
                }
                Err(e) => warn!("Console read failed: {}", e),
            }
        }

        while device.available() > 0 {
            match device.read_byte() {
                Ok(byte) => {
                    if push_byte(&mut from_device, byte) {
                        if let Err(e) = console.write_bytes(&from_device) {
                            warn!("Console write failed: {}", e);
                        }
                        from_device.clear();
                    }
                }
                Err(e) => warn!("Device read failed: {}", e),
            }
        }

        Timer::after_millis(1).await;
    }
}

/// Append a byte to a line buffer; returns true when the line is complete
fn push_byte(line: &mut Vec<u8, LINE_LEN>, byte: u8) -> bool {
    // Never full on entry: a full line is forwarded and cleared right away
    let _ = line.push(byte);
    byte == b'\n' || line.is_full()
}
