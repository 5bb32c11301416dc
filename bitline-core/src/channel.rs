//! Serial channel façade
//!
//! [`UartChannel`] is what drivers talk to. It looks the same whichever
//! backend it was bound to at startup and adds the blocking read policy:
//! reads wait for the requested number of bytes until the backend's read
//! timeout runs out, and either get all of them or consume nothing.
//!
//! ```ignore
//! let mut channel = UartChannel::new(config, &mut soft_serial, counter);
//! channel.setup();
//! channel.write_string("AT\r\n")?;
//! let mut reply = [0u8; 4];
//! channel.read_bytes(&mut reply)?;
//! ```

use core::fmt;

use bitline_hal::CycleCounter;

use crate::backend::{BackendKind, SerialBackend};
use crate::config::ChannelConfig;
use crate::error::UartError;

/// Logical serial channel bound to one backend
pub struct UartChannel<'a, C> {
    config: ChannelConfig,
    backend: &'a mut dyn SerialBackend,
    counter: C,
}

impl<'a, C: CycleCounter> UartChannel<'a, C> {
    /// Bind a channel to its backend
    ///
    /// `counter` measures read timeouts.
    pub fn new(config: ChannelConfig, backend: &'a mut dyn SerialBackend, counter: C) -> Self {
        Self {
            config,
            backend,
            counter,
        }
    }

    /// Log the configuration and start the backend
    pub fn setup(&mut self) {
        info!("Setting up UART...");
        info!("    TX Pin: {}", self.config.tx_pin);
        info!("    RX Pin: {}", self.config.rx_pin);
        info!("    Baud Rate: {}", self.config.baud_rate);
        info!("    Backend: {}", self.backend.kind());
        self.backend.begin(self.config.baud_rate);
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Read timeout of the bound backend
    pub fn read_timeout_ms(&self) -> u32 {
        self.backend.read_timeout_ms()
    }

    /// Send one byte
    ///
    /// Blocks until the byte is out. Fails only on a software channel
    /// without a TX pin.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), UartError> {
        self.backend.write_byte(byte)?;
        trace!("    Wrote {=u8:#b} ({=u8:#x})", byte, byte);
        Ok(())
    }

    /// Send a buffer
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), UartError> {
        self.backend.write_bytes(data)?;
        for &byte in data {
            trace!("    Wrote {=u8:#b} ({=u8:#x})", byte, byte);
        }
        Ok(())
    }

    /// Send the bytes of a string
    pub fn write_string(&mut self, s: &str) -> Result<(), UartError> {
        self.backend.write_bytes(s.as_bytes())?;
        trace!("    Wrote \"{=str}\"", s);
        Ok(())
    }

    /// Take one byte, waiting up to the read timeout
    pub fn read_byte(&mut self) -> Result<u8, UartError> {
        self.wait_for(1)?;
        let byte = self.backend.read_byte();
        trace!("    Read {=u8:#b} ({=u8:#x})", byte, byte);
        Ok(byte)
    }

    /// Look at the next byte without consuming it, waiting up to the read
    /// timeout
    pub fn peek_byte(&mut self) -> Result<u8, UartError> {
        self.wait_for(1)?;
        Ok(self.backend.peek_byte())
    }

    /// Fill `buf` completely, waiting up to the read timeout
    ///
    /// All or nothing: on timeout no byte is consumed, even if some were
    /// already buffered. A buffer longer than the backend's receive capacity
    /// is rejected up front with [`UartError::ReadTooLarge`].
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), UartError> {
        let capacity = self.backend.rx_capacity();
        if buf.len() > capacity {
            error!("Cannot read {} bytes, receive buffer holds {}", buf.len(), capacity);
            return Err(UartError::ReadTooLarge);
        }
        self.wait_for(buf.len())?;
        self.backend.read_bytes(buf);
        for &byte in buf.iter() {
            trace!("    Read {=u8:#b} ({=u8:#x})", byte, byte);
        }
        Ok(())
    }

    /// Number of bytes ready to read; never blocks
    pub fn available(&mut self) -> usize {
        self.backend.available()
    }

    /// Backend-specific flush
    ///
    /// A hardware channel flushes the peripheral. A software channel throws
    /// away every unread received byte.
    pub fn flush(&mut self) {
        trace!("    Flushing...");
        self.backend.flush();
    }

    /// Spin until `len` bytes are buffered or the read timeout passes
    fn wait_for(&mut self, len: usize) -> Result<(), UartError> {
        if self.backend.available() >= len {
            return Ok(());
        }

        let timeout = self.counter.ms_to_ticks(self.backend.read_timeout_ms());
        let start = self.counter.now();
        while self.backend.available() < len {
            if self.counter.elapsed_since(start) > timeout {
                error!(
                    "Reading from UART timed out at byte {}!",
                    self.backend.available()
                );
                return Err(UartError::ReadTimeout);
            }
            core::hint::spin_loop();
        }
        Ok(())
    }
}

impl<C: CycleCounter> embedded_io::ErrorType for UartChannel<'_, C> {
    type Error = UartError;
}

impl<C: CycleCounter> embedded_io::Read for UartChannel<'_, C> {
    /// Waits for at least one byte, then returns whatever is buffered
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.wait_for(1)?;
        let n = self.backend.available().min(buf.len());
        self.read_bytes(&mut buf[..n])?;
        Ok(n)
    }
}

impl<C: CycleCounter> embedded_io::ReadReady for UartChannel<'_, C> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.available() > 0)
    }
}

impl<C: CycleCounter> embedded_io::Write for UartChannel<'_, C> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    /// Writes are synchronous, so there is never anything pending. This does
    /// not call [`UartChannel::flush`], which would drop received data on a
    /// software channel.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<C: CycleCounter> fmt::Write for UartChannel<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s).map_err(|_| fmt::Error)
    }
}
