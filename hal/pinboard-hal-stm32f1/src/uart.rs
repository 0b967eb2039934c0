//! Debug UART for STM32F1
//!
//! Blocking USART writer used for human-readable bring-up messages.

use core::fmt;

use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::{Config, Error as UsartError, Uart};
use pinboard_hal::uart::UartTx;

/// Default debug baud rate
pub const DEBUG_BAUDRATE: u32 = 115_200;

/// USART configuration for the debug port (8N1)
pub fn debug_config(baudrate: u32) -> Config {
    let mut config = Config::default();
    config.baudrate = baudrate;
    config
}

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// Overrun error
    Overrun,
    /// Parity error
    Parity,
    /// Buffer too small
    BufferTooSmall,
    /// Other error
    Other,
}

impl From<UsartError> for UartBusError {
    fn from(e: UsartError) -> Self {
        match e {
            UsartError::Framing => UartBusError::Framing,
            UsartError::Noise => UartBusError::Noise,
            UsartError::Overrun => UartBusError::Overrun,
            UsartError::Parity => UartBusError::Parity,
            UsartError::BufferTooLong => UartBusError::BufferTooSmall,
            #[allow(unreachable_patterns)]
            _ => UartBusError::Other,
        }
    }
}

/// Blocking debug writer
pub struct DebugUart {
    uart: Uart<'static, Blocking>,
}

impl DebugUart {
    /// Wrap an already-initialized blocking UART
    pub fn new(uart: Uart<'static, Blocking>) -> Self {
        Self { uart }
    }
}

impl UartTx for DebugUart {
    type Error = UartBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartBusError> {
        self.uart.blocking_write(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), UartBusError> {
        self.uart.blocking_flush()?;
        Ok(())
    }
}

impl fmt::Write for DebugUart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_blocking(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
