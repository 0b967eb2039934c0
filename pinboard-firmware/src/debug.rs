//! Best-effort text console
//!
//! Mirrors bring-up messages onto the debug UART when it is enabled. Write
//! errors are dropped; nothing depends on this output.

use core::fmt::{self, Write as _};

use heapless::String;
use pinboard_hal::uart::{NullTx, UartTx};
use pinboard_hal_stm32f1::{DebugUart, UartBusError};

/// Longest line formatted for the console
pub const LINE_CAPACITY: usize = 96;

/// Where console text goes
pub enum DebugSink {
    Uart(DebugUart),
    Off(NullTx),
}

impl UartTx for DebugSink {
    type Error = UartBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartBusError> {
        match self {
            DebugSink::Uart(uart) => uart.write_blocking(data),
            DebugSink::Off(null) => null.write_blocking(data).map_err(|never| match never {}),
        }
    }

    fn flush(&mut self) -> Result<(), UartBusError> {
        match self {
            DebugSink::Uart(uart) => uart.flush(),
            DebugSink::Off(null) => null.flush().map_err(|never| match never {}),
        }
    }
}

pub struct Console {
    sink: DebugSink,
}

impl Console {
    pub fn new(sink: DebugSink) -> Self {
        Self { sink }
    }

    /// Format one line and send it
    ///
    /// Returns the formatted text so the caller can also hand it to defmt.
    /// Lines longer than [`LINE_CAPACITY`] are truncated.
    pub fn line(&mut self, args: fmt::Arguments<'_>) -> String<LINE_CAPACITY> {
        let mut text = String::new();
        let _ = text.write_fmt(args);
        let _ = self.sink.write_line(&text);
        text
    }

    pub fn flush(&mut self) {
        let _ = self.sink.flush();
    }
}
