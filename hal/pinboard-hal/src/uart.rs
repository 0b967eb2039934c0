//! UART debug output abstraction
//!
//! Board bring-up prints progress and failures over a serial line. Output
//! is best-effort: callers ignore the result, and nothing about board
//! initialization depends on it.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write a text line terminated with `\r\n`
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.write_blocking(line.as_bytes())?;
        self.write_blocking(b"\r\n")
    }
}

/// Discards everything
///
/// Used when debug output is disabled in the firmware configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTx;

impl UartTx for NullTx {
    type Error = core::convert::Infallible;

    fn write_blocking(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
