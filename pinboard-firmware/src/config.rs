//! Firmware settings generated from board.toml
//!
//! `build.rs` validates board.toml and writes the `FIRMWARE_CONFIG`
//! constant; edit the file and rebuild to change these values.

pub use pinboard_hal_stm32f1::ClockConfig;

/// Debug UART settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct DebugConfig {
    /// Open USART1 for text output
    pub enabled: bool,
    pub baudrate: u32,
}

/// LED blink loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct BlinkConfig {
    /// Time spent in each LED state
    pub period_ms: u32,
}

/// GPIO loopback test run once after bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct IoTestConfig {
    pub cycles: u32,
    /// Delay after each edge on the debug output
    pub period_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareConfig {
    pub clock: ClockConfig,
    pub debug: DebugConfig,
    pub blink: BlinkConfig,
    pub io_test: IoTestConfig,
}

include!(concat!(env!("OUT_DIR"), "/firmware_config.rs"));
