//! STM32F1-specific HAL for the Pinboard board-support layer
//!
//! This crate provides the STM32F1 implementation of
//! [`pinboard_hal::PinDriver`] on top of `embassy-stm32`, plus the
//! bring-up pieces the firmware needs around it. It supports:
//!
//! - STM32F103C8 (Blue Pill)
//! - STM32F103CB
//!
//! # Features
//!
//! - `stm32f103c8` / `stm32f103cb` - Select the chip (exactly one)
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! The firmware moves the GPIO pins it does not claim for other
//! peripherals into a [`gpio::PinBank`] with [`bank_pins!`], wraps the
//! bank in a [`gpio::Stm32f1Driver`] and hands that to the registry.

#![no_std]

pub mod clock;
pub mod gpio;
pub mod uart;

pub use clock::{ClockConfig, ClockError};
pub use gpio::{PinBank, PinError, Stm32f1Driver};
pub use uart::{DebugUart, UartBusError};
