//! Pinboard Hardware Abstraction Layer
//!
//! This crate defines the types shared between the board registry and
//! chip-specific pin drivers (STM32F1, host mocks, etc.). The registry
//! never touches registers; it hands [`gpio::PinContext`]s and
//! [`gpio::PinConfig`]s to a [`gpio::PinDriver`] implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pinboard-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinboard-core (registry + sequencer)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinboard-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ pinboard-hal- │
//!             │    stm32f1    │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::PinDriver`] - Context binding, configuration and state I/O
//! - [`uart::UartTx`] - Best-effort debug text output

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key types at crate root for convenience
pub use gpio::{
    Direction, ImplConfig, InterruptTrigger, Level, OutputSpeed, PinCallback, PinConfig, PinContext,
    PinDriver, PinId, Port, PullMode, ResourceState, Stm32f1Options, TransitionError,
};
pub use uart::{NullTx, UartTx};
