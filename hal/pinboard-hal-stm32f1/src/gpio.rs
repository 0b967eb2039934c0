//! GPIO pin driver for STM32F1
//!
//! Pins are handed over once at startup into a [`PinBank`]; binding a
//! context takes its pin out of the bank and wraps it in a `Flex` pin that
//! can be reconfigured between input and output at runtime.

use core::fmt;

use embassy_stm32::gpio::{AnyPin, Flex, Level as HwLevel, Pin, Pull, Speed};
use embassy_stm32::Peri;
use pinboard_hal::gpio::{
    Direction, ImplConfig, Level, OutputSpeed, PinConfig, PinContext, PinDriver, PinId, PullMode,
    Stm32f1Options, PINS_PER_PORT, PORT_COUNT,
};

/// Pin slots addressable by [`PinId`] (ports A-G, 16 pins each)
pub const PIN_SLOTS: usize = PORT_COUNT as usize * PINS_PER_PORT as usize;

/// Move pins out of the embassy `Peripherals` struct into a [`PinBank`]
///
/// Usage:
/// ```ignore
/// let mut bank = PinBank::new();
/// bank_pins!(bank, p, PA0, PA1, PC13);
/// ```
#[macro_export]
macro_rules! bank_pins {
    ($bank:expr, $p:expr, $($name:ident),+ $(,)?) => {
        $( $bank.insert($p.$name.into()); )+
    };
}

/// Error from pin driver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin does not exist on this chip
    InvalidPin,
    /// Pin was never banked (claimed by another peripheral, or SWD)
    NotAvailable,
    /// Context is already bound to its pin
    AlreadyBound,
    /// Context has not been bound by `init`
    NotBound,
    /// Options payload belongs to another driver family
    UnsupportedOptions,
    /// Pull resistors are only available on inputs
    UnsupportedPull,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PinError::InvalidPin => "invalid pin",
            PinError::NotAvailable => "pin not available",
            PinError::AlreadyBound => "context already bound",
            PinError::NotBound => "context not bound",
            PinError::UnsupportedOptions => "options for another driver family",
            PinError::UnsupportedPull => "pull mode not supported on outputs",
        };
        f.write_str(msg)
    }
}

/// Pin bank that holds GPIO pins and allows taking them by identity
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; PIN_SLOTS],
}

impl Default for PinBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBank {
    /// Create an empty pin bank
    pub fn new() -> Self {
        Self {
            pins: core::array::from_fn(|_| None),
        }
    }

    /// Add a pin to the bank
    ///
    /// The slot is derived from the pin's own port and number.
    pub fn insert(&mut self, pin: Peri<'static, AnyPin>) {
        let slot = pin.port() as usize * PINS_PER_PORT as usize + pin.pin() as usize;
        if slot < PIN_SLOTS {
            self.pins[slot] = Some(pin);
        }
    }

    /// Take a pin by identity
    ///
    /// Returns the pin if available, or an error if:
    /// - Pin is outside the addressable range
    /// - Pin was never banked or was already taken
    pub fn take(&mut self, id: PinId) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(id.flat_index())
            .ok_or(PinError::InvalidPin)?
            .take()
            .ok_or(PinError::NotAvailable)
    }
}

/// STM32F1 implementation of [`PinDriver`]
pub struct Stm32f1Driver {
    bank: PinBank,
    bound: [Option<Flex<'static>>; PIN_SLOTS],
}

impl Stm32f1Driver {
    /// Create a driver over a populated pin bank
    pub fn new(bank: PinBank) -> Self {
        Self {
            bank,
            bound: core::array::from_fn(|_| None),
        }
    }

    fn flex(&mut self, ctx: &PinContext) -> Result<&mut Flex<'static>, PinError> {
        self.bound
            .get_mut(ctx.pin().flat_index())
            .ok_or(PinError::InvalidPin)?
            .as_mut()
            .ok_or(PinError::NotBound)
    }
}

fn options_for(config: &PinConfig) -> Result<Stm32f1Options, PinError> {
    match config.options {
        ImplConfig::Generic => Ok(Stm32f1Options::DEFAULT),
        ImplConfig::Stm32f1(options) => Ok(options),
        _ => Err(PinError::UnsupportedOptions),
    }
}

fn to_pull(pull: PullMode) -> Pull {
    match pull {
        PullMode::None => Pull::None,
        PullMode::Up => Pull::Up,
        PullMode::Down => Pull::Down,
    }
}

fn to_speed(speed: OutputSpeed) -> Speed {
    match speed {
        OutputSpeed::Low => Speed::Low,
        OutputSpeed::Medium => Speed::Medium,
        OutputSpeed::High => Speed::VeryHigh,
    }
}

fn to_hw_level(level: Level) -> HwLevel {
    match level {
        Level::Low => HwLevel::Low,
        Level::High => HwLevel::High,
    }
}

impl PinDriver for Stm32f1Driver {
    type Error = PinError;

    fn init(&mut self, ctx: &mut PinContext) -> Result<(), PinError> {
        let slot = self
            .bound
            .get_mut(ctx.pin().flat_index())
            .ok_or(PinError::InvalidPin)?;
        if slot.is_some() {
            return Err(PinError::AlreadyBound);
        }
        let pin = self.bank.take(ctx.pin())?;
        *slot = Some(Flex::new(pin));
        Ok(())
    }

    fn set_config(&mut self, ctx: &mut PinContext, config: &PinConfig) -> Result<(), PinError> {
        let options = options_for(config)?;
        let flex = self.flex(ctx)?;

        match config.direction {
            Direction::Input => flex.set_as_input(to_pull(config.pull)),
            Direction::Output => {
                if config.pull != PullMode::None {
                    return Err(PinError::UnsupportedPull);
                }
                // Latch the level first so the pin never glitches
                flex.set_level(to_hw_level(options.initial_level));
                if options.open_drain {
                    flex.set_as_input_output(to_speed(options.speed));
                } else {
                    flex.set_as_output(to_speed(options.speed));
                }
            }
        }
        Ok(())
    }

    fn set_state(&mut self, ctx: &PinContext, level: Level) -> Result<(), PinError> {
        self.flex(ctx)?.set_level(to_hw_level(level));
        Ok(())
    }

    fn get_state(&mut self, ctx: &PinContext) -> Result<Level, PinError> {
        let level = match self.flex(ctx)?.get_level() {
            HwLevel::Low => Level::Low,
            HwLevel::High => Level::High,
        };
        Ok(level)
    }
}
