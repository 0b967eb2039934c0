//! Clock configuration for STM32F1
//!
//! Builds the embassy RCC configuration for an external crystal feeding
//! the PLL. The Blue Pill default is an 8 MHz crystal multiplied to 72 MHz.

use core::fmt;

use embassy_stm32::rcc::{
    AHBPrescaler, APBPrescaler, Hse, HseMode, Pll, PllMul, PllPreDiv, PllSource, Sysclk,
};
use embassy_stm32::time::Hertz;
use embassy_stm32::Config;

/// Highest SYSCLK supported by the STM32F1 family
pub const MAX_SYSCLK_HZ: u32 = 72_000_000;

/// Highest APB1 clock
pub const MAX_APB1_HZ: u32 = 36_000_000;

/// HSE crystal range accepted by the oscillator
pub const HSE_RANGE_HZ: core::ops::RangeInclusive<u32> = 4_000_000..=16_000_000;

/// Clock tree request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// External crystal frequency
    pub hse_hz: u32,
    /// Requested system clock
    pub sysclk_hz: u32,
}

impl ClockConfig {
    /// 8 MHz crystal, 72 MHz system clock
    pub const BLUE_PILL_72MHZ: Self = Self {
        hse_hz: 8_000_000,
        sysclk_hz: 72_000_000,
    };
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::BLUE_PILL_72MHZ
    }
}

/// Error building the clock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// HSE outside 4-16 MHz
    HseOutOfRange,
    /// SYSCLK above 72 MHz
    SysclkOutOfRange,
    /// SYSCLK is not an integer multiple of HSE
    NotMultiple,
    /// PLL multiplier outside 2-16
    MultiplierOutOfRange,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ClockError::HseOutOfRange => "HSE must be 4-16 MHz",
            ClockError::SysclkOutOfRange => "SYSCLK must not exceed 72 MHz",
            ClockError::NotMultiple => "SYSCLK must be a multiple of HSE",
            ClockError::MultiplierOutOfRange => "PLL multiplier must be 2-16",
        };
        f.write_str(msg)
    }
}

/// PLL multiplier for the requested clocks
pub fn pll_multiplier(clock: &ClockConfig) -> Result<u8, ClockError> {
    if !HSE_RANGE_HZ.contains(&clock.hse_hz) {
        return Err(ClockError::HseOutOfRange);
    }
    if clock.sysclk_hz == 0 || clock.sysclk_hz > MAX_SYSCLK_HZ {
        return Err(ClockError::SysclkOutOfRange);
    }
    if clock.sysclk_hz % clock.hse_hz != 0 {
        return Err(ClockError::NotMultiple);
    }
    let mul = clock.sysclk_hz / clock.hse_hz;
    if !(2..=16).contains(&mul) {
        return Err(ClockError::MultiplierOutOfRange);
    }
    Ok(mul as u8)
}

fn pll_mul(mul: u8) -> Result<PllMul, ClockError> {
    let mul = match mul {
        2 => PllMul::MUL2,
        3 => PllMul::MUL3,
        4 => PllMul::MUL4,
        5 => PllMul::MUL5,
        6 => PllMul::MUL6,
        7 => PllMul::MUL7,
        8 => PllMul::MUL8,
        9 => PllMul::MUL9,
        10 => PllMul::MUL10,
        11 => PllMul::MUL11,
        12 => PllMul::MUL12,
        13 => PllMul::MUL13,
        14 => PllMul::MUL14,
        15 => PllMul::MUL15,
        16 => PllMul::MUL16,
        _ => return Err(ClockError::MultiplierOutOfRange),
    };
    Ok(mul)
}

/// Build the embassy configuration for the requested clock tree
pub fn config(clock: &ClockConfig) -> Result<Config, ClockError> {
    let mul = pll_mul(pll_multiplier(clock)?)?;

    let mut config = Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(clock.hse_hz),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll = Some(Pll {
        src: PllSource::HSE,
        prediv: PllPreDiv::DIV1,
        mul,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = if clock.sysclk_hz > MAX_APB1_HZ {
        APBPrescaler::DIV2
    } else {
        APBPrescaler::DIV1
    };
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    Ok(config)
}
