//! Blue Pill (STM32F103C8) resource map
//!
//! | Resource      | Pin  | Mode              |
//! |---------------|------|-------------------|
//! | `LedBuiltin`  | PC13 | output, active low|
//! | `UserButton`  | PA0  | input, pull-up    |
//! | `DebugOutput` | PA1  | output            |
//! | `TestInput`   | PA2  | input, pull-up    |

use pinboard_hal::gpio::{ImplConfig, Level, PinConfig, PinId, Port, PullMode, Stm32f1Options};

use crate::registry::Registry;
use crate::resource::ResourceId;
use crate::table::{Declaration, DeclareError};

crate::resource_ids! {
    /// Logical pins of the Blue Pill
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum BluePillPin {
        /// On-board LED, lit when driven low
        LedBuiltin,
        UserButton,
        /// Scope probe point for the I/O test
        DebugOutput,
        /// Loopback input for the I/O test
        TestInput,
    }
}

pub const PIN_COUNT: usize = BluePillPin::COUNT;

// LED starts high so it is off after bring-up
const LED_OPTIONS: ImplConfig =
    ImplConfig::Stm32f1(Stm32f1Options::DEFAULT.with_initial_level(Level::High));

pub static DECLARATIONS: [Declaration<BluePillPin>; PIN_COUNT] = [
    Declaration::new(
        BluePillPin::LedBuiltin,
        PinId::new(Port::C, 13),
        PinConfig::output().with_options(LED_OPTIONS),
    ),
    Declaration::new(
        BluePillPin::UserButton,
        PinId::new(Port::A, 0),
        PinConfig::input(PullMode::Up),
    ),
    Declaration::new(
        BluePillPin::DebugOutput,
        PinId::new(Port::A, 1),
        PinConfig::output(),
    ),
    Declaration::new(
        BluePillPin::TestInput,
        PinId::new(Port::A, 2),
        PinConfig::input(PullMode::Up),
    ),
];

pub type BluePillRegistry<D> = Registry<BluePillPin, D, PIN_COUNT>;

/// Registry for the Blue Pill resource map
pub fn registry<D: pinboard_hal::PinDriver>(
    driver: D,
) -> Result<BluePillRegistry<D>, DeclareError<BluePillPin>> {
    Registry::new(driver, &DECLARATIONS)
}
