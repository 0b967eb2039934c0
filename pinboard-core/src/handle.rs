//! `embedded-hal` view of a configured resource
//!
//! Lets code written against `embedded_hal::digital` drive a registry pin
//! without knowing about resource ids or the driver behind them.

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin, StatefulOutputPin};
use pinboard_hal::gpio::{Level, PinContext, PinDriver, PinId};

use crate::registry::AccessError;

impl<E: core::fmt::Debug> digital::Error for AccessError<E> {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Borrowed pin of a configured resource
///
/// Obtained from [`Registry::pin`](crate::Registry::pin). Holds the driver
/// mutably, so only one handle exists at a time.
pub struct PinHandle<'r, D: PinDriver> {
    driver: &'r mut D,
    ctx: &'r PinContext,
}

impl<'r, D: PinDriver> PinHandle<'r, D> {
    pub(crate) fn new(driver: &'r mut D, ctx: &'r PinContext) -> Self {
        Self { driver, ctx }
    }

    /// Physical pin behind the handle
    pub fn id(&self) -> PinId {
        self.ctx.pin()
    }

    fn write(&mut self, level: Level) -> Result<(), AccessError<D::Error>> {
        self.driver
            .set_state(self.ctx, level)
            .map_err(AccessError::Driver)
    }

    fn read(&mut self) -> Result<Level, AccessError<D::Error>> {
        self.driver.get_state(self.ctx).map_err(AccessError::Driver)
    }
}

impl<D: PinDriver> ErrorType for PinHandle<'_, D>
where
    D::Error: core::fmt::Debug,
{
    type Error = AccessError<D::Error>;
}

impl<D: PinDriver> OutputPin for PinHandle<'_, D>
where
    D::Error: core::fmt::Debug,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(Level::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(Level::High)
    }
}

impl<D: PinDriver> StatefulOutputPin for PinHandle<'_, D>
where
    D::Error: core::fmt::Debug,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read()?.is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.read()?.is_high())
    }
}

impl<D: PinDriver> InputPin for PinHandle<'_, D>
where
    D::Error: core::fmt::Debug,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read()?.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.read()?.is_high())
    }
}
