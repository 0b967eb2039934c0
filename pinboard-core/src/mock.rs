//! Recording pin driver for host tests

use std::collections::HashMap;

use pinboard_hal::gpio::{Level, PinConfig, PinContext, PinDriver, PinId};

/// One driver call, in the order it was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Init(PinId),
    SetConfig(PinId, PinConfig),
    SetState(PinId, Level),
    GetState(PinId),
}

impl Call {
    pub fn pin(&self) -> PinId {
        match *self {
            Call::Init(pin)
            | Call::SetConfig(pin, _)
            | Call::SetState(pin, _)
            | Call::GetState(pin) => pin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    InitRejected(PinId),
    ConfigRejected(PinId),
    NotBound(PinId),
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Default)]
pub struct MockDriver {
    pub calls: Vec<Call>,
    pub levels: HashMap<PinId, Level>,
    bound: Vec<PinId>,
    fail_init: Option<PinId>,
    fail_config: Option<PinId>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `init` for this pin
    pub fn fail_init_on(mut self, pin: PinId) -> Self {
        self.fail_init = Some(pin);
        self
    }

    /// Reject `set_config` for this pin
    pub fn fail_config_on(mut self, pin: PinId) -> Self {
        self.fail_config = Some(pin);
        self
    }

    /// Check whether any call was made for `pin`
    pub fn touched(&self, pin: PinId) -> bool {
        self.calls.iter().any(|call| call.pin() == pin)
    }

    fn check_bound(&self, pin: PinId) -> Result<(), MockError> {
        if self.bound.contains(&pin) {
            Ok(())
        } else {
            Err(MockError::NotBound(pin))
        }
    }
}

impl PinDriver for MockDriver {
    type Error = MockError;

    fn init(&mut self, ctx: &mut PinContext) -> Result<(), Self::Error> {
        let pin = ctx.pin();
        self.calls.push(Call::Init(pin));
        if self.fail_init == Some(pin) {
            return Err(MockError::InitRejected(pin));
        }
        self.bound.push(pin);
        Ok(())
    }

    fn set_config(&mut self, ctx: &mut PinContext, config: &PinConfig) -> Result<(), Self::Error> {
        let pin = ctx.pin();
        self.calls.push(Call::SetConfig(pin, *config));
        self.check_bound(pin)?;
        if self.fail_config == Some(pin) {
            return Err(MockError::ConfigRejected(pin));
        }
        Ok(())
    }

    fn set_state(&mut self, ctx: &PinContext, level: Level) -> Result<(), Self::Error> {
        let pin = ctx.pin();
        self.calls.push(Call::SetState(pin, level));
        self.check_bound(pin)?;
        self.levels.insert(pin, level);
        Ok(())
    }

    fn get_state(&mut self, ctx: &PinContext) -> Result<Level, Self::Error> {
        let pin = ctx.pin();
        self.calls.push(Call::GetState(pin));
        self.check_bound(pin)?;
        Ok(self.levels.get(&pin).copied().unwrap_or_default())
    }
}
