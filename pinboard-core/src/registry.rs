//! Resource registry and initialization sequencer
//!
//! The [`Registry`] owns the identity and configuration tables, one
//! runtime context per resource, and the pin driver. Construction
//! populates the tables and creates every context in its neutral
//! `Declared` state before any hardware is touched; [`Registry::initialize_all`]
//! then binds and configures the resources in ascending id order, stopping
//! at the first failure.

use core::fmt;

use pinboard_hal::gpio::{Level, PinConfig, PinContext, PinDriver, PinId, ResourceState};

use crate::handle::PinHandle;
use crate::resource::ResourceId;
use crate::table::{Declaration, DeclareError, ResourceTables};

/// Raw id outside `0..COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LookupError {
    NotFound(usize),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound(raw) => write!(f, "no resource with id {}", raw),
        }
    }
}

/// Sequencer failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError<R, E> {
    /// Driver rejected binding the context to its pin
    Bind { resource: R, cause: E },
    /// Driver rejected the electrical configuration
    Configure { resource: R, cause: E },
    /// The sequencer already ran on this registry
    AlreadyRun,
}

impl<R: Copy, E> InitError<R, E> {
    /// Resource the failure is attributed to
    pub fn resource(&self) -> Option<R> {
        match self {
            InitError::Bind { resource, .. } | InitError::Configure { resource, .. } => {
                Some(*resource)
            }
            InitError::AlreadyRun => None,
        }
    }

    /// Driver error, unchanged
    pub fn cause(&self) -> Option<&E> {
        match self {
            InitError::Bind { cause, .. } | InitError::Configure { cause, .. } => Some(cause),
            InitError::AlreadyRun => None,
        }
    }
}

impl<R: ResourceId, E: fmt::Display> fmt::Display for InitError<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Bind { resource, cause } => {
                write!(f, "{}: bind failed: {}", resource.name(), cause)
            }
            InitError::Configure { resource, cause } => {
                write!(f, "{}: configure failed: {}", resource.name(), cause)
            }
            InitError::AlreadyRun => f.write_str("board already initialized"),
        }
    }
}

/// Failure using a resource after bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessError<E> {
    /// Context has not reached the state the operation needs
    NotReady(ResourceState),
    /// Driver error, unchanged
    Driver(E),
}

impl<E: fmt::Display> fmt::Display for AccessError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::NotReady(state) => write!(f, "resource not ready ({:?})", state),
            AccessError::Driver(cause) => write!(f, "driver error: {}", cause),
        }
    }
}

/// Logical-to-physical resource registry
pub struct Registry<R, D, const N: usize> {
    driver: D,
    tables: ResourceTables<R, N>,
    contexts: [PinContext; N],
    states: [ResourceState; N],
    sequenced: bool,
}

impl<R: ResourceId, D: PinDriver, const N: usize> Registry<R, D, N> {
    /// Populate the tables and create every context shell
    ///
    /// No driver call is made here.
    pub fn new(driver: D, declarations: &[Declaration<R>]) -> Result<Self, DeclareError<R>> {
        let tables = ResourceTables::from_declarations(declarations)?;
        let identities = tables.identities();
        let contexts = core::array::from_fn(|index| PinContext::new(identities[index]));

        debug!("registry: {} resources declared", N);

        Ok(Self {
            driver,
            tables,
            contexts,
            states: [ResourceState::Declared; N],
            sequenced: false,
        })
    }

    /// Bind and configure every resource in ascending id order
    ///
    /// Stops at the first driver error and reports it with the resource it
    /// came from. Resources before the failing one stay configured and
    /// usable; resources after it are never passed to the driver. Runs
    /// once per registry.
    pub fn initialize_all(&mut self) -> Result<(), InitError<R, D::Error>> {
        if self.sequenced {
            warn!("registry: initialize_all called twice");
            return Err(InitError::AlreadyRun);
        }
        self.sequenced = true;

        for index in 0..N {
            let Some(id) = R::from_index(index) else {
                continue;
            };
            let ctx = &mut self.contexts[index];

            trace!("registry: binding {=str}", id.name());
            if let Err(cause) = self.driver.init(ctx) {
                error!("registry: bind failed for {=str}", id.name());
                return Err(InitError::Bind { resource: id, cause });
            }
            self.states[index] = ResourceState::ContextBound;

            let config = self.tables.config(id);
            if let Err(cause) = self.driver.set_config(ctx, config) {
                error!("registry: configure failed for {=str}", id.name());
                return Err(InitError::Configure { resource: id, cause });
            }
            self.states[index] = ResourceState::Configured;
        }

        info!("registry: {} resources ready", N);
        Ok(())
    }

    /// Context of a resource
    pub fn context(&self, id: R) -> &PinContext {
        &self.contexts[id.index()]
    }

    /// Context of a resource, mutable (callback binding and the like)
    ///
    /// The lifecycle state lives in the registry, so nothing done through
    /// this reference makes a resource ready for state I/O.
    pub fn context_mut(&mut self, id: R) -> &mut PinContext {
        &mut self.contexts[id.index()]
    }

    /// Context for a raw id
    ///
    /// Returns [`LookupError::NotFound`] for anything outside `0..COUNT`,
    /// never a default context.
    pub fn context_for(&self, raw: usize) -> Result<&PinContext, LookupError> {
        let id = R::from_index(raw).ok_or(LookupError::NotFound(raw))?;
        Ok(self.context(id))
    }

    /// Lifecycle state of a resource
    pub fn state(&self, id: R) -> ResourceState {
        self.states[id.index()]
    }

    /// Lifecycle state for a raw id
    pub fn state_for(&self, raw: usize) -> Result<ResourceState, LookupError> {
        let id = R::from_index(raw).ok_or(LookupError::NotFound(raw))?;
        Ok(self.state(id))
    }

    /// Check that every resource is configured
    pub fn is_ready(&self) -> bool {
        self.states.iter().all(|state| state.is_configured())
    }

    /// Declared physical pin of a resource
    pub fn identity(&self, id: R) -> PinId {
        self.tables.identity(id)
    }

    /// Declared electrical configuration of a resource
    pub fn config(&self, id: R) -> &PinConfig {
        self.tables.config(id)
    }

    pub fn tables(&self) -> &ResourceTables<R, N> {
        &self.tables
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Apply the declared configuration again
    ///
    /// The context must already be bound; binding is never repeated.
    pub fn reapply_config(&mut self, id: R) -> Result<(), AccessError<D::Error>> {
        let index = id.index();
        let state = &mut self.states[index];
        if *state < ResourceState::ContextBound {
            return Err(AccessError::NotReady(*state));
        }
        self.driver
            .set_config(&mut self.contexts[index], self.tables.config(id))
            .map_err(AccessError::Driver)?;
        *state = ResourceState::Configured;
        Ok(())
    }

    /// Drive a configured resource to a level
    pub fn set_level(&mut self, id: R, level: Level) -> Result<(), AccessError<D::Error>> {
        let index = self.ready(id)?;
        self.driver.set_state(&self.contexts[index], level).map_err(AccessError::Driver)
    }

    /// Read the level of a configured resource
    pub fn level(&mut self, id: R) -> Result<Level, AccessError<D::Error>> {
        let index = self.ready(id)?;
        self.driver.get_state(&self.contexts[index]).map_err(AccessError::Driver)
    }

    /// Invert a configured output, returning the new level
    pub fn toggle(&mut self, id: R) -> Result<Level, AccessError<D::Error>> {
        let next = !self.level(id)?;
        self.set_level(id, next)?;
        Ok(next)
    }

    /// Borrow a configured resource as an `embedded-hal` pin
    pub fn pin(&mut self, id: R) -> Result<PinHandle<'_, D>, AccessError<D::Error>> {
        let index = self.ready(id)?;
        Ok(PinHandle::new(&mut self.driver, &self.contexts[index]))
    }

    fn ready(&self, id: R) -> Result<usize, AccessError<D::Error>> {
        let state = self.state(id);
        if state.is_configured() {
            Ok(id.index())
        } else {
            Err(AccessError::NotReady(state))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::blue_pill::{self, BluePillPin, BluePillRegistry, DECLARATIONS, PIN_COUNT};
    use crate::mock::{Call, MockDriver, MockError};
    use pinboard_hal::gpio::{InterruptTrigger, Port};
    use proptest::prelude::*;

    fn registry(driver: MockDriver) -> BluePillRegistry<MockDriver> {
        blue_pill::registry(driver).unwrap()
    }

    fn pin_of(id: BluePillPin) -> PinId {
        DECLARATIONS[id.index()].pin
    }

    #[test]
    fn test_new_makes_no_driver_calls() {
        let reg = registry(MockDriver::new());
        assert!(reg.driver().calls.is_empty());
        for &id in BluePillPin::ALL {
            let ctx = reg.context(id);
            assert_eq!(reg.state(id), ResourceState::Declared);
            assert_eq!(ctx.pin(), pin_of(id));
            assert_eq!(ctx.trigger(), InterruptTrigger::None);
            assert!(ctx.callback().is_none());
        }
        assert!(!reg.is_ready());
    }

    #[test]
    fn test_all_resources_ready() {
        let mut reg = registry(MockDriver::new());
        assert_eq!(reg.initialize_all(), Ok(()));
        assert!(reg.is_ready());

        for &id in BluePillPin::ALL {
            let ctx = reg.context_for(id.index()).unwrap();
            assert_eq!(ctx.pin(), reg.identity(id));
            assert_eq!(reg.state_for(id.index()), Ok(ResourceState::Configured));
        }

        // Every context is its own, bound to its own pin
        for (i, &a) in BluePillPin::ALL.iter().enumerate() {
            for &b in &BluePillPin::ALL[i + 1..] {
                assert!(!core::ptr::eq(reg.context(a), reg.context(b)));
                assert_ne!(reg.context(a).pin(), reg.context(b).pin());
            }
        }
        assert_eq!(reg.context_for(PIN_COUNT).unwrap_err(), LookupError::NotFound(4));
    }

    #[test]
    fn test_bind_then_configure_in_order() {
        let mut reg = registry(MockDriver::new());
        reg.initialize_all().unwrap();

        let calls = &reg.driver().calls;
        assert_eq!(calls.len(), 2 * PIN_COUNT);
        for (i, decl) in DECLARATIONS.iter().enumerate() {
            assert_eq!(calls[2 * i], Call::Init(decl.pin));
            assert_eq!(calls[2 * i + 1], Call::SetConfig(decl.pin, decl.config));
        }
    }

    #[test]
    fn test_configure_failure_on_third_resource() {
        let failing = pin_of(BluePillPin::DebugOutput);
        let mut reg = registry(MockDriver::new().fail_config_on(failing));

        let err = reg.initialize_all().unwrap_err();
        assert_eq!(
            err,
            InitError::Configure {
                resource: BluePillPin::DebugOutput,
                cause: MockError::ConfigRejected(failing),
            }
        );
        assert_eq!(err.resource(), Some(BluePillPin::DebugOutput));
        assert_eq!(err.resource().map(ResourceId::index), Some(2));

        assert_eq!(reg.state_for(0).unwrap(), ResourceState::Configured);
        assert_eq!(reg.state_for(1).unwrap(), ResourceState::Configured);
        // Bound but never configured
        assert_eq!(reg.state_for(2).unwrap(), ResourceState::ContextBound);
        assert_eq!(reg.state_for(3).unwrap(), ResourceState::Declared);

        let untouched = pin_of(BluePillPin::TestInput);
        assert!(!reg.driver().touched(untouched));
        assert!(!reg.is_ready());
    }

    #[test]
    fn test_bind_failure_stops_sequence() {
        let failing = pin_of(BluePillPin::UserButton);
        let mut reg = registry(MockDriver::new().fail_init_on(failing));

        let err = reg.initialize_all().unwrap_err();
        assert_eq!(err.resource(), Some(BluePillPin::UserButton));
        assert_eq!(err.cause(), Some(&MockError::InitRejected(failing)));
        assert!(matches!(err, InitError::Bind { .. }));

        assert_eq!(reg.state(BluePillPin::LedBuiltin), ResourceState::Configured);
        assert_eq!(reg.state(BluePillPin::UserButton), ResourceState::Declared);
        // Init attempted on the failing pin, nothing after it
        assert_eq!(reg.driver().calls.len(), 3);
    }

    #[test]
    fn test_initialize_twice_is_rejected() {
        let mut reg = registry(MockDriver::new());
        reg.initialize_all().unwrap();
        let calls = reg.driver().calls.len();

        assert_eq!(reg.initialize_all(), Err(InitError::AlreadyRun));
        assert_eq!(reg.driver().calls.len(), calls);
    }

    #[test]
    fn test_earlier_resources_usable_after_failure() {
        let mut reg =
            registry(MockDriver::new().fail_config_on(pin_of(BluePillPin::DebugOutput)));
        assert!(reg.initialize_all().is_err());

        assert!(reg.set_level(BluePillPin::LedBuiltin, Level::Low).is_ok());
        assert_eq!(reg.level(BluePillPin::LedBuiltin), Ok(Level::Low));

        assert_eq!(
            reg.set_level(BluePillPin::TestInput, Level::High),
            Err(AccessError::NotReady(ResourceState::Declared))
        );
        assert_eq!(
            reg.level(BluePillPin::DebugOutput),
            Err(AccessError::NotReady(ResourceState::ContextBound))
        );
        assert!(reg.pin(BluePillPin::TestInput).is_err());
    }

    #[test]
    fn test_toggle() {
        let mut reg = registry(MockDriver::new());
        reg.initialize_all().unwrap();

        reg.set_level(BluePillPin::DebugOutput, Level::Low).unwrap();
        assert_eq!(reg.toggle(BluePillPin::DebugOutput), Ok(Level::High));
        assert_eq!(reg.toggle(BluePillPin::DebugOutput), Ok(Level::Low));
    }

    #[test]
    fn test_reapply_config_skips_init() {
        let mut reg = registry(MockDriver::new());

        assert_eq!(
            reg.reapply_config(BluePillPin::UserButton),
            Err(AccessError::NotReady(ResourceState::Declared))
        );

        reg.initialize_all().unwrap();
        let before = reg.driver().calls.len();
        reg.reapply_config(BluePillPin::UserButton).unwrap();

        let calls = &reg.driver().calls;
        assert_eq!(calls.len(), before + 1);
        let pin = pin_of(BluePillPin::UserButton);
        assert_eq!(
            calls[before],
            Call::SetConfig(pin, *reg.config(BluePillPin::UserButton))
        );
        assert_eq!(reg.state(BluePillPin::UserButton), ResourceState::Configured);
    }

    #[test]
    fn test_reapply_config_after_failed_configure() {
        let failing = pin_of(BluePillPin::DebugOutput);
        let mut reg = registry(MockDriver::new().fail_config_on(failing));
        assert!(reg.initialize_all().is_err());

        // Driver still rejects it; state stays bound
        assert_eq!(
            reg.reapply_config(BluePillPin::DebugOutput),
            Err(AccessError::Driver(MockError::ConfigRejected(failing)))
        );
        assert_eq!(reg.state(BluePillPin::DebugOutput), ResourceState::ContextBound);
    }

    fn noop(_pin: PinId, _user_data: usize) {}

    #[test]
    fn test_callback_rebinding_through_registry() {
        let mut reg = registry(MockDriver::new());
        reg.initialize_all().unwrap();

        let ctx = reg.context_mut(BluePillPin::UserButton);
        ctx.bind_callback(InterruptTrigger::Falling, noop, 7);
        assert!(ctx.enable_interrupt());

        let ctx = reg.context(BluePillPin::UserButton);
        assert_eq!(ctx.trigger(), InterruptTrigger::Falling);
        assert_eq!(ctx.callback().map(|(_, data)| data), Some(7));
        assert_eq!(ctx.pin(), PinId::new(Port::A, 0));
        assert_eq!(reg.state(BluePillPin::UserButton), ResourceState::Configured);
    }

    #[test]
    fn test_context_mut_cannot_make_resource_ready() {
        let mut reg = registry(MockDriver::new());

        // Callback wiring on a never-bound resource
        let ctx = reg.context_mut(BluePillPin::TestInput);
        ctx.bind_callback(InterruptTrigger::Both, noop, 1);
        assert!(ctx.enable_interrupt());

        assert_eq!(reg.state(BluePillPin::TestInput), ResourceState::Declared);
        assert_eq!(
            reg.set_level(BluePillPin::TestInput, Level::High),
            Err(AccessError::NotReady(ResourceState::Declared))
        );
        assert!(matches!(
            reg.pin(BluePillPin::TestInput),
            Err(AccessError::NotReady(ResourceState::Declared))
        ));
        assert!(reg.driver().calls.is_empty());
    }

    #[test]
    fn test_context_before_initialize() {
        let reg = registry(MockDriver::new());
        // Found, but not configured
        assert!(reg.context_for(0).is_ok());
        assert_eq!(reg.state_for(0), Ok(ResourceState::Declared));
        assert_eq!(reg.state_for(PIN_COUNT), Err(LookupError::NotFound(PIN_COUNT)));
    }

    proptest! {
        #[test]
        fn out_of_range_ids_are_not_found(raw in PIN_COUNT..usize::MAX) {
            let mut reg = registry(MockDriver::new());
            reg.initialize_all().unwrap();
            prop_assert_eq!(reg.context_for(raw).unwrap_err(), LookupError::NotFound(raw));
        }

        #[test]
        fn bind_failure_leaves_tail_untouched(k in 0..PIN_COUNT) {
            let failing = DECLARATIONS[k].pin;
            let mut reg = registry(MockDriver::new().fail_init_on(failing));

            let err = reg.initialize_all().unwrap_err();
            prop_assert_eq!(err.resource().map(ResourceId::index), Some(k));

            for i in 0..PIN_COUNT {
                let state = reg.state_for(i).unwrap();
                if i < k {
                    prop_assert_eq!(state, ResourceState::Configured);
                } else {
                    prop_assert_eq!(state, ResourceState::Declared);
                }
                if i > k {
                    prop_assert!(!reg.driver().touched(DECLARATIONS[i].pin));
                }
            }
        }

        #[test]
        fn configure_failure_leaves_tail_untouched(k in 0..PIN_COUNT) {
            let failing = DECLARATIONS[k].pin;
            let mut reg = registry(MockDriver::new().fail_config_on(failing));

            let err = reg.initialize_all().unwrap_err();
            let is_configure = matches!(err, InitError::Configure { .. });
            prop_assert!(is_configure);
            prop_assert_eq!(err.resource().map(ResourceId::index), Some(k));
            prop_assert_eq!(reg.state_for(k).unwrap(), ResourceState::ContextBound);
            for i in (k + 1)..PIN_COUNT {
                prop_assert!(!reg.driver().touched(DECLARATIONS[i].pin));
            }
        }
    }
}
