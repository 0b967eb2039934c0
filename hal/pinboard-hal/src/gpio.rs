//! GPIO pin abstractions
//!
//! Provides the physical pin identity, the electrical configuration, the
//! runtime context a driver operates on, and the [`PinDriver`] trait that
//! chip-specific HALs implement.

use core::fmt;
use core::ops::Not;
use core::str::FromStr;

/// Number of pins in one GPIO port
pub const PINS_PER_PORT: u8 = 16;

/// Number of GPIO ports addressable by [`Port`]
pub const PORT_COUNT: u8 = 7;

/// GPIO port (pin group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
}

impl Port {
    /// Get the port as a zero-based index (A = 0)
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Create a port from a zero-based index
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Port::A),
            1 => Some(Port::B),
            2 => Some(Port::C),
            3 => Some(Port::D),
            4 => Some(Port::E),
            5 => Some(Port::F),
            6 => Some(Port::G),
            _ => None,
        }
    }

    /// Port letter as used in pin names ("PC13" -> 'C')
    pub const fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Create a port from its letter
    pub fn from_letter(letter: char) -> Option<Self> {
        if !letter.is_ascii_uppercase() {
            return None;
        }
        Self::from_index(letter as u8 - b'A')
    }
}

/// Physical identity of a pin: port plus pin-within-port index
///
/// Immutable once created. Text form is the conventional `"PC13"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    port: Port,
    pin: u8,
}

impl PinId {
    /// Create a pin identity
    ///
    /// Panics (at compile time when used in a `const`/`static`) if `pin`
    /// is not below [`PINS_PER_PORT`].
    pub const fn new(port: Port, pin: u8) -> Self {
        assert!(pin < PINS_PER_PORT, "pin index out of range");
        Self { port, pin }
    }

    /// Create a pin identity, returning `None` for an out-of-range pin
    pub const fn try_new(port: Port, pin: u8) -> Option<Self> {
        if pin < PINS_PER_PORT {
            Some(Self { port, pin })
        } else {
            None
        }
    }

    /// Create a pin identity from a flat index (`port * 16 + pin`)
    pub const fn from_flat_index(index: usize) -> Option<Self> {
        let port_index = index / PINS_PER_PORT as usize;
        if port_index >= PORT_COUNT as usize {
            return None;
        }
        match Port::from_index(port_index as u8) {
            Some(port) => Some(Self {
                port,
                pin: (index % PINS_PER_PORT as usize) as u8,
            }),
            None => None,
        }
    }

    /// The port this pin belongs to
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Pin index within the port (0-15)
    pub const fn number(&self) -> u8 {
        self.pin
    }

    /// Flat index across all ports (`port * 16 + pin`)
    pub const fn flat_index(&self) -> usize {
        self.port.index() as usize * PINS_PER_PORT as usize + self.pin as usize
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.port.letter(), self.pin)
    }
}

/// Error parsing a pin name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinParseError {
    /// Not of the form `P<port><pin>`
    Format,
    /// Port letter outside A-G
    InvalidPort,
    /// Pin index missing, non-numeric or above 15
    InvalidPin,
}

impl fmt::Display for PinParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinParseError::Format => f.write_str("expected a pin name like \"PA0\""),
            PinParseError::InvalidPort => f.write_str("unknown port letter"),
            PinParseError::InvalidPin => f.write_str("pin index must be 0-15"),
        }
    }
}

/// Parse a pin name
///
/// Supports formats:
/// - "PA0" -> Port A, Pin 0
/// - " pc13 " -> Port C, Pin 13 (case and surrounding whitespace ignored)
impl FromStr for PinId {
    type Err = PinParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();

        match chars.next() {
            Some('P') | Some('p') => {}
            _ => return Err(PinParseError::Format),
        }

        let port = chars.next().ok_or(PinParseError::Format)?;
        let port = Port::from_letter(port.to_ascii_uppercase()).ok_or(PinParseError::InvalidPort)?;

        let pin_str = chars.as_str();
        if pin_str.is_empty() || !pin_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinParseError::InvalidPin);
        }
        let pin: u8 = pin_str.parse().map_err(|_| PinParseError::InvalidPin)?;

        PinId::try_new(port, pin).ok_or(PinParseError::InvalidPin)
    }
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    /// Check if this is the high level
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Input,
    Output,
}

/// Internal pull resistor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PullMode {
    #[default]
    None,
    Up,
    Down,
}

/// Output slew rate (STM32F1 naming: 2 / 10 / 50 MHz)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputSpeed {
    #[default]
    Low,
    Medium,
    High,
}

/// STM32F1-specific pin options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stm32f1Options {
    /// Output slew rate (ignored for inputs)
    pub speed: OutputSpeed,
    /// Drive the output open-drain instead of push-pull
    pub open_drain: bool,
    /// Level latched before the pin is switched to output
    pub initial_level: Level,
}

impl Stm32f1Options {
    /// Low speed, push-pull, starts low
    pub const DEFAULT: Self = Self {
        speed: OutputSpeed::Low,
        open_drain: false,
        initial_level: Level::Low,
    };

    /// Same options with a different initial output level
    pub const fn with_initial_level(self, initial_level: Level) -> Self {
        Self {
            initial_level,
            ..self
        }
    }
}

impl Default for Stm32f1Options {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Implementation-specific options, keyed by driver family
///
/// A driver rejects a payload for a family it does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum ImplConfig {
    /// No driver-specific options; drivers use their defaults
    #[default]
    Generic,
    /// Options for the STM32F1 driver
    Stm32f1(Stm32f1Options),
}

/// Electrical configuration of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// Input or output
    pub direction: Direction,
    /// Internal pull resistor
    pub pull: PullMode,
    /// Driver-family options
    pub options: ImplConfig,
}

impl PinConfig {
    /// Input with the given pull mode
    pub const fn input(pull: PullMode) -> Self {
        Self {
            direction: Direction::Input,
            pull,
            options: ImplConfig::Generic,
        }
    }

    /// Output without pull resistor
    pub const fn output() -> Self {
        Self {
            direction: Direction::Output,
            pull: PullMode::None,
            options: ImplConfig::Generic,
        }
    }

    /// Same configuration with a driver-family options payload
    pub const fn with_options(self, options: ImplConfig) -> Self {
        Self { options, ..self }
    }
}

/// Edge(s) that raise a pin interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptTrigger {
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

impl InterruptTrigger {
    /// Check if a `from -> to` level change fires this trigger
    pub fn matches(self, from: Level, to: Level) -> bool {
        match (self, from, to) {
            (InterruptTrigger::Rising, Level::Low, Level::High) => true,
            (InterruptTrigger::Falling, Level::High, Level::Low) => true,
            (InterruptTrigger::Both, a, b) => a != b,
            _ => false,
        }
    }
}

/// Edge callback: receives the pin that fired and the bound user data
pub type PinCallback = fn(pin: PinId, user_data: usize);

/// Lifecycle of a resource's runtime context
///
/// Transitions only move forward: `Declared -> ContextBound -> Configured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResourceState {
    /// Shell created, no driver call made yet
    #[default]
    Declared,
    /// Driver has bound the context to its pin
    ContextBound,
    /// Electrical configuration applied; ready for state I/O
    Configured,
}

impl ResourceState {
    /// Check if the resource is ready for state I/O
    pub fn is_configured(self) -> bool {
        self == ResourceState::Configured
    }

    /// Move the lifecycle state forward
    ///
    /// Re-entering the current state is allowed (reconfiguration keeps a
    /// `Configured` resource `Configured`).
    pub fn advance(&mut self, to: ResourceState) -> Result<(), TransitionError> {
        if to < *self {
            return Err(TransitionError { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

/// Attempt to move a resource backwards in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransitionError {
    pub from: ResourceState,
    pub to: ResourceState,
}

/// Runtime handle for one resource
///
/// Holds the identity it was created against and the interrupt/callback
/// bookkeeping. Drivers mutate it in place; nothing destroys it while its
/// owner lives. The lifecycle state is tracked by the owner, not here.
#[derive(Debug, Clone, Copy)]
pub struct PinContext {
    pin: PinId,
    trigger: InterruptTrigger,
    interrupt_configured: bool,
    interrupt_enabled: bool,
    callback: Option<(PinCallback, usize)>,
}

impl PinContext {
    /// Neutral shell: no trigger, no callback
    pub const fn new(pin: PinId) -> Self {
        Self {
            pin,
            trigger: InterruptTrigger::None,
            interrupt_configured: false,
            interrupt_enabled: false,
            callback: None,
        }
    }

    /// The physical pin this context belongs to
    pub const fn pin(&self) -> PinId {
        self.pin
    }

    pub const fn trigger(&self) -> InterruptTrigger {
        self.trigger
    }

    pub const fn interrupt_configured(&self) -> bool {
        self.interrupt_configured
    }

    pub const fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    /// Bound callback and user data, if any
    pub fn callback(&self) -> Option<(PinCallback, usize)> {
        self.callback
    }

    /// Bind (or rebind) an edge callback
    ///
    /// The interrupt starts disabled; call [`enable_interrupt`](Self::enable_interrupt).
    pub fn bind_callback(
        &mut self,
        trigger: InterruptTrigger,
        callback: PinCallback,
        user_data: usize,
    ) {
        self.trigger = trigger;
        self.callback = Some((callback, user_data));
        self.interrupt_configured = trigger != InterruptTrigger::None;
        self.interrupt_enabled = false;
    }

    /// Remove the callback and return to the neutral interrupt state
    pub fn clear_callback(&mut self) {
        self.trigger = InterruptTrigger::None;
        self.callback = None;
        self.interrupt_configured = false;
        self.interrupt_enabled = false;
    }

    /// Enable the configured interrupt
    ///
    /// Returns `false` (and stays disabled) when no interrupt is configured.
    pub fn enable_interrupt(&mut self) -> bool {
        self.interrupt_enabled = self.interrupt_configured;
        self.interrupt_enabled
    }

    pub fn disable_interrupt(&mut self) {
        self.interrupt_enabled = false;
    }

    /// Dispatch a level change to the bound callback
    ///
    /// For drivers that deliver edges. Returns `true` if the callback ran.
    pub fn notify(&self, from: Level, to: Level) -> bool {
        if !self.interrupt_enabled || !self.trigger.matches(from, to) {
            return false;
        }
        match self.callback {
            Some((callback, user_data)) => {
                callback(self.pin, user_data);
                true
            }
            None => false,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinContext {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "PinContext[{}, trigger={}, irq_enabled={}, callback={}]",
            self.pin,
            self.trigger,
            self.interrupt_enabled,
            self.callback.is_some()
        );
    }
}

/// Pin driver
///
/// Implemented by chip-specific HALs. The registry calls `init` at most
/// once per context per sequencer run, then `set_config`; application code
/// reaches `set_state`/`get_state` only through configured contexts.
pub trait PinDriver {
    /// Error type for driver operations
    type Error;

    /// Bind a runtime context to its physical pin
    fn init(&mut self, ctx: &mut PinContext) -> Result<(), Self::Error>;

    /// Apply direction, pull mode and options to a bound context
    fn set_config(&mut self, ctx: &mut PinContext, config: &PinConfig) -> Result<(), Self::Error>;

    /// Drive an output to the given level
    fn set_state(&mut self, ctx: &PinContext, level: Level) -> Result<(), Self::Error>;

    /// Read the current level of a pin
    fn get_state(&mut self, ctx: &PinContext) -> Result<Level, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parse_pin_name() {
        assert_eq!("PA0".parse::<PinId>(), Ok(PinId::new(Port::A, 0)));
        assert_eq!("PC13".parse::<PinId>(), Ok(PinId::new(Port::C, 13)));
        assert_eq!(" pb7 ".parse::<PinId>(), Ok(PinId::new(Port::B, 7)));

        // Invalid
        assert_eq!("PA16".parse::<PinId>(), Err(PinParseError::InvalidPin));
        assert_eq!("PA".parse::<PinId>(), Err(PinParseError::InvalidPin));
        assert_eq!("PA+1".parse::<PinId>(), Err(PinParseError::InvalidPin));
        assert_eq!("PZ1".parse::<PinId>(), Err(PinParseError::InvalidPort));
        assert_eq!("gpio11".parse::<PinId>(), Err(PinParseError::Format));
        assert_eq!("".parse::<PinId>(), Err(PinParseError::Format));
    }

    #[test]
    fn test_pin_flat_index() {
        let pin = PinId::new(Port::C, 13);
        assert_eq!(pin.flat_index(), 45);
        assert_eq!(PinId::from_flat_index(45), Some(pin));
        assert_eq!(PinId::from_flat_index(0), Some(PinId::new(Port::A, 0)));
        assert_eq!(PinId::from_flat_index(16 * 7), None);
        assert_eq!(PinId::try_new(Port::A, 16), None);
    }

    #[test]
    fn test_level_ops() {
        assert_eq!(!Level::Low, Level::High);
        assert_eq!(Level::from(true), Level::High);
        assert!(!Level::Low.is_high());
    }

    #[test]
    fn test_trigger_matches() {
        assert!(InterruptTrigger::Rising.matches(Level::Low, Level::High));
        assert!(!InterruptTrigger::Rising.matches(Level::High, Level::Low));
        assert!(InterruptTrigger::Falling.matches(Level::High, Level::Low));
        assert!(InterruptTrigger::Both.matches(Level::High, Level::Low));
        assert!(!InterruptTrigger::Both.matches(Level::High, Level::High));
        assert!(!InterruptTrigger::None.matches(Level::Low, Level::High));
    }

    #[test]
    fn test_context_starts_neutral() {
        let ctx = PinContext::new(PinId::new(Port::A, 0));
        assert_eq!(ctx.pin(), PinId::new(Port::A, 0));
        assert_eq!(ctx.trigger(), InterruptTrigger::None);
        assert!(!ctx.interrupt_configured());
        assert!(!ctx.interrupt_enabled());
        assert!(ctx.callback().is_none());
    }

    #[test]
    fn test_state_only_moves_forward() {
        let mut state = ResourceState::default();
        assert_eq!(state, ResourceState::Declared);
        assert!(state.advance(ResourceState::ContextBound).is_ok());
        assert!(!state.is_configured());
        assert!(state.advance(ResourceState::Configured).is_ok());
        assert!(state.advance(ResourceState::Configured).is_ok());

        let err = state.advance(ResourceState::Declared).unwrap_err();
        assert_eq!(err.from, ResourceState::Configured);
        assert_eq!(err.to, ResourceState::Declared);
        assert!(state.is_configured());
    }

    static FIRED: AtomicUsize = AtomicUsize::new(0);

    fn record(_pin: PinId, user_data: usize) {
        FIRED.fetch_add(user_data, Ordering::SeqCst);
    }

    #[test]
    fn test_callback_dispatch() {
        let mut ctx = PinContext::new(PinId::new(Port::A, 0));

        // Nothing bound
        assert!(!ctx.enable_interrupt());
        assert!(!ctx.notify(Level::Low, Level::High));

        ctx.bind_callback(InterruptTrigger::Falling, record, 5);
        assert!(ctx.interrupt_configured());
        assert!(!ctx.interrupt_enabled());

        // Disabled interrupts never fire
        assert!(!ctx.notify(Level::High, Level::Low));

        assert!(ctx.enable_interrupt());
        assert!(!ctx.notify(Level::Low, Level::High));
        assert!(ctx.notify(Level::High, Level::Low));
        assert_eq!(FIRED.load(Ordering::SeqCst), 5);

        ctx.clear_callback();
        assert!(!ctx.interrupt_configured());
        assert!(!ctx.notify(Level::High, Level::Low));
        assert_eq!(FIRED.load(Ordering::SeqCst), 5);
    }
}
