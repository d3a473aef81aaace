//! Shared emergency-halt line
//!
//! Any node may pull the open-collector halt line low to stop the whole
//! layout. Turnout solenoids induce short spikes on it, so a low reading
//! is only believed if it is still low after a debounce delay.

use embedded_hal::delay::DelayNs;
use trainbus_hal::{InputPin, OutputPin};

use crate::config::NodeConfig;
use crate::traits::StatusSink;

/// How long a node holds the halt line low when requesting a stop
pub const EMERGENCY_STOP_HOLD_MS: u32 = 1_000;

/// Outcome of one look at the halt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HaltCheck {
    /// Line is high
    Clear,
    /// Line dipped low but recovered within the debounce window
    Spurious,
    /// Line stayed low: stop everything
    Asserted,
}

/// Something that can be checked for a pending emergency halt
pub trait HaltMonitor {
    fn check(&mut self) -> HaltCheck;
}

impl<T: HaltMonitor + ?Sized> HaltMonitor for &mut T {
    fn check(&mut self) -> HaltCheck {
        T::check(self)
    }
}

/// Debounced halt input
///
/// A dip that recovers within the debounce window is logged and, when a
/// display is attached, shown on it.
pub struct HaltLine<P, D, S = ()> {
    pin: P,
    delay: D,
    debounce_us: u32,
    status: S,
}

impl<P: InputPin, D: DelayNs> HaltLine<P, D> {
    pub fn new(pin: P, delay: D, debounce_us: u32) -> Self {
        Self {
            pin,
            delay,
            debounce_us,
            status: (),
        }
    }

    /// Halt input debounced as `config` says
    pub fn from_config(pin: P, delay: D, config: &NodeConfig) -> Self {
        Self::new(pin, delay, config.halt_debounce_us)
    }
}

impl<P: InputPin, D: DelayNs, S: StatusSink> HaltLine<P, D, S> {
    /// Show false halts on `status`
    pub fn with_status<S2: StatusSink>(self, status: S2) -> HaltLine<P, D, S2> {
        HaltLine {
            pin: self.pin,
            delay: self.delay,
            debounce_us: self.debounce_us,
            status,
        }
    }
}

impl<P: InputPin, D: DelayNs, S: StatusSink> HaltMonitor for HaltLine<P, D, S> {
    fn check(&mut self) -> HaltCheck {
        if self.pin.is_high() {
            return HaltCheck::Clear;
        }

        self.delay.delay_us(self.debounce_us);
        if self.pin.is_low() {
            HaltCheck::Asserted
        } else {
            warn!("False HALT detected.");
            self.status.show(format_args!("False HALT detected."));
            HaltCheck::Spurious
        }
    }
}

/// For nodes without a halt input
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaltLine;

impl HaltMonitor for NoHaltLine {
    fn check(&mut self) -> HaltCheck {
        HaltCheck::Clear
    }
}

/// Pull the halt line low long enough for every node to see it
///
/// The pin is an open-drain output onto the shared line. Other nodes
/// escalate on their next check; the caller usually escalates right after.
pub fn request_emergency_stop(pin: &mut impl OutputPin, delay: &mut impl DelayNs) {
    warn!("requesting emergency stop");
    pin.set_low();
    delay.delay_ms(EMERGENCY_STOP_HOLD_MS);
    pin.set_high();
}
