//! Terminal fault handling on hardware
//!
//! Releases actuators, shows the diagnostic line, then blinks the on-board
//! LED and chirps the piezo forever. The burst length tells the operator
//! which class of fault stopped the node without a display attached.

use embedded_hal::delay::DelayNs;
use trainbus_hal::{NoPin, OutputPin};

use super::halt::request_emergency_stop;
use super::{Escalate, Fault};
use crate::config::{NodeConfig, PulseTiming};
use crate::traits::{ActuatorRelease, StatusSink};

/// Fault handler that owns the indicator outputs
///
/// The piezo is wired active low: driving it low sounds it. `H` is the
/// node's drive onto the shared halt line, if it has one.
pub struct FaultEscalation<L, B, D, R, S, H = NoPin> {
    led: L,
    buzzer: B,
    delay: D,
    release: R,
    status: S,
    timing: PulseTiming,
    halt: Option<H>,
}

impl<L, B, D, R, S> FaultEscalation<L, B, D, R, S>
where
    L: OutputPin,
    B: OutputPin,
    D: DelayNs,
    R: ActuatorRelease,
    S: StatusSink,
{
    /// Take the indicator outputs and park them (LED dark, piezo silent)
    pub fn new(mut led: L, mut buzzer: B, delay: D, release: R, status: S, timing: PulseTiming) -> Self {
        led.set_low();
        buzzer.set_high();
        Self {
            led,
            buzzer,
            delay,
            release,
            status,
            timing,
            halt: None,
        }
    }

    /// Indicator timing taken from `config`
    pub fn from_config(led: L, buzzer: B, delay: D, release: R, status: S, config: &NodeConfig) -> Self {
        Self::new(led, buzzer, delay, release, status, config.pulse)
    }
}

impl<L, B, D, R, S, H> FaultEscalation<L, B, D, R, S, H>
where
    L: OutputPin,
    B: OutputPin,
    D: DelayNs,
    R: ActuatorRelease,
    S: StatusSink,
    H: OutputPin,
{
    /// Pull the shared halt line on every fault, stopping the whole layout
    ///
    /// For nodes that bridge to hardware which cannot see bus faults.
    pub fn with_halt_request<H2: OutputPin>(self, mut halt: H2) -> FaultEscalation<L, B, D, R, S, H2> {
        halt.set_high();
        FaultEscalation {
            led: self.led,
            buzzer: self.buzzer,
            delay: self.delay,
            release: self.release,
            status: self.status,
            timing: self.timing,
            halt: Some(halt),
        }
    }

    /// Release actuators, show the fault and log it. Does not halt.
    ///
    /// With a halt request fitted, the shared line is pulled too, unless
    /// the fault is a halt seen on that line.
    pub fn report(&mut self, fault: Fault) {
        self.release.release();
        if let Some(halt) = self.halt.as_mut() {
            if fault != Fault::EmergencyHalt {
                request_emergency_stop(halt, &mut self.delay);
            }
        }
        self.status.show(format_args!("{}", fault.message()));
        error!("bus fault: {:?}", fault);
    }

    /// One burst of `count` pulses
    pub fn pulse(&mut self, count: u8) {
        for _ in 0..count {
            self.led.set_high();
            self.buzzer.set_low();
            self.delay.delay_ms(self.timing.chirp_ms);
            self.buzzer.set_high();
            self.led.set_low();
            self.delay.delay_ms(self.timing.gap_ms);
        }
    }
}

impl<L, B, D, R, S, H> Escalate for FaultEscalation<L, B, D, R, S, H>
where
    L: OutputPin,
    B: OutputPin,
    D: DelayNs,
    R: ActuatorRelease,
    S: StatusSink,
    H: OutputPin,
{
    fn escalate(&mut self, fault: Fault) -> ! {
        self.report(fault);

        match fault.pulse_count() {
            0 => {
                // Halt requested elsewhere: acknowledge once and stay quiet
                self.pulse(1);
                loop {
                    self.delay.delay_ms(self.timing.pause_ms);
                }
            }
            count => loop {
                self.pulse(count);
                self.delay.delay_ms(self.timing.pause_ms);
            },
        }
    }
}
