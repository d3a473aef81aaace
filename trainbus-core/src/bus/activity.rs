//! Bus activity indicators

use trainbus_hal::OutputPin;

/// Hook called around every receive and transmit
pub trait Activity {
    /// A complete frame is being drained from the receive queue
    fn receiving(&mut self, active: bool);

    /// A frame is on its way out
    fn transmitting(&mut self, active: bool);
}

/// No indicator LEDs fitted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActivity;

impl Activity for NoActivity {
    fn receiving(&mut self, _active: bool) {}

    fn transmitting(&mut self, _active: bool) {}
}

/// A receive LED and a transmit LED, both active high
pub struct ActivityLeds<R, T> {
    rx: R,
    tx: T,
}

impl<R: OutputPin, T: OutputPin> ActivityLeds<R, T> {
    pub fn new(mut rx: R, mut tx: T) -> Self {
        rx.set_low();
        tx.set_low();
        Self { rx, tx }
    }
}

impl<R: OutputPin, T: OutputPin> Activity for ActivityLeds<R, T> {
    fn receiving(&mut self, active: bool) {
        self.rx.set_level(active.into());
    }

    fn transmitting(&mut self, active: bool) {
        self.tx.set_level(active.into());
    }
}
