//! Request-to-send handshake
//!
//! The master owns the bus and normally speaks first. When a peripheral
//! has something to report on its own (a button press, an occupancy
//! change) it pulls its private request line low. The master notices,
//! sends that peripheral a request frame, and only then does the
//! peripheral put its reply on the bus.
//!
//! Both sides are explicit state machines advanced one poll at a time by
//! `step`, so a node's main loop can interleave other work. `run` simply
//! steps until the exchange completes.

pub mod poller;
pub mod requester;

pub use poller::{Poller, PollerState};
pub use requester::{HandshakeState, Requester};

use trainbus_protocol::Frame;

use crate::fault::{Fault, HaltCheck};

/// What the handshake needs from a node's bus connection
pub trait FrameLink {
    /// Receive one frame that passed the node's interest rules
    fn poll_frame(&mut self, out: &mut Frame) -> Result<bool, Fault>;

    /// Seal and send a frame
    fn send_frame(&mut self, frame: &mut Frame) -> Result<(), Fault>;

    /// Look at the emergency-halt line
    fn check_halt(&mut self) -> HaltCheck;
}

impl<T: FrameLink + ?Sized> FrameLink for &mut T {
    fn poll_frame(&mut self, out: &mut Frame) -> Result<bool, Fault> {
        T::poll_frame(self, out)
    }

    fn send_frame(&mut self, frame: &mut Frame) -> Result<(), Fault> {
        T::send_frame(self, frame)
    }

    fn check_halt(&mut self) -> HaltCheck {
        T::check_halt(self)
    }
}

/// Counts empty polls against an optional limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollBudget {
    limit: Option<u32>,
    spent: u32,
}

impl PollBudget {
    pub(crate) const fn new(limit: Option<u32>) -> Self {
        Self { limit, spent: 0 }
    }

    pub(crate) fn reset(&mut self) {
        self.spent = 0;
    }

    /// Record one empty poll
    pub(crate) fn spend(&mut self) -> Result<(), Fault> {
        self.spent = self.spent.saturating_add(1);
        match self.limit {
            Some(limit) if self.spent >= limit => Err(Fault::HandshakeTimeout),
            _ => Ok(()),
        }
    }
}

/// One halt-line check inside an await loop
pub(crate) fn check_halt(link: &mut impl FrameLink) -> Result<(), Fault> {
    match link.check_halt() {
        HaltCheck::Asserted => Err(Fault::EmergencyHalt),
        HaltCheck::Spurious | HaltCheck::Clear => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod sim {
    //! A node-less link on the simulated bus, for driving one side of the
    //! handshake by hand

    use std::vec::Vec;

    use trainbus_hal::UartRx;

    use super::*;
    use crate::bus::{BusTransport, Dispatcher};
    use crate::config::NodeConfig;
    use crate::testing::{SimBus, SimLine, SimUart};
    use trainbus_protocol::NodeId;

    pub struct SimLink {
        pub transport: BusTransport<SimUart, SimLine>,
        pub dispatcher: Dispatcher<'static>,
        pub halt: Vec<HaltCheck>,
        pub polls: u32,
    }

    impl SimLink {
        pub fn new(bus: &SimBus, node: NodeId) -> Self {
            let config = NodeConfig::new(node);
            let mut transport = BusTransport::new(bus.port(), SimLine::new(false), &config);
            transport.initialize().unwrap();
            Self {
                transport,
                dispatcher: Dispatcher::for_node(node),
                halt: Vec::new(),
                polls: 0,
            }
        }

        pub fn pending(&self) -> usize {
            self.transport.uart().available()
        }
    }

    impl FrameLink for SimLink {
        fn poll_frame(&mut self, out: &mut Frame) -> Result<bool, Fault> {
            self.polls += 1;
            let mut incoming = Frame::zeroed();
            if !self.transport.try_receive(&mut incoming)? {
                return Ok(false);
            }
            self.dispatcher.accept(&incoming, out)
        }

        fn send_frame(&mut self, frame: &mut Frame) -> Result<(), Fault> {
            self.transport.try_send(frame)
        }

        fn check_halt(&mut self) -> HaltCheck {
            if self.halt.is_empty() {
                HaltCheck::Clear
            } else {
                self.halt.remove(0)
            }
        }
    }
}
