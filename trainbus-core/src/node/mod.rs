//! Node message modules
//!
//! A [`Network`] bundles everything one node needs to talk on the bus:
//! the transport, the node's receive filter, its halt input and its fault
//! handler. Every call either succeeds or escalates, so node code reads
//! straight through without error plumbing. The `try_` forms return the
//! fault instead.
//!
//! The role-specific modules ([`master`], [`button`]) wrap a `Network`
//! and add payload accessors and the handshakes they take part in.

pub mod button;
pub mod master;

pub use button::ButtonNode;
pub use master::Master;

use trainbus_hal::{OutputPin, Uart};
use trainbus_protocol::{Frame, NodeId};

use crate::bus::{Activity, BusTransport, Dispatcher};
use crate::config::NodeConfig;
use crate::fault::{Escalate, Fault, HaltCheck, HaltMonitor};
use crate::handshake::FrameLink;

/// One node's bus connection
pub struct Network<U, T, A, H, E> {
    transport: BusTransport<U, T, A>,
    dispatcher: Dispatcher<'static>,
    halt: H,
    escalation: E,
    config: NodeConfig,
}

impl<U, T, A, H, E> Network<U, T, A, H, E>
where
    U: Uart,
    T: OutputPin,
    A: Activity,
    H: HaltMonitor,
    E: Escalate,
{
    /// Receive filter chosen from `config.node`
    pub fn new(transport: BusTransport<U, T, A>, halt: H, escalation: E, config: NodeConfig) -> Self {
        Self {
            transport,
            dispatcher: Dispatcher::for_node(config.node),
            halt,
            escalation,
            config,
        }
    }

    /// Replace the default receive filter
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher<'static>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn node(&self) -> NodeId {
        self.config.node
    }

    pub fn transport(&self) -> &BusTransport<U, T, A> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut BusTransport<U, T, A> {
        &mut self.transport
    }

    /// Open the bus and start listening
    pub fn initialize(&mut self) {
        let result = self.transport.initialize();
        self.settle(result);
        info!("{} online", self.config.node.name());
    }

    /// Receive one frame and keep it only if this node wants it
    ///
    /// A frame this node is not interested in is still taken off the
    /// queue. `out` is only written when `Ok(true)` is returned.
    pub fn try_receive(&mut self, out: &mut Frame) -> Result<bool, Fault> {
        let mut incoming = Frame::zeroed();
        if !self.transport.try_receive(&mut incoming)? {
            return Ok(false);
        }
        self.dispatcher.accept(&incoming, out)
    }

    pub fn receive(&mut self, out: &mut Frame) -> bool {
        let result = self.try_receive(out);
        self.settle(result)
    }

    pub fn try_send(&mut self, frame: &mut Frame) -> Result<(), Fault> {
        self.transport.try_send(frame)
    }

    /// Seal and transmit a frame
    pub fn send(&mut self, frame: &mut Frame) {
        let result = self.try_send(frame);
        self.settle(result)
    }

    /// Halt the node if the emergency line is held low
    pub fn supervise_halt(&mut self) {
        if self.halt.check() == HaltCheck::Asserted {
            self.fail(Fault::EmergencyHalt);
        }
    }

    /// Enter the fault path. Never returns.
    pub fn fail(&mut self, fault: Fault) -> ! {
        error!("{} halting", self.config.node.name());
        self.escalation.escalate(fault)
    }
}

impl<U, T, A, H, E> Escalate for Network<U, T, A, H, E>
where
    U: Uart,
    T: OutputPin,
    A: Activity,
    H: HaltMonitor,
    E: Escalate,
{
    fn escalate(&mut self, fault: Fault) -> ! {
        self.fail(fault)
    }
}

impl<U, T, A, H, E> FrameLink for Network<U, T, A, H, E>
where
    U: Uart,
    T: OutputPin,
    A: Activity,
    H: HaltMonitor,
    E: Escalate,
{
    fn poll_frame(&mut self, out: &mut Frame) -> Result<bool, Fault> {
        self.try_receive(out)
    }

    fn send_frame(&mut self, frame: &mut Frame) -> Result<(), Fault> {
        self.try_send(frame)
    }

    fn check_halt(&mut self) -> HaltCheck {
        self.halt.check()
    }
}

#[cfg(test)]
pub(crate) mod sim {
    //! Whole nodes on the simulated bus

    use super::*;
    use crate::bus::NoActivity;
    use crate::fault::NoHaltLine;
    use crate::testing::{PanicEscalation, SimBus, SimLine, SimUart};

    pub type SimNetwork<H = NoHaltLine, E = PanicEscalation> = Network<SimUart, SimLine, NoActivity, H, E>;

    pub fn network(bus: &SimBus, config: NodeConfig) -> SimNetwork {
        network_with(bus, config, NoHaltLine, PanicEscalation)
    }

    pub fn network_with<H: HaltMonitor, E: Escalate>(
        bus: &SimBus,
        config: NodeConfig,
        halt: H,
        escalation: E,
    ) -> SimNetwork<H, E> {
        let transport = BusTransport::new(bus.port(), SimLine::new(false), &config);
        let mut net = Network::new(transport, halt, escalation, config);
        net.initialize();
        net
    }
}
