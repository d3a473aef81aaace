//! Control-panel button node message module
//!
//! The button node listens for mode broadcasts and reports turnout button
//! presses. A press cannot simply be sent: the node asks for a turn on its
//! request line and waits for the master to grant it.

use trainbus_hal::OutputPin;
use trainbus_protocol::messages::{button_in_range, BusMessage, BUTTON_NUM_OFFSET, MSG_BUTTON};
use trainbus_protocol::{Frame, NodeId};

use crate::config::NodeConfig;
use crate::fault::{Escalate, Fault, Violation};
use crate::handshake::{FrameLink, HandshakeState, Requester};

/// The button node
///
/// `R` is this node's outgoing request line to the master.
pub struct ButtonNode<N, R> {
    net: N,
    requester: Requester<R>,
    button_count: u8,
}

impl<N, R> ButtonNode<N, R>
where
    N: FrameLink + Escalate,
    R: OutputPin,
{
    pub fn new(net: N, request_line: R, config: &NodeConfig) -> Self {
        Self {
            net,
            requester: Requester::new(request_line, NodeId::Button, MSG_BUTTON, config.reply_poll_limit),
            button_count: config.button_count,
        }
    }

    pub fn net(&mut self) -> &mut N {
        &mut self.net
    }

    pub fn state(&self) -> HandshakeState {
        self.requester.state()
    }

    /// Receive one frame meant for the button node
    pub fn receive(&mut self, out: &mut Frame) -> bool {
        let result = self.net.poll_frame(out);
        self.net.settle(result)
    }

    pub fn try_begin_turnout_button_press(&mut self, button: u8) -> Result<bool, Fault> {
        if !button_in_range(button, self.button_count) {
            return Err(Violation::ButtonOutOfRange { button }.into());
        }
        let reply = BusMessage::ButtonReply { button }.to_frame()?;
        Ok(self.requester.begin(reply))
    }

    /// Ask the master for a turn to report `button`
    ///
    /// Returns `false` if a previous press is still being reported; the
    /// new press is dropped.
    pub fn begin_turnout_button_press(&mut self, button: u8) -> bool {
        let result = self.try_begin_turnout_button_press(button);
        self.net.settle(result)
    }

    pub fn try_step(&mut self) -> Result<HandshakeState, Fault> {
        self.requester.step(&mut self.net)
    }

    /// Advance the pending report by at most one bus poll
    pub fn step(&mut self) -> HandshakeState {
        let result = self.try_step();
        self.net.settle(result)
    }

    pub fn try_send_turnout_button_press(&mut self, button: u8) -> Result<(), Fault> {
        self.try_begin_turnout_button_press(button)?;
        self.requester.run(&mut self.net)
    }

    /// Report a button press, blocking until the master has it
    pub fn send_turnout_button_press(&mut self, button: u8) {
        let result = self.try_send_turnout_button_press(button);
        self.net.settle(result)
    }

    /// Write a button number into an outgoing reply
    pub fn set_turnout_button_num(frame: &mut Frame, button: u8) {
        frame.set_byte(BUTTON_NUM_OFFSET, button);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::sim::{network, SimNetwork};
    use crate::testing::{SimBus, SimLine};
    use trainbus_protocol::messages::BUTTON_REPLY_LEN;

    type SimButton = ButtonNode<SimNetwork, SimLine>;

    fn setup() -> (SimBus, SimButton, SimNetwork, SimLine) {
        let bus = SimBus::new();
        let line = SimLine::new(false);
        let config = NodeConfig::new(NodeId::Button);
        let button = ButtonNode::new(network(&bus, config), line.clone(), &config);
        let master = network(&bus, NodeConfig::master());
        (bus, button, master, line)
    }

    #[test]
    fn test_blocking_send_with_grant_waiting() {
        let (_bus, mut button, mut master, line) = setup();
        master.send(&mut Frame::new(4, 1, MSG_BUTTON, &[]).unwrap());

        button.send_turnout_button_press(17);
        assert!(line.get());
        assert_eq!(button.state(), HandshakeState::Idle);

        let mut out = Frame::zeroed();
        assert!(master.receive(&mut out));
        assert_eq!(out.length(), BUTTON_REPLY_LEN);
        assert_eq!(out.byte(BUTTON_NUM_OFFSET), 17);
    }

    #[test]
    fn test_begin_asserts_request_line() {
        let (_bus, mut button, _master, line) = setup();
        assert!(line.get());
        assert!(button.begin_turnout_button_press(8));
        assert!(!line.get());
        assert_eq!(button.state(), HandshakeState::RequestAsserted);
        assert!(!button.begin_turnout_button_press(9));
    }

    #[test]
    #[should_panic(expected = "ButtonOutOfRange")]
    fn test_rejects_button_zero() {
        let (_bus, mut button, _master, _line) = setup();
        button.begin_turnout_button_press(0);
    }

    #[test]
    fn test_set_turnout_button_num() {
        let mut frame = BusMessage::ButtonReply { button: 1 }.to_frame().unwrap();
        SimButton::set_turnout_button_num(&mut frame, 32);
        assert_eq!(frame.byte(BUTTON_NUM_OFFSET), 32);
    }
}
