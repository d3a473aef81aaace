//! Master controller message module
//!
//! The master speaks first on the bus. It broadcasts the layout mode to
//! every node and serves request-to-send handshakes from peripherals that
//! have an event to report. Only the button handshake is handled here;
//! other peripherals follow the same pattern with their own poller.

use trainbus_hal::InputPin;
use trainbus_protocol::messages::{button_in_range, BusMessage, Mode, RunState, BUTTON_NUM_OFFSET, MSG_BUTTON};
use trainbus_protocol::{Frame, NodeId};

use crate::config::NodeConfig;
use crate::fault::{Escalate, Fault, Violation};
use crate::handshake::{FrameLink, Poller};

/// The master node
///
/// `N` is the master's [`Network`](super::Network); `L` is the request
/// line coming in from the button node.
pub struct Master<N, L> {
    net: N,
    buttons: Poller<L>,
    button_count: u8,
}

impl<N, L> Master<N, L>
where
    N: FrameLink + Escalate,
    L: InputPin,
{
    pub fn new(net: N, button_line: L, config: &NodeConfig) -> Self {
        Self {
            net,
            buttons: Poller::new(button_line, NodeId::Button, MSG_BUTTON, config.reply_poll_limit),
            button_count: config.button_count,
        }
    }

    pub fn net(&mut self) -> &mut N {
        &mut self.net
    }

    /// Receive one frame addressed to the master
    ///
    /// Anything on the bus the master does not expect is fatal.
    pub fn receive(&mut self, out: &mut Frame) -> bool {
        let result = self.net.poll_frame(out);
        self.net.settle(result)
    }

    pub fn try_broadcast_mode(&mut self, mode: Mode, state: RunState) -> Result<(), Fault> {
        let mut frame = BusMessage::ModeBroadcast { mode, state }.to_frame()?;
        self.net.send_frame(&mut frame)?;
        info!("mode {} state {}", mode, state);
        Ok(())
    }

    /// Tell every node the current mode and state
    pub fn broadcast_mode(&mut self, mode: Mode, state: RunState) {
        let result = self.try_broadcast_mode(mode, state);
        self.net.settle(result)
    }

    /// One poll of the button handshake
    ///
    /// Yields the pressed button once its reply has arrived. Call once per
    /// main-loop pass.
    pub fn try_step_button_poll(&mut self) -> Result<Option<u8>, Fault> {
        match self.buttons.step(&mut self.net)? {
            Some(reply) => self.checked_button(&reply).map(Some),
            None => Ok(None),
        }
    }

    pub fn step_button_poll(&mut self) -> Option<u8> {
        let result = self.try_step_button_poll();
        self.net.settle(result)
    }

    /// Serve a pending button press to completion
    ///
    /// Returns `Ok(None)` straight away when no press is waiting.
    pub fn try_poll_turnout_button(&mut self) -> Result<Option<u8>, Fault> {
        match self.buttons.run(&mut self.net)? {
            Some(reply) => self.checked_button(&reply).map(Some),
            None => Ok(None),
        }
    }

    pub fn poll_turnout_button(&mut self) -> Option<u8> {
        let result = self.try_poll_turnout_button();
        self.net.settle(result)
    }

    /// Button number carried by a button reply
    pub fn turnout_button_num(frame: &Frame) -> u8 {
        frame.byte(BUTTON_NUM_OFFSET)
    }

    fn checked_button(&self, reply: &Frame) -> Result<u8, Fault> {
        let button = Self::turnout_button_num(reply);
        if !button_in_range(button, self.button_count) {
            return Err(Violation::ButtonOutOfRange { button }.into());
        }
        debug!("button {} pressed", button);
        Ok(button)
    }
}
