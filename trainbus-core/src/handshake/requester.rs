//! Peripheral side of the handshake

use trainbus_hal::OutputPin;
use trainbus_protocol::{Frame, NodeId};

use super::{check_halt, FrameLink, PollBudget};
use crate::fault::{Fault, Violation};

/// Where a peripheral is in the request-to-send exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    /// Request line released, nothing to send
    Idle,
    /// Request line just pulled low
    RequestAsserted,
    /// Waiting for the master's request frame
    AwaitingPoll,
    /// Granted: release the line and send the reply
    Responding,
}

/// Drives one request line and sends one reply per handshake
///
/// The request line is active low.
pub struct Requester<R> {
    line: R,
    node: NodeId,
    request_type: u8,
    state: HandshakeState,
    reply: Frame,
    budget: PollBudget,
}

impl<R: OutputPin> Requester<R> {
    /// `request_type` is the type of the master frame that grants the turn
    pub fn new(mut line: R, node: NodeId, request_type: u8, reply_poll_limit: Option<u32>) -> Self {
        line.set_high();
        Self {
            line,
            node,
            request_type,
            state: HandshakeState::Idle,
            reply: Frame::zeroed(),
            budget: PollBudget::new(reply_poll_limit),
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == HandshakeState::Idle
    }

    /// Assert the request line; `reply` goes out once the master asks
    ///
    /// Returns `false` and changes nothing if a handshake is already in
    /// progress.
    pub fn begin(&mut self, reply: Frame) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.reply = reply;
        self.budget.reset();
        self.line.set_low();
        self.state = HandshakeState::RequestAsserted;
        debug!("{} requesting a turn", self.node.name());
        true
    }

    /// Advance by at most one bus poll
    ///
    /// On a fault the request line is released before the fault is
    /// returned.
    pub fn step(&mut self, link: &mut impl FrameLink) -> Result<HandshakeState, Fault> {
        let result = self.advance(link);
        if result.is_err() {
            self.abort();
        }
        result
    }

    /// Step until the reply has been sent
    pub fn run(&mut self, link: &mut impl FrameLink) -> Result<(), Fault> {
        loop {
            if self.step(link)? == HandshakeState::Idle {
                return Ok(());
            }
        }
    }

    /// Release the request line and forget the pending reply
    pub fn abort(&mut self) {
        self.line.set_high();
        self.state = HandshakeState::Idle;
    }

    fn advance(&mut self, link: &mut impl FrameLink) -> Result<HandshakeState, Fault> {
        match self.state {
            HandshakeState::Idle => {}
            HandshakeState::RequestAsserted => {
                self.state = HandshakeState::AwaitingPoll;
            }
            HandshakeState::AwaitingPoll => {
                check_halt(link)?;

                let mut incoming = Frame::zeroed();
                incoming.clear_header();
                if link.poll_frame(&mut incoming)? {
                    if self.is_grant(&incoming)? {
                        self.state = HandshakeState::Responding;
                    }
                } else {
                    self.budget.spend()?;
                }
            }
            HandshakeState::Responding => {
                self.line.set_high();
                link.send_frame(&mut self.reply)?;
                self.state = HandshakeState::Idle;
                debug!("{} reply sent", self.node.name());
            }
        }
        Ok(self.state)
    }

    /// Frames for other nodes are not ours to judge
    fn is_grant(&self, frame: &Frame) -> Result<bool, Fault> {
        if frame.destination() != self.node.to_byte() {
            return Ok(false);
        }
        if frame.source() != NodeId::Master.to_byte() {
            return Err(Violation::WrongPeer {
                destination: frame.destination(),
                source: frame.source(),
            }
            .into());
        }
        if frame.msg_type() != self.request_type {
            return Err(Violation::WrongType {
                msg_type: frame.msg_type(),
            }
            .into());
        }
        Ok(true)
    }
}
