//! Master side of the handshake

use trainbus_hal::InputPin;
use trainbus_protocol::{Frame, NodeId};

use super::{check_halt, FrameLink, PollBudget};
use crate::fault::{Fault, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollerState {
    /// Watching the peer's request line
    Idle,
    /// Request frame sent, waiting for the peer's reply
    AwaitingReply,
}

/// Watches one peripheral's request line and collects its reply
pub struct Poller<L> {
    line: L,
    peer: NodeId,
    request_type: u8,
    state: PollerState,
    budget: PollBudget,
}

impl<L: InputPin> Poller<L> {
    pub fn new(line: L, peer: NodeId, request_type: u8, reply_poll_limit: Option<u32>) -> Self {
        Self {
            line,
            peer,
            request_type,
            state: PollerState::Idle,
            budget: PollBudget::new(reply_poll_limit),
        }
    }

    pub fn peer(&self) -> NodeId {
        self.peer
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// The peer is holding its request line low
    pub fn request_pending(&self) -> bool {
        self.line.is_low()
    }

    /// Advance by at most one bus poll; yields the reply when it arrives
    pub fn step(&mut self, link: &mut impl FrameLink) -> Result<Option<Frame>, Fault> {
        let result = self.advance(link);
        if result.is_err() {
            self.state = PollerState::Idle;
        }
        result
    }

    /// Serve a pending request to completion
    ///
    /// Returns `Ok(None)` straight away if the peer is not asking.
    pub fn run(&mut self, link: &mut impl FrameLink) -> Result<Option<Frame>, Fault> {
        if self.state == PollerState::Idle && !self.request_pending() {
            return Ok(None);
        }
        loop {
            if let Some(reply) = self.step(link)? {
                return Ok(Some(reply));
            }
        }
    }

    fn advance(&mut self, link: &mut impl FrameLink) -> Result<Option<Frame>, Fault> {
        match self.state {
            PollerState::Idle => {
                if self.request_pending() {
                    let mut request =
                        Frame::new(self.peer.to_byte(), NodeId::Master.to_byte(), self.request_type, &[])?;
                    link.send_frame(&mut request)?;
                    self.budget.reset();
                    self.state = PollerState::AwaitingReply;
                    debug!("granted turn to {}", self.peer.name());
                }
                Ok(None)
            }
            PollerState::AwaitingReply => {
                check_halt(link)?;

                let mut incoming = Frame::zeroed();
                incoming.clear_header();
                if !link.poll_frame(&mut incoming)? {
                    self.budget.spend()?;
                    return Ok(None);
                }

                self.check_reply(&incoming)?;
                self.state = PollerState::Idle;
                Ok(Some(incoming))
            }
        }
    }

    fn check_reply(&self, frame: &Frame) -> Result<(), Fault> {
        if frame.destination() != NodeId::Master.to_byte() || frame.source() != self.peer.to_byte() {
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
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::HaltCheck;
    use crate::handshake::sim::SimLink;
    use crate::testing::{SimBus, SimLine};
    use std::vec;
    use trainbus_protocol::messages::{MSG_BUTTON, MSG_SENSOR};

    fn setup(limit: Option<u32>) -> (Poller<SimLine>, SimLine, SimLink, SimLink) {
        let bus = SimBus::new();
        let line = SimLine::new(true);
        let poller = Poller::new(line.clone(), NodeId::Button, MSG_BUTTON, limit);
        let master = SimLink::new(&bus, NodeId::Master);
        let button = SimLink::new(&bus, NodeId::Button);
        (poller, line, master, button)
    }

    #[test]
    fn test_quiet_line_sends_nothing() {
        let (mut poller, _, mut master, button) = setup(None);
        assert_eq!(poller.step(&mut master), Ok(None));
        assert_eq!(poller.run(&mut master), Ok(None));
        assert_eq!(poller.state(), PollerState::Idle);
        assert_eq!(button.pending(), 0);
    }

    #[test]
    fn test_request_then_reply() {
        let (mut poller, line, mut master, mut button) = setup(None);
        line.drive(false);

        assert_eq!(poller.step(&mut master), Ok(None));
        assert_eq!(poller.state(), PollerState::AwaitingReply);

        let mut request = Frame::zeroed();
        assert_eq!(button.poll_frame(&mut request), Ok(true));
        assert_eq!(request.as_bytes(), &[5, 4, 1, b'B', request.checksum()]);
        request.verify().unwrap();

        assert_eq!(poller.step(&mut master), Ok(None));

        line.drive(true);
        button
            .send_frame(&mut Frame::new(1, 4, MSG_BUTTON, &[17]).unwrap())
            .unwrap();
        let reply = poller.step(&mut master).unwrap().unwrap();
        assert_eq!(reply.byte(4), 17);
        assert_eq!(poller.state(), PollerState::Idle);
    }

    #[test]
    fn test_reply_from_wrong_peer() {
        let (mut poller, line, mut master, mut button) = setup(None);
        line.drive(false);
        poller.step(&mut master).unwrap();

        // Legitimate master traffic, but not the reply we asked for
        button
            .send_frame(&mut Frame::new(1, 3, MSG_SENSOR, &[4, 1]).unwrap())
            .unwrap();
        assert_eq!(
            poller.step(&mut master),
            Err(Fault::HandshakeProtocolViolation(Violation::WrongPeer {
                destination: 1,
                source: 3
            }))
        );
        assert_eq!(poller.state(), PollerState::Idle);
    }

    #[test]
    fn test_halt_while_waiting() {
        let (mut poller, line, mut master, _) = setup(None);
        line.drive(false);
        poller.step(&mut master).unwrap();
        master.halt = vec![HaltCheck::Asserted];
        assert_eq!(poller.step(&mut master), Err(Fault::EmergencyHalt));
    }

    #[test]
    fn test_reply_timeout() {
        let (mut poller, line, mut master, _) = setup(Some(5));
        line.drive(false);
        assert_eq!(poller.run(&mut master), Err(Fault::HandshakeTimeout));
        // One send plus five empty polls
        assert_eq!(master.polls, 5);
    }
}
