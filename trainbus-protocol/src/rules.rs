//! Interest rules: which frames a node wants to see
//!
//! Every node receives every frame on the bus. A node's message module
//! lists the (destination, source, type) triples it cares about; anything
//! else is traffic between other nodes.

use crate::address::NodeId;
use crate::frame::Frame;
use crate::messages::{MSG_BUTTON, MSG_MODE, MSG_QUESTION, MSG_REGISTRATION, MSG_SENSOR};

/// One (destination, source, type) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterestRule {
    pub destination: NodeId,
    pub source: NodeId,
    pub msg_type: u8,
}

impl InterestRule {
    pub const fn new(destination: NodeId, source: NodeId, msg_type: u8) -> Self {
        Self {
            destination,
            source,
            msg_type,
        }
    }

    /// Check whether a frame's header matches this rule
    pub fn matches(&self, frame: &Frame) -> bool {
        frame.destination() == self.destination.to_byte()
            && frame.source() == self.source.to_byte()
            && frame.msg_type() == self.msg_type
    }
}

/// Index of the first rule matching the frame, if any
pub fn first_match(rules: &[InterestRule], frame: &Frame) -> Option<usize> {
    rules.iter().position(|rule| rule.matches(frame))
}

/// Frames the master expects. The master is the addressee of every
/// legitimate peripheral-originated frame, so anything else is a fault.
pub const MASTER_RULES: [InterestRule; 4] = [
    // Occupancy sensor change
    InterestRule::new(NodeId::Master, NodeId::Sensor, MSG_SENSOR),
    // Turnout button press
    InterestRule::new(NodeId::Master, NodeId::Button, MSG_BUTTON),
    // Train registration data
    InterestRule::new(NodeId::Master, NodeId::Occupancy, MSG_REGISTRATION),
    // Operator answer to a question
    InterestRule::new(NodeId::Master, NodeId::Occupancy, MSG_QUESTION),
];

/// Frames the button node handles
pub const BUTTON_RULES: [InterestRule; 2] = [
    // Mode change broadcast
    InterestRule::new(NodeId::Broadcast, NodeId::Master, MSG_MODE),
    // Permission to send the pressed button number
    InterestRule::new(NodeId::Button, NodeId::Master, MSG_BUTTON),
];

/// Baseline for peripherals without node-specific traffic in the core
pub const PERIPHERAL_RULES: [InterestRule; 1] = [InterestRule::new(
    NodeId::Broadcast,
    NodeId::Master,
    MSG_MODE,
)];

/// Rule table for a node id
pub fn rules_for(node: NodeId) -> &'static [InterestRule] {
    match node {
        NodeId::Master => &MASTER_RULES,
        NodeId::Button => &BUTTON_RULES,
        NodeId::Null | NodeId::Broadcast => &[],
        _ => &PERIPHERAL_RULES,
    }
}
