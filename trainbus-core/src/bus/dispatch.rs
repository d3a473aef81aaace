//! Receive filter
//!
//! Every node hears every frame. The dispatcher holds the node's interest
//! rules and copies a frame out only when one of them matches.

use trainbus_protocol::rules::{first_match, rules_for};
use trainbus_protocol::{Frame, InterestRule, NodeId};

use crate::fault::Fault;

/// What to do with a valid frame that matches no rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnmatchedPolicy {
    /// Traffic between other nodes: ignore it
    Discard,
    /// Every frame on the bus should be for us: treat it as a fault
    Escalate,
}

/// Per-node receive filter
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    rules: &'r [InterestRule],
    policy: UnmatchedPolicy,
}

impl Dispatcher<'static> {
    /// Rule table and policy for a node id
    ///
    /// The master is the addressee of every frame a peripheral may send,
    /// so anything it does not recognise is a fault. Peripherals overhear
    /// traffic between other nodes and drop it.
    pub fn for_node(node: NodeId) -> Self {
        let policy = if node == NodeId::Master {
            UnmatchedPolicy::Escalate
        } else {
            UnmatchedPolicy::Discard
        };
        Self::new(rules_for(node), policy)
    }
}

impl<'r> Dispatcher<'r> {
    pub const fn new(rules: &'r [InterestRule], policy: UnmatchedPolicy) -> Self {
        Self { rules, policy }
    }

    pub fn rules(&self) -> &'r [InterestRule] {
        self.rules
    }

    pub fn policy(&self) -> UnmatchedPolicy {
        self.policy
    }

    /// Copy `frame` into `out` if a rule matches
    ///
    /// On `Ok(false)` the output buffer is left exactly as it was.
    pub fn accept(&self, frame: &Frame, out: &mut Frame) -> Result<bool, Fault> {
        match first_match(self.rules, frame) {
            Some(index) => {
                trace!("accepted by rule {}", index);
                *out = *frame;
                Ok(true)
            }
            None => match self.policy {
                UnmatchedPolicy::Discard => {
                    trace!("dropped frame for {}", frame.destination());
                    Ok(false)
                }
                UnmatchedPolicy::Escalate => Err(Fault::UnexpectedSenderOrType {
                    destination: frame.destination(),
                    source: frame.source(),
                    msg_type: frame.msg_type(),
                }),
            },
        }
    }
}
