//! Node addresses on the bus
//!
//! Every node has exactly one id, used both to address frames and to pick
//! its private request-to-send line on the master.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node on the TrainBus network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum NodeId {
    /// Uninitialized marker, never a real sender or receiver
    Null = 0,
    /// Master controller
    Master = 1,
    /// Legacy command interface and accessory relays
    Legacy = 2,
    /// Occupancy sensor inputs
    Sensor = 3,
    /// Control-panel turnout buttons
    Button = 4,
    /// Turnout solenoid drivers
    Switch = 5,
    /// Turnout indicator LEDs
    Led = 6,
    /// Occupancy LEDs and registration panel
    Occupancy = 7,
    /// Every node (master broadcasts only)
    Broadcast = 99,
}

/// Every node other than the master that can sit on the bus
pub const PERIPHERALS: [NodeId; 6] = [
    NodeId::Legacy,
    NodeId::Sensor,
    NodeId::Button,
    NodeId::Switch,
    NodeId::Led,
    NodeId::Occupancy,
];

impl NodeId {
    /// Parse a node id from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(NodeId::Null),
            1 => Some(NodeId::Master),
            2 => Some(NodeId::Legacy),
            3 => Some(NodeId::Sensor),
            4 => Some(NodeId::Button),
            5 => Some(NodeId::Switch),
            6 => Some(NodeId::Led),
            7 => Some(NodeId::Occupancy),
            99 => Some(NodeId::Broadcast),
            _ => None,
        }
    }

    /// Wire byte for this node id
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Three-letter name used on the status display
    pub fn name(self) -> &'static str {
        match self {
            NodeId::Null => "NUL",
            NodeId::Master => "MAS",
            NodeId::Legacy => "LEG",
            NodeId::Sensor => "SNS",
            NodeId::Button => "BTN",
            NodeId::Switch => "SWT",
            NodeId::Led => "LED",
            NodeId::Occupancy => "OCC",
            NodeId::Broadcast => "ALL",
        }
    }

    /// True for ids that may appear as the source of a frame
    pub fn is_station(self) -> bool {
        !matches!(self, NodeId::Null | NodeId::Broadcast)
    }

    /// True for every station except the master
    pub fn is_peripheral(self) -> bool {
        self.is_station() && self != NodeId::Master
    }
}

impl From<NodeId> for u8 {
    fn from(id: NodeId) -> Self {
        id.to_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        for byte in 0..=u8::MAX {
            if let Some(id) = NodeId::from_byte(byte) {
                assert_eq!(id.to_byte(), byte);
            }
        }
        assert_eq!(NodeId::Broadcast.to_byte(), 99);
        assert_eq!(NodeId::from_byte(8), None);
    }

    #[test]
    fn test_roles() {
        assert!(NodeId::Master.is_station());
        assert!(!NodeId::Master.is_peripheral());
        assert!(!NodeId::Broadcast.is_station());
        assert!(!NodeId::Null.is_station());
        for id in PERIPHERALS {
            assert!(id.is_peripheral(), "{}", id.name());
        }
    }

    #[test]
    fn test_names_fit_status_line() {
        assert_eq!(NodeId::Button.name(), "BTN");
        assert_eq!(NodeId::Broadcast.name(), "ALL");
    }
}
