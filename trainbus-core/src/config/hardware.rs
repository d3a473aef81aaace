//! Hardware configuration types
//!
//! Pin assignments for the sideband lines. The numbers are the ones wired
//! on the deployed layout; board support code turns them into typed pins.

use trainbus_protocol::NodeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new active-high pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create an active-low input with the pull-up enabled
    ///
    /// The request-to-send and halt lines idle high through the pull-up
    /// and are pulled low by whichever node asserts them.
    pub const fn active_low_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }
}

/// RS485 transceiver direction control (high = transmit)
pub const PIN_RS485_TX_ENABLE: PinConfig = PinConfig::new(4);
/// Blue LED lit while transmitting
pub const PIN_RS485_TX_LED: PinConfig = PinConfig::new(5);
/// Yellow LED lit while draining a received frame
pub const PIN_RS485_RX_LED: PinConfig = PinConfig::new(6);
/// Piezo buzzer, sounds while low
pub const PIN_SPEAKER: PinConfig = PinConfig::inverted(7);
/// Shared emergency-halt line, open drain
pub const PIN_HALT: PinConfig = PinConfig::active_low_pullup(9);
/// On-board LED used for fault pulses
pub const PIN_LED: PinConfig = PinConfig::new(13);

/// Request-to-send output on a peripheral
///
/// Every peripheral drives its own request line from the same pin.
pub const PIN_REQ_TX_OUT: PinConfig = PinConfig::active_low_pullup(8);

/// Master input that watches a peripheral's request-to-send line
pub fn request_line_in(peer: NodeId) -> Option<PinConfig> {
    match peer {
        NodeId::Button => Some(PinConfig::active_low_pullup(8)),
        NodeId::Legacy => Some(PinConfig::active_low_pullup(2)),
        NodeId::Sensor => Some(PinConfig::active_low_pullup(3)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_lines_are_distinct() {
        let btn = request_line_in(NodeId::Button).unwrap();
        let leg = request_line_in(NodeId::Legacy).unwrap();
        let sns = request_line_in(NodeId::Sensor).unwrap();
        assert_ne!(btn.pin, leg.pin);
        assert_ne!(btn.pin, sns.pin);
        assert_ne!(leg.pin, sns.pin);
        assert!(btn.inverted && btn.pull_up);
    }

    #[test]
    fn test_nodes_without_request_line() {
        assert_eq!(request_line_in(NodeId::Switch), None);
        assert_eq!(request_line_in(NodeId::Master), None);
    }
}
