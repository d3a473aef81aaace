//! Per-node configuration

use trainbus_hal::UartConfig;
use trainbus_protocol::messages::TOTAL_TURNOUTS;
use trainbus_protocol::NodeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bus baud rate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Queue depth past which the receive queue is considered about to overflow
///
/// Clamped below the UART's own queue capacity by the transport.
pub const RX_HIGH_WATER: usize = 60;

/// Halt-line debounce: solenoid EMF spikes last well under this
pub const HALT_DEBOUNCE_US: u32 = 1_000;

/// Timing of the fault indication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PulseTiming {
    /// Length of one piezo chirp (LED lit meanwhile)
    pub chirp_ms: u32,
    /// Dark time after each pulse
    pub gap_ms: u32,
    /// Pause between bursts
    pub pause_ms: u32,
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            chirp_ms: 10,
            gap_ms: 100,
            pause_ms: 1_000,
        }
    }
}

/// Configuration of one node on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// This node's address
    pub node: NodeId,
    /// Bus baud rate
    pub baudrate: u32,
    /// Receive queue depth that counts as near-overflow
    pub rx_high_water: usize,
    /// Number of turnout buttons on the control panel
    pub button_count: u8,
    /// Empty polls allowed while waiting for a handshake frame
    ///
    /// `None` waits forever, which is the deployed behavior: a lost reply
    /// stalls the node until the halt line is pulled.
    pub reply_poll_limit: Option<u32>,
    /// Halt-line debounce in microseconds
    pub halt_debounce_us: u32,
    /// Fault indication timing
    pub pulse: PulseTiming,
}

impl NodeConfig {
    /// Defaults for a node with the given address
    pub const fn new(node: NodeId) -> Self {
        Self {
            node,
            baudrate: DEFAULT_BAUDRATE,
            rx_high_water: RX_HIGH_WATER,
            button_count: TOTAL_TURNOUTS,
            reply_poll_limit: None,
            halt_debounce_us: HALT_DEBOUNCE_US,
            pulse: PulseTiming {
                chirp_ms: 10,
                gap_ms: 100,
                pause_ms: 1_000,
            },
        }
    }

    /// Defaults for the master controller
    pub const fn master() -> Self {
        Self::new(NodeId::Master)
    }

    pub const fn with_baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }

    pub const fn with_button_count(mut self, button_count: u8) -> Self {
        self.button_count = button_count;
        self
    }

    /// Give up on a handshake after `polls` empty polls
    pub const fn with_reply_poll_limit(mut self, polls: u32) -> Self {
        self.reply_poll_limit = Some(polls);
        self
    }

    pub const fn with_rx_high_water(mut self, queued: usize) -> Self {
        self.rx_high_water = queued;
        self
    }

    pub const fn with_halt_debounce_us(mut self, debounce_us: u32) -> Self {
        self.halt_debounce_us = debounce_us;
        self
    }

    pub const fn with_pulse_timing(mut self, pulse: PulseTiming) -> Self {
        self.pulse = pulse;
        self
    }

    /// UART line settings for this node
    pub fn uart(&self) -> UartConfig {
        UartConfig::with_baudrate(self.baudrate)
    }
}
