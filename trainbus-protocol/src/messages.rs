//! Message schemas for the TrainBus protocol
//!
//! A message type only means something for a given (source, destination)
//! pair; `'B'` is a request when the master sends it to the button node and
//! a reply when the button node sends it back. Layouts used by the core:
//!
//! ```text
//! MAS -> ALL  'M'  mode/state broadcast
//!   0 Length  7
//!   1 To      99 (ALL)
//!   2 From    1 (MAS)
//!   3 Type    'M'
//!   4 Mode    1..5 [Manual | Register | Auto | Park | POV]
//!   5 State   1..3 [Running | Stopping | Stopped]
//!   6 CRC
//!
//! MAS -> BTN  'B'  permission to send the pressed button
//!   0 Length  5
//!   1 To      4 (BTN)
//!   2 From    1 (MAS)
//!   3 Type    'B'
//!   4 CRC
//!
//! BTN -> MAS  'B'  number of the button that was pressed
//!   0 Length  6
//!   1 To      1 (MAS)
//!   2 From    4 (BTN)
//!   3 Type    'B'
//!   4 Button  1..32
//!   5 CRC
//! ```

use crate::address::NodeId;
use crate::frame::{Frame, FrameError, PAYLOAD_OFFSET};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Message type characters
pub const MSG_MODE: u8 = b'M';
pub const MSG_BUTTON: u8 = b'B';
pub const MSG_SENSOR: u8 = b'S';
pub const MSG_REGISTRATION: u8 = b'R';
pub const MSG_QUESTION: u8 = b'Q';

// Payload offsets
pub const MODE_OFFSET: usize = PAYLOAD_OFFSET;
pub const STATE_OFFSET: usize = PAYLOAD_OFFSET + 1;
pub const BUTTON_NUM_OFFSET: usize = PAYLOAD_OFFSET;

// Frame lengths
pub const MODE_FRAME_LEN: u8 = 7;
pub const BUTTON_REQUEST_LEN: u8 = 5;
pub const BUTTON_REPLY_LEN: u8 = 6;

/// Number of turnouts (and turnout buttons) on the layout
pub const TOTAL_TURNOUTS: u8 = 32;

/// Layout operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    Undefined,
    Manual,
    Register,
    Auto,
    Park,
    Pov,
}

impl Mode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Mode::Undefined),
            1 => Some(Mode::Manual),
            2 => Some(Mode::Register),
            3 => Some(Mode::Auto),
            4 => Some(Mode::Park),
            5 => Some(Mode::Pov),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Mode::Undefined => 0,
            Mode::Manual => 1,
            Mode::Register => 2,
            Mode::Auto => 3,
            Mode::Park => 4,
            Mode::Pov => 5,
        }
    }
}

/// Run state within the current mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunState {
    Undefined,
    Running,
    Stopping,
    Stopped,
}

impl RunState {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(RunState::Undefined),
            1 => Some(RunState::Running),
            2 => Some(RunState::Stopping),
            3 => Some(RunState::Stopped),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            RunState::Undefined => 0,
            RunState::Running => 1,
            RunState::Stopping => 2,
            RunState::Stopped => 3,
        }
    }
}

/// Messages the core knows the layout of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusMessage {
    /// Master announces the layout mode and state to every node
    ModeBroadcast { mode: Mode, state: RunState },
    /// Master grants `to` its turn to report an event
    ButtonRequest { to: NodeId },
    /// Button node reports the pressed turnout button (1-based)
    ButtonReply { button: u8 },
}

impl BusMessage {
    /// Encode this message into an unsealed frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match *self {
            BusMessage::ModeBroadcast { mode, state } => Frame::new(
                NodeId::Broadcast.to_byte(),
                NodeId::Master.to_byte(),
                MSG_MODE,
                &[mode.to_byte(), state.to_byte()],
            ),
            BusMessage::ButtonRequest { to } => {
                Frame::new(to.to_byte(), NodeId::Master.to_byte(), MSG_BUTTON, &[])
            }
            BusMessage::ButtonReply { button } => Frame::new(
                NodeId::Master.to_byte(),
                NodeId::Button.to_byte(),
                MSG_BUTTON,
                &[button],
            ),
        }
    }

    /// Parse a message from a verified frame
    ///
    /// Returns `None` for node pairs and types whose payload this crate
    /// does not interpret; those are left to the owning node.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        let to = NodeId::from_byte(frame.destination())?;
        let from = NodeId::from_byte(frame.source())?;

        match (to, from, frame.msg_type(), frame.length()) {
            (NodeId::Broadcast, NodeId::Master, MSG_MODE, MODE_FRAME_LEN) => {
                Some(BusMessage::ModeBroadcast {
                    mode: Mode::from_byte(frame.byte(MODE_OFFSET))?,
                    state: RunState::from_byte(frame.byte(STATE_OFFSET))?,
                })
            }
            (to, NodeId::Master, MSG_BUTTON, BUTTON_REQUEST_LEN) if to.is_peripheral() => {
                Some(BusMessage::ButtonRequest { to })
            }
            (NodeId::Master, NodeId::Button, MSG_BUTTON, BUTTON_REPLY_LEN) => {
                Some(BusMessage::ButtonReply {
                    button: frame.byte(BUTTON_NUM_OFFSET),
                })
            }
            _ => None,
        }
    }
}

/// Check a turnout button number against the configured button count
pub fn button_in_range(button: u8, button_count: u8) -> bool {
    (1..=button_count).contains(&button)
}
