//! TrainBus RS485 Protocol
//!
//! This crate defines the wire protocol shared by every node on the
//! layout's half-duplex RS485 bus: one master controller and several
//! peripherals (buttons, sensors, turnout drivers, indicator LEDs, the
//! legacy-interface bridge).
//!
//! # Protocol Overview
//!
//! All messages use a fixed-offset binary frame:
//! ```text
//! ┌────────┬────┬──────┬──────┬─────────────┬──────────┐
//! │ LENGTH │ TO │ FROM │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B     │ 1B │ 1B   │ 1B   │ 0–15B       │ 1B       │
//! └────────┴────┴──────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is a CRC-8 over every preceding byte. Payload layouts are
//! defined per (source, destination, type) in [`messages`]; the frame layer
//! treats them as opaque bytes.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod address;
pub mod frame;
pub mod messages;
pub mod rules;

pub use address::NodeId;
pub use frame::{crc8, Frame, FrameError, MAX_FRAME_LEN, MIN_FRAME_LEN};
pub use messages::{BusMessage, Mode, RunState};
pub use rules::InterestRule;
