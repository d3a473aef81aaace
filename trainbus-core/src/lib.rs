//! Board-agnostic core of a TrainBus node
//!
//! Everything a node needs to take part in the RS485 network, written
//! against the traits in `trainbus-hal` so it runs unchanged on any board
//! and on the host under test:
//!
//! - Bus transport (framing on and off the UART, direction control)
//! - Receive filtering by interest rules
//! - Request-to-send handshake state machines
//! - Emergency-halt supervision and fault escalation
//! - Node configuration and the master/button message modules

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod bus;
pub mod config;
pub mod fault;
pub mod handshake;
pub mod node;
pub mod traits;

#[cfg(test)]
mod testing;

pub use bus::{BusTransport, Dispatcher};
pub use config::NodeConfig;
pub use fault::{Escalate, Fault, FaultEscalation};
pub use node::Network;
