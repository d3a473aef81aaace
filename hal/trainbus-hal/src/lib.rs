//! TrainBus Hardware Abstraction Layer
//!
//! This crate defines the hardware traits a TrainBus node is built on.
//! Board support code implements them for a specific microcontroller; the
//! bus transport and handshake logic in `trainbus-core` only ever sees the
//! traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Node application (master, button, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trainbus-core (transport, handshake)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trainbus-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O (direction control,
//!   request-to-send lines, halt line, indicator LEDs)
//! - [`uart::UartTx`], [`uart::UartRx`], [`uart::UartSetup`] - The shared
//!   RS485 byte queue

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, Level, NoPin, OutputPin};
pub use uart::{ErrorType, Uart, UartConfig, UartRx, UartSetup, UartTx};
