//! Configuration types
//!
//! Every node is configured with compile-time constants: its own id, the
//! bus baud rate, receive-queue limits and the GPIO lines it uses for the
//! handshake. Nothing here changes at runtime.

pub mod hardware;
pub mod node;

pub use hardware::*;
pub use node::*;
