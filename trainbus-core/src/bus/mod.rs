//! RS485 bus layer
//!
//! The transport moves whole frames on and off the half-duplex bus; the
//! dispatcher decides which of those frames this node cares about.

pub mod activity;
pub mod dispatch;
pub mod transport;

pub use activity::{Activity, ActivityLeds, NoActivity};
pub use dispatch::{Dispatcher, UnmatchedPolicy};
pub use transport::BusTransport;
