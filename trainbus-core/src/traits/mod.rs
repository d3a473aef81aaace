//! Collaborator traits
//!
//! Interfaces the bus layer consumes but does not implement: the
//! diagnostic display and the actuator release hook.

pub mod actuator;
pub mod status;

pub use actuator::ActuatorRelease;
pub use status::{status_line, StatusLine, StatusSink, STATUS_WIDTH};
