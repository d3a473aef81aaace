//! Fault detection and escalation
//!
//! Any protocol violation on the bus means a peer or the bus itself can no
//! longer be trusted. There is no retry: the node releases its outputs,
//! shows a diagnostic line and signals the fault until it is power cycled.

pub mod escalation;
pub mod halt;

pub use escalation::FaultEscalation;
pub use halt::{request_emergency_stop, HaltCheck, HaltLine, HaltMonitor, NoHaltLine};

use trainbus_protocol::FrameError;

/// Every fault the bus layer can detect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Declared frame length below the protocol minimum
    FrameTooShort { length: u8 },
    /// Declared frame length above the buffer capacity
    FrameTooLong { length: u8 },
    /// Receive queue filled past the high-water mark
    InputQueueNearOverflow { queued: usize },
    /// Trailing checksum byte does not match the frame contents
    ChecksumMismatch { computed: u8, received: u8 },
    /// Master received a valid frame that matches none of its rules
    UnexpectedSenderOrType {
        destination: u8,
        source: u8,
        msg_type: u8,
    },
    /// A handshake frame came from the wrong peer or carried a bad value
    HandshakeProtocolViolation(Violation),
    /// Handshake reply did not arrive within the configured poll limit
    HandshakeTimeout,
    /// UART reported an error while reading or writing
    SerialIo,
    /// The shared halt line was pulled low
    EmergencyHalt,
}

/// What exactly went wrong during a handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Violation {
    /// Frame addressed to or from someone other than the expected peer
    WrongPeer { destination: u8, source: u8 },
    /// Frame from the expected peer with an unexpected type
    WrongType { msg_type: u8 },
    /// Button number outside `1..=button_count`
    ButtonOutOfRange { button: u8 },
}

impl Fault {
    /// Diagnostic text for the status line (at most 20 characters)
    pub fn message(&self) -> &'static str {
        match self {
            Fault::FrameTooShort { .. } => "RS485 msg too short!",
            Fault::FrameTooLong { .. } => "RS485 msg too long!",
            Fault::InputQueueNearOverflow { .. } => "RS485 in buf ovrflw!",
            Fault::ChecksumMismatch { .. } => "RS485 bad checksum!",
            Fault::UnexpectedSenderOrType { .. } => "Unexpected message!",
            Fault::HandshakeProtocolViolation(Violation::WrongPeer { .. }) => {
                "RS485 to/from error!"
            }
            Fault::HandshakeProtocolViolation(Violation::WrongType { .. }) => {
                "Unexpected message!"
            }
            Fault::HandshakeProtocolViolation(Violation::ButtonOutOfRange { .. }) => {
                "RS485 bad button no!"
            }
            Fault::HandshakeTimeout => "RS485 reply timeout!",
            Fault::SerialIo => "RS485 serial error!",
            Fault::EmergencyHalt => "HALT pin low!  End.",
        }
    }

    /// Number of LED/piezo pulses per burst
    ///
    /// Zero for an emergency halt: the node chirps once and goes quiet so
    /// the node that pulled the line stands out.
    pub fn pulse_count(&self) -> u8 {
        match self {
            Fault::UnexpectedSenderOrType { .. }
            | Fault::HandshakeProtocolViolation(Violation::WrongType { .. }) => 6,
            Fault::EmergencyHalt => 0,
            _ => 1,
        }
    }
}

impl From<FrameError> for Fault {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::TooShort { length } => Fault::FrameTooShort { length },
            FrameError::Incomplete { length, .. } => Fault::FrameTooShort { length },
            FrameError::TooLong { length } => Fault::FrameTooLong { length },
            FrameError::PayloadTooLarge => Fault::FrameTooLong { length: u8::MAX },
            FrameError::ChecksumMismatch { computed, received } => {
                Fault::ChecksumMismatch { computed, received }
            }
        }
    }
}

impl From<Violation> for Fault {
    fn from(v: Violation) -> Self {
        Fault::HandshakeProtocolViolation(v)
    }
}

/// The terminal fault path
///
/// Implementations never return. On hardware this is
/// [`FaultEscalation`]; host tests substitute a handler that panics.
pub trait Escalate {
    fn escalate(&mut self, fault: Fault) -> !;

    /// Unwrap a checked result, escalating its fault
    fn settle<T>(&mut self, result: Result<T, Fault>) -> T
    where
        Self: Sized,
    {
        match result {
            Ok(value) => value,
            Err(fault) => self.escalate(fault),
        }
    }
}

impl<T: Escalate + ?Sized> Escalate for &mut T {
    fn escalate(&mut self, fault: Fault) -> ! {
        T::escalate(self, fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::STATUS_WIDTH;

    const ALL: [Fault; 11] = [
        Fault::FrameTooShort { length: 2 },
        Fault::FrameTooLong { length: 40 },
        Fault::InputQueueNearOverflow { queued: 61 },
        Fault::ChecksumMismatch {
            computed: 1,
            received: 2,
        },
        Fault::UnexpectedSenderOrType {
            destination: 1,
            source: 5,
            msg_type: b'X',
        },
        Fault::HandshakeProtocolViolation(Violation::WrongPeer {
            destination: 1,
            source: 3,
        }),
        Fault::HandshakeProtocolViolation(Violation::WrongType { msg_type: b'M' }),
        Fault::HandshakeProtocolViolation(Violation::ButtonOutOfRange { button: 0 }),
        Fault::HandshakeTimeout,
        Fault::SerialIo,
        Fault::EmergencyHalt,
    ];

    #[test]
    fn test_messages_fit_status_line() {
        for fault in ALL {
            let msg = fault.message();
            assert!(!msg.is_empty());
            assert!(msg.len() <= STATUS_WIDTH, "{:?}: {}", fault, msg);
        }
    }

    #[test]
    fn test_pulse_counts() {
        assert_eq!(Fault::ChecksumMismatch { computed: 0, received: 1 }.pulse_count(), 1);
        assert_eq!(
            Fault::UnexpectedSenderOrType {
                destination: 1,
                source: 2,
                msg_type: b'Z'
            }
            .pulse_count(),
            6
        );
        assert_eq!(Fault::EmergencyHalt.pulse_count(), 0);
    }

    #[test]
    fn test_from_frame_error() {
        assert_eq!(
            Fault::from(FrameError::TooShort { length: 3 }),
            Fault::FrameTooShort { length: 3 }
        );
        assert_eq!(
            Fault::from(FrameError::TooLong { length: 21 }),
            Fault::FrameTooLong { length: 21 }
        );
        assert_eq!(
            Fault::from(FrameError::ChecksumMismatch {
                computed: 9,
                received: 8
            }),
            Fault::ChecksumMismatch {
                computed: 9,
                received: 8
            }
        );
    }
}
