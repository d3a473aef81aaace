//! Frame encoding and decoding for the TrainBus RS485 protocol.
//!
//! Frame format:
//! - LENGTH (1 byte): total frame length including the checksum (5-20)
//! - TO (1 byte): destination node id, or 99 for broadcast
//! - FROM (1 byte): source node id
//! - TYPE (1 byte): ASCII message type, meaning depends on the node pair
//! - PAYLOAD (0-15 bytes): type-specific data
//! - CHECKSUM (1 byte): CRC-8 of every preceding byte
//!
//! There is no start byte. Every node sees every frame on the bus, and the
//! length byte at the head of the receive queue is what delimits frames.

/// Smallest legal frame: header plus checksum, no payload
pub const MIN_FRAME_LEN: usize = 5;

/// Largest frame any node will accept (receive buffer capacity)
pub const MAX_FRAME_LEN: usize = 20;

/// Largest payload that fits in a frame
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - MIN_FRAME_LEN;

/// Byte offset of the total length
pub const LEN_OFFSET: usize = 0;
/// Byte offset of the destination node id
pub const DESTINATION_OFFSET: usize = 1;
/// Byte offset of the source node id
pub const SOURCE_OFFSET: usize = 2;
/// Byte offset of the message type
pub const TYPE_OFFSET: usize = 3;
/// Byte offset of the first payload byte
pub const PAYLOAD_OFFSET: usize = 4;

/// CRC-8 polynomial, bit-reversed form of x^8 + x^5 + x^4 + 1
pub const CRC8_POLY: u8 = 0x8C;

/// Errors that can occur while validating a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Declared length is below [`MIN_FRAME_LEN`]
    TooShort { length: u8 },
    /// Declared length is above [`MAX_FRAME_LEN`]
    TooLong { length: u8 },
    /// Fewer bytes supplied than the length byte declares
    Incomplete { length: u8, available: usize },
    /// Trailing byte does not match the computed CRC
    ChecksumMismatch { computed: u8, received: u8 },
    /// Payload does not fit in a frame
    PayloadTooLarge,
}

/// Compute the CRC-8 of a byte slice
///
/// Bit-serial, LSB first, polynomial [`CRC8_POLY`], seed 0, no final XOR.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut extract = byte;
        for _ in 0..8 {
            let sum = (crc ^ extract) & 0x01;
            crc >>= 1;
            if sum != 0 {
                crc ^= CRC8_POLY;
            }
            extract >>= 1;
        }
    }
    crc
}

/// Check a declared length against the protocol bounds
pub fn validate_length(length: u8) -> Result<usize, FrameError> {
    let len = length as usize;
    if len < MIN_FRAME_LEN {
        Err(FrameError::TooShort { length })
    } else if len > MAX_FRAME_LEN {
        Err(FrameError::TooLong { length })
    } else {
        Ok(len)
    }
}

/// One frame buffer
///
/// A fixed [`MAX_FRAME_LEN`] byte array with accessors at the protocol's
/// fixed offsets. Buffers are plain values: each send or receive owns its
/// own, nothing is shared between calls.
///
/// Field accessors never fail. If the length byte is out of range the
/// accessors clamp rather than panic; use [`Frame::verify`] to check a
/// buffer before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
}

impl Default for Frame {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Frame {
    /// An all-zero buffer (length 0, not a valid frame)
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0; MAX_FRAME_LEN],
        }
    }

    /// Build a frame from header fields and a payload
    ///
    /// The length byte is derived from the payload. The checksum byte is
    /// left at zero until [`Frame::seal`] is called (the transport seals
    /// every frame it sends).
    pub fn new(destination: u8, source: u8, msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut frame = Self::zeroed();
        frame.set_length((MIN_FRAME_LEN + payload.len()) as u8);
        frame.set_destination(destination);
        frame.set_source(source);
        frame.set_msg_type(msg_type);
        frame.bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload.len()].copy_from_slice(payload);
        Ok(frame)
    }

    /// Copy a complete frame out of raw bytes, checking length and CRC
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let length = bytes.first().copied().ok_or(FrameError::Incomplete {
            length: 0,
            available: 0,
        })?;
        let len = validate_length(length)?;
        if bytes.len() < len {
            return Err(FrameError::Incomplete {
                length,
                available: bytes.len(),
            });
        }

        let mut frame = Self::zeroed();
        frame.bytes[..len].copy_from_slice(&bytes[..len]);
        frame.verify()?;
        Ok(frame)
    }

    /// Total frame length including the checksum
    pub fn length(&self) -> u8 {
        self.bytes[LEN_OFFSET]
    }

    pub fn set_length(&mut self, length: u8) {
        self.bytes[LEN_OFFSET] = length;
    }

    /// Destination node id
    pub fn destination(&self) -> u8 {
        self.bytes[DESTINATION_OFFSET]
    }

    pub fn set_destination(&mut self, destination: u8) {
        self.bytes[DESTINATION_OFFSET] = destination;
    }

    /// Source node id
    pub fn source(&self) -> u8 {
        self.bytes[SOURCE_OFFSET]
    }

    pub fn set_source(&mut self, source: u8) {
        self.bytes[SOURCE_OFFSET] = source;
    }

    /// Message type character
    pub fn msg_type(&self) -> u8 {
        self.bytes[TYPE_OFFSET]
    }

    pub fn set_msg_type(&mut self, msg_type: u8) {
        self.bytes[TYPE_OFFSET] = msg_type;
    }

    /// Stored checksum byte (the last byte of the frame)
    pub fn checksum(&self) -> u8 {
        self.bytes[self.checksum_offset()]
    }

    pub fn set_checksum(&mut self, checksum: u8) {
        let offset = self.checksum_offset();
        self.bytes[offset] = checksum;
    }

    /// CRC over every byte before the checksum
    pub fn compute_checksum(&self) -> u8 {
        crc8(&self.bytes[..self.checksum_offset()])
    }

    /// Compute the CRC and store it in the last byte
    pub fn seal(&mut self) -> u8 {
        let checksum = self.compute_checksum();
        self.set_checksum(checksum);
        checksum
    }

    /// Builder form of [`Frame::seal`]
    pub fn sealed(mut self) -> Self {
        self.seal();
        self
    }

    /// Check the length bounds and the stored checksum
    pub fn verify(&self) -> Result<(), FrameError> {
        validate_length(self.length())?;
        let computed = self.compute_checksum();
        let received = self.checksum();
        if computed != received {
            return Err(FrameError::ChecksumMismatch { computed, received });
        }
        Ok(())
    }

    /// Byte at an absolute offset, 0 past the end of the buffer
    ///
    /// Node message modules read their payload fields with this, using
    /// their documented offset constants.
    pub fn byte(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    /// Overwrite the byte at an absolute offset
    ///
    /// Offsets past the end of the buffer are ignored.
    pub fn set_byte(&mut self, offset: usize, value: u8) {
        if let Some(slot) = self.bytes.get_mut(offset) {
            *slot = value;
        }
    }

    /// Payload bytes (between the header and the checksum)
    pub fn payload(&self) -> &[u8] {
        let end = self.checksum_offset().max(PAYLOAD_OFFSET);
        &self.bytes[PAYLOAD_OFFSET..end]
    }

    /// The frame as it goes on the wire (`length` bytes, clamped to the buffer)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.wire_len()]
    }

    /// The whole backing buffer, for the transport to fill
    pub fn buffer_mut(&mut self) -> &mut [u8; MAX_FRAME_LEN] {
        &mut self.bytes
    }

    /// Reset the header to "nothing received"
    ///
    /// Length 0, both addresses [`crate::NodeId::Null`], type `' '`. Loops
    /// that wait for a particular frame clear their buffer first so stale
    /// contents can never satisfy the wait.
    pub fn clear_header(&mut self) {
        self.bytes[LEN_OFFSET] = 0;
        self.bytes[DESTINATION_OFFSET] = crate::NodeId::Null.to_byte();
        self.bytes[SOURCE_OFFSET] = crate::NodeId::Null.to_byte();
        self.bytes[TYPE_OFFSET] = b' ';
    }

    fn wire_len(&self) -> usize {
        (self.length() as usize).min(MAX_FRAME_LEN)
    }

    fn checksum_offset(&self) -> usize {
        self.wire_len().saturating_sub(1)
    }
}
