//! UART serial communication abstractions
//!
//! The RS485 transceiver sits behind an ordinary UART whose receive side is
//! a small interrupt-filled byte queue. The bus transport needs to look at
//! that queue without consuming it (to see whether a whole frame has
//! arrived yet), so the receive trait exposes queue semantics rather than
//! a blocking read.

/// Common error type for the UART traits
pub trait ErrorType {
    /// Error type for UART operations
    type Error: core::fmt::Debug;
}

/// UART transmitter
pub trait UartTx: ErrorType {
    /// Write data to the UART
    ///
    /// Blocks until all data has been queued for transmission.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until every queued byte has physically left the shift register
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver backed by a byte queue
pub trait UartRx: ErrorType {
    /// Number of bytes waiting in the receive queue
    fn available(&self) -> usize;

    /// Next byte in the receive queue, without consuming it
    fn peek(&self) -> Option<u8>;

    /// Consume the next byte from the receive queue
    ///
    /// Returns `Ok(None)` when the queue is empty.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Total size of the receive queue in bytes
    ///
    /// The bus transport keeps its overflow threshold below this.
    fn capacity(&self) -> usize {
        64
    }
}

/// Runtime (re)configuration of the UART peripheral
pub trait UartSetup: ErrorType {
    /// Apply a line configuration, opening the port if necessary
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx + UartSetup {}

// Blanket implementation
impl<T: UartTx + UartRx + UartSetup> Uart for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::with_baudrate(115_200)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
