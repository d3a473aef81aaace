//! Half-duplex RS485 transport
//!
//! Reception is a non-blocking poll that only ever removes whole frames
//! from the UART queue. Transmission is blocking: the driver is switched
//! to transmit, the sealed frame is written in one go and flushed, then
//! the driver goes back to receive so other nodes can talk.

use trainbus_hal::{OutputPin, Uart, UartConfig};
use trainbus_protocol::frame::validate_length;
use trainbus_protocol::Frame;

use super::activity::{Activity, NoActivity};
use crate::config::NodeConfig;
use crate::fault::Fault;

/// One node's connection to the bus
///
/// `T` is the transceiver's driver-enable line: high transmits, low
/// listens.
pub struct BusTransport<U, T, A = NoActivity> {
    uart: U,
    tx_enable: T,
    activity: A,
    config: UartConfig,
    rx_high_water: usize,
}

impl<U: Uart, T: OutputPin> BusTransport<U, T, NoActivity> {
    pub fn new(uart: U, tx_enable: T, node: &NodeConfig) -> Self {
        Self::with_activity(uart, tx_enable, NoActivity, node)
    }
}

impl<U: Uart, T: OutputPin, A: Activity> BusTransport<U, T, A> {
    /// Transport that drives activity indicators
    ///
    /// The overflow threshold is kept below the UART's queue capacity so a
    /// full queue is always reported.
    pub fn with_activity(uart: U, tx_enable: T, activity: A, node: &NodeConfig) -> Self {
        let rx_high_water = node.rx_high_water.min(uart.capacity().saturating_sub(1));
        Self {
            uart,
            tx_enable,
            activity,
            config: node.uart(),
            rx_high_water,
        }
    }

    /// Open the UART and put the transceiver in receive mode
    ///
    /// Safe to call again; the port is simply reconfigured.
    pub fn initialize(&mut self) -> Result<(), Fault> {
        self.uart.configure(&self.config).map_err(|_| Fault::SerialIo)?;
        self.tx_enable.set_low();
        info!("RS485 bus at {} baud", self.config.baudrate);
        Ok(())
    }

    /// Take one complete frame off the receive queue, if one has arrived
    ///
    /// Returns `Ok(false)` without touching `out` or the queue while the
    /// frame at the head of the queue is still incomplete. Frames for
    /// other nodes are consumed like any other; filtering is the
    /// dispatcher's job.
    pub fn try_receive(&mut self, out: &mut Frame) -> Result<bool, Fault> {
        let Some(length) = self.uart.peek() else {
            return Ok(false);
        };
        let queued = self.uart.available();

        if queued < usize::from(length) {
            // A garbage length byte would otherwise wait forever
            if queued > self.rx_high_water {
                return Err(Fault::InputQueueNearOverflow { queued });
            }
            return Ok(false);
        }

        self.activity.receiving(true);

        let len = validate_length(length)?;
        if queued > self.rx_high_water {
            return Err(Fault::InputQueueNearOverflow { queued });
        }

        let mut frame = Frame::zeroed();
        for slot in &mut frame.buffer_mut()[..len] {
            *slot = self
                .uart
                .read_byte()
                .map_err(|_| Fault::SerialIo)?
                .ok_or(Fault::SerialIo)?;
        }
        frame.verify()?;

        self.activity.receiving(false);
        trace!(
            "rx len={} to={} from={} type={}",
            frame.length(),
            frame.destination(),
            frame.source(),
            frame.msg_type()
        );

        *out = frame;
        Ok(true)
    }

    /// Seal and transmit a frame, blocking until the last bit is out
    ///
    /// The transceiver is returned to receive mode even if the UART
    /// reports an error.
    pub fn try_send(&mut self, frame: &mut Frame) -> Result<(), Fault> {
        validate_length(frame.length())?;

        self.activity.transmitting(true);
        self.tx_enable.set_high();

        frame.seal();
        let result = self
            .uart
            .write_blocking(frame.as_bytes())
            .and_then(|()| self.uart.flush());

        self.tx_enable.set_low();
        self.activity.transmitting(false);

        trace!(
            "tx len={} to={} type={}",
            frame.length(),
            frame.destination(),
            frame.msg_type()
        );
        result.map_err(|_| Fault::SerialIo)
    }

    /// Bytes waiting in the receive queue
    pub fn queued(&self) -> usize {
        self.uart.available()
    }

    /// Queue depth past which receive reports an overflow
    pub fn rx_high_water(&self) -> usize {
        self.rx_high_water
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }
}
