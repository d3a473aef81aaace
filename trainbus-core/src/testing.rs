//! Host-side doubles for the hardware traits
//!
//! `SimBus` models the shared RS485 pair: every byte one port writes lands
//! in the receive queue of every other port, the way a half-duplex
//! multi-drop bus echoes to all listeners. Lines are shared cells so a
//! test can hold one end while a node drives or reads the other.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use trainbus_hal::{ErrorType, InputPin, OutputPin, UartConfig, UartRx, UartSetup, UartTx};

use crate::config::PulseTiming;
use crate::fault::{Escalate, Fault, FaultEscalation};
use crate::traits::{ActuatorRelease, StatusSink};

/// Receive queue size on the simulated UARTs
pub const SIM_QUEUE: usize = 64;

#[derive(Default)]
struct BusState {
    queues: Vec<VecDeque<u8>>,
    wire: Vec<Vec<u8>>,
}

/// A shared multi-drop bus
#[derive(Clone, Default)]
pub struct SimBus(Rc<RefCell<BusState>>);

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new node and return its UART
    pub fn port(&self) -> SimUart {
        let mut state = self.0.borrow_mut();
        state.queues.push(VecDeque::new());
        SimUart {
            bus: self.clone(),
            index: state.queues.len() - 1,
            configured: None,
            fail_writes: false,
        }
    }

    /// Every write that went out on the wire, in order
    pub fn wire(&self) -> Vec<Vec<u8>> {
        self.0.borrow().wire.clone()
    }
}

/// Serial errors raised on request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

/// One node's UART on a [`SimBus`]
pub struct SimUart {
    bus: SimBus,
    index: usize,
    pub configured: Option<UartConfig>,
    pub fail_writes: bool,
}

impl SimUart {
    /// A UART on a bus of its own, for feeding raw bytes
    pub fn standalone() -> Self {
        SimBus::new().port()
    }

    /// Queue bytes as if they had arrived from the wire
    pub fn inject(&self, bytes: &[u8]) {
        let mut state = self.bus.0.borrow_mut();
        state.queues[self.index].extend(bytes.iter().copied());
    }

    /// Snapshot of this port's receive queue
    pub fn queued(&self) -> Vec<u8> {
        self.bus.0.borrow().queues[self.index].iter().copied().collect()
    }
}

impl ErrorType for SimUart {
    type Error = SimError;
}

impl UartTx for SimUart {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SimError> {
        if self.fail_writes {
            return Err(SimError);
        }
        let mut state = self.bus.0.borrow_mut();
        for (i, queue) in state.queues.iter_mut().enumerate() {
            if i != self.index {
                queue.extend(data.iter().copied());
            }
        }
        state.wire.push(data.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

impl UartRx for SimUart {
    fn available(&self) -> usize {
        self.bus.0.borrow().queues[self.index].len()
    }

    fn peek(&self) -> Option<u8> {
        self.bus.0.borrow().queues[self.index].front().copied()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SimError> {
        Ok(self.bus.0.borrow_mut().queues[self.index].pop_front())
    }

    fn capacity(&self) -> usize {
        SIM_QUEUE
    }
}

impl UartSetup for SimUart {
    fn configure(&mut self, config: &UartConfig) -> Result<(), SimError> {
        self.configured = Some(*config);
        Ok(())
    }
}

/// A digital line shared between its clones
///
/// Every level written is appended to a trace so tests can check the
/// sequence of edges as well as the final level.
#[derive(Clone)]
pub struct SimLine {
    level: Rc<Cell<bool>>,
    trace: Rc<RefCell<Vec<bool>>>,
}

impl SimLine {
    pub fn new(high: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(high)),
            trace: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Drive the line from the test side (not traced)
    pub fn drive(&self, high: bool) {
        self.level.set(high);
    }

    pub fn get(&self) -> bool {
        self.level.get()
    }

    pub fn trace(&self) -> Vec<bool> {
        self.trace.borrow().clone()
    }
}

impl OutputPin for SimLine {
    fn set_high(&mut self) {
        self.level.set(true);
        self.trace.borrow_mut().push(true);
    }

    fn set_low(&mut self) {
        self.level.set(false);
        self.trace.borrow_mut().push(false);
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

impl InputPin for SimLine {
    fn is_high(&self) -> bool {
        self.level.get()
    }
}

/// An input that plays back a script of readings, then holds the last one
pub struct ScriptedInput {
    readings: RefCell<VecDeque<bool>>,
    last: Cell<bool>,
}

impl ScriptedInput {
    pub fn new(readings: &[bool]) -> Self {
        Self {
            readings: RefCell::new(readings.iter().copied().collect()),
            last: Cell::new(true),
        }
    }
}

impl InputPin for ScriptedInput {
    fn is_high(&self) -> bool {
        if let Some(level) = self.readings.borrow_mut().pop_front() {
            self.last.set(level);
        }
        self.last.get()
    }
}

/// Delay that only counts the time it was asked to wait
#[derive(Clone, Default)]
pub struct MockDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns.get() / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
    }
}

/// Escalation for host tests: panics with the fault's debug form
///
/// Pair with `#[should_panic(expected = "...")]`.
#[derive(Debug, Default)]
pub struct PanicEscalation;

impl Escalate for PanicEscalation {
    fn escalate(&mut self, fault: Fault) -> ! {
        panic!("escalated: {:?}", fault)
    }
}

/// Runs the real fault report (release, status line), then panics
///
/// Lets a test observe what the node did on its way down.
pub struct ReportThenPanic<R, S>(pub FaultEscalation<SimLine, SimLine, MockDelay, R, S>);

impl<R: ActuatorRelease, S: StatusSink> ReportThenPanic<R, S> {
    pub fn new(release: R, status: S) -> Self {
        Self(FaultEscalation::new(
            SimLine::new(false),
            SimLine::new(true),
            MockDelay::new(),
            release,
            status,
            PulseTiming::default(),
        ))
    }
}

impl<R: ActuatorRelease, S: StatusSink> Escalate for ReportThenPanic<R, S> {
    fn escalate(&mut self, fault: Fault) -> ! {
        self.0.report(fault);
        panic!("escalated: {:?}", fault)
    }
}

/// Status sink that keeps every line shown
#[derive(Clone, Default)]
pub struct StatusLog(Rc<RefCell<Vec<std::string::String>>>);

impl StatusLog {
    pub fn lines(&self) -> Vec<std::string::String> {
        self.0.borrow().clone()
    }
}

impl StatusSink for StatusLog {
    fn display(&mut self, line: &str) {
        self.0.borrow_mut().push(line.into());
    }
}
