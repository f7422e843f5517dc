//! Mock transport, pins and delay shared by the integration tests.
//!
//! Every mock appends to one shared [`Trace`], so a test can assert the
//! exact interleaving of bus frames, delays and pin edges.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use codec_audio_fw::codec::{BusFault, ControlBus};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write { device: u8, bytes: Vec<u8> },
    Read { device: u8, bytes: Vec<u8>, len: usize },
    WriteFailed { device: u8, bytes: Vec<u8> },
    ReadFailed { device: u8, bytes: Vec<u8> },
    BusReset,
    DelayMs(u32),
    DelayUs(u32),
    DelayNs(u32),
    Pin { name: &'static str, high: bool },
}

pub type Trace = Rc<RefCell<Vec<Event>>>;

pub fn trace() -> Trace {
    Rc::new(RefCell::new(Vec::new()))
}

/// Completed write frames, in order.
pub fn writes(trace: &Trace) -> Vec<Vec<u8>> {
    trace
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Write { bytes, .. } => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}

pub fn count(trace: &Trace, pred: impl Fn(&Event) -> bool) -> usize {
    trace.borrow().iter().filter(|e| pred(e)).count()
}

/// Scripted I2C transport.
pub struct MockBus {
    trace: Trace,
    /// (frame prefix, remaining failures)
    fail_on: Vec<(Vec<u8>, u32)>,
    fail_all: bool,
    responses: HashMap<Vec<u8>, Vec<u8>>,
}

impl MockBus {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            fail_on: Vec::new(),
            fail_all: false,
            responses: HashMap::new(),
        }
    }

    /// The next `times` transfers whose bytes start with `prefix` fail.
    pub fn fail_frames(mut self, prefix: &[u8], times: u32) -> Self {
        self.fail_on.push((prefix.to_vec(), times));
        self
    }

    /// Every transfer fails (device absent).
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Reply to a read whose address frame is `address` with `data`.
    pub fn respond(mut self, address: &[u8], data: &[u8]) -> Self {
        self.responses.insert(address.to_vec(), data.to_vec());
        self
    }

    fn should_fail(&mut self, bytes: &[u8]) -> bool {
        if self.fail_all {
            return true;
        }
        for (prefix, remaining) in &mut self.fail_on {
            if *remaining > 0 && bytes.starts_with(prefix) {
                *remaining -= 1;
                return true;
            }
        }
        false
    }
}

impl ControlBus for MockBus {
    fn write(&mut self, device: u8, bytes: &[u8]) -> Result<(), BusFault> {
        let bytes = bytes.to_vec();
        if self.should_fail(&bytes) {
            self.trace.borrow_mut().push(Event::WriteFailed { device, bytes });
            return Err(BusFault);
        }
        self.trace.borrow_mut().push(Event::Write { device, bytes });
        Ok(())
    }

    fn write_read(&mut self, device: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusFault> {
        let address = bytes.to_vec();
        if self.should_fail(&address) {
            self.trace
                .borrow_mut()
                .push(Event::ReadFailed { device, bytes: address });
            return Err(BusFault);
        }
        buffer.fill(0);
        if let Some(data) = self.responses.get(&address) {
            let n = data.len().min(buffer.len());
            buffer[..n].copy_from_slice(&data[..n]);
        }
        self.trace.borrow_mut().push(Event::Read {
            device,
            bytes: address,
            len: buffer.len(),
        });
        Ok(())
    }

    fn reset(&mut self) {
        self.trace.borrow_mut().push(Event::BusReset);
    }
}

/// Delay that records instead of sleeping.
pub struct MockDelay {
    trace: Trace,
}

impl MockDelay {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.trace.borrow_mut().push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.trace.borrow_mut().push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.trace.borrow_mut().push(Event::DelayMs(ms));
    }
}

/// Output pin that records every level change.
pub struct MockPin {
    name: &'static str,
    trace: Trace,
    broken: bool,
}

impl MockPin {
    pub fn new(name: &'static str, trace: &Trace) -> Self {
        Self {
            name,
            trace: trace.clone(),
            broken: false,
        }
    }

    /// A pin whose driver rejects every call.
    pub fn broken(name: &'static str, trace: &Trace) -> Self {
        Self {
            broken: true,
            ..Self::new(name, trace)
        }
    }

    fn set(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.broken {
            return Err(ErrorKind::Other);
        }
        self.trace.borrow_mut().push(Event::Pin {
            name: self.name,
            high,
        });
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
}
