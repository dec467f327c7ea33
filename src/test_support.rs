// Recording bus and delay shared by the unit tests. Both halves push into one log so the
// interleaving of transfers and waits can be asserted.
extern crate std;

use std::{cell::RefCell, rc::Rc, vec::Vec};

use embedded_hal::{
    delay::DelayNs,
    i2c::{self, ErrorKind, NoAcknowledgeSource, Operation},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// address-only write, and whether it was acknowledged
    Probe(u8, bool),
    Write(u8, Vec<u8>),
    DelayMs(u32),
    DelayUs(u32),
    DelayNs(u32),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

#[derive(Debug)]
pub struct RecordingBus {
    log: EventLog,
    refused_probes: usize,
    probe_budget: Option<usize>,
    fail_bursts: bool,
}

impl RecordingBus {
    /// Refuses the next `count` probes, then acknowledges every probe after that.
    pub fn refuse_probes(&mut self, count: usize) {
        self.refused_probes = count;
    }

    /// Acknowledges the next `probes` probes, then refuses every probe after that.
    pub fn go_quiet_after(&mut self, probes: usize) {
        self.probe_budget = Some(probes);
    }

    pub fn fail_bursts(&mut self, fail: bool) {
        self.fail_bursts = fail;
    }
}

impl i2c::ErrorType for RecordingBus {
    type Error = ErrorKind;
}

impl i2c::I2c for RecordingBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(bytes) if bytes.is_empty() => {
                    let acked = self.refused_probes == 0 && self.probe_budget != Some(0);
                    self.log.borrow_mut().push(Event::Probe(address, acked));
                    if !acked {
                        self.refused_probes = self.refused_probes.saturating_sub(1);
                        return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
                    }
                    if let Some(budget) = self.probe_budget.as_mut() {
                        *budget -= 1;
                    }
                }
                Operation::Write(bytes) => {
                    self.log
                        .borrow_mut()
                        .push(Event::Write(address, bytes.to_vec()));
                    if self.fail_bursts {
                        return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
                    }
                }
                Operation::Read(_) => return Err(ErrorKind::Other),
            }
        }
        Ok(())
    }
}

pub struct RecordingDelay {
    log: EventLog,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

/// A bus that acknowledges everything, a delay, and the log both write to.
pub fn recording() -> (RecordingBus, RecordingDelay, EventLog) {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    (
        RecordingBus {
            log: log.clone(),
            refused_probes: 0,
            probe_budget: None,
            fail_bursts: false,
        },
        RecordingDelay { log: log.clone() },
        log,
    )
}

/// The bursts written so far, in order.
pub fn bursts(log: &EventLog) -> Vec<Vec<u8>> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Write(_, bytes) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}
