//! Scripted peripherals for host tests

use std::collections::VecDeque;
use std::time::Duration;
use std::vec::Vec;

use notecard_hal::{I2cBus, I2cConfig, UartConfig, UartDriver, UartRx, UartTx};

use crate::signal::{BusEvent, CompletionSignal};

/// Bus-level failure reported by the mocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Scripted I2C bus
#[derive(Debug, Default)]
pub struct MockBus {
    /// Number of writes issued, failed or not
    pub write_attempts: usize,
    /// Writes the bus accepted
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Lengths of every read issued
    pub reads: Vec<(u8, usize)>,
    /// Fail this many upcoming writes
    pub fail_writes: usize,
    /// Fail this many upcoming reads
    pub fail_reads: usize,
    /// Raw response bytes returned by successive reads
    pub responses: VecDeque<Vec<u8>>,
    pub fail_init: bool,
    pub inits: Vec<I2cConfig>,
    pub enables: usize,
    pub deinits: usize,
    pub initialized: bool,
    /// Interrupt-driven mode: complete transfers from another thread
    pub irq: Option<&'static CompletionSignal>,
    /// Flag state observed at the moment each transfer was issued
    pub complete_at_issue: Vec<bool>,
    /// Signal completion before `write`/`read` return instead of later
    pub completes_in_call: bool,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt_driven(signal: &'static CompletionSignal) -> Self {
        Self {
            irq: Some(signal),
            ..Self::default()
        }
    }

    /// Queue a well-formed read response
    pub fn respond(&mut self, available: u8, payload: &[u8]) {
        let mut raw = vec![available, payload.len() as u8];
        raw.extend_from_slice(payload);
        self.responses.push_back(raw);
    }

    fn issue(&mut self) {
        if let Some(signal) = self.irq {
            self.complete_at_issue.push(signal.is_complete());
            if self.completes_in_call {
                signal.on_event(BusEvent::Done);
                return;
            }
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(1));
                signal.on_event(BusEvent::Done);
            });
        }
    }
}

impl I2cBus for MockBus {
    type Error = MockError;

    fn init(&mut self, config: &I2cConfig) -> Result<(), MockError> {
        assert!(!self.initialized, "init without deinit");
        self.inits.push(*config);
        if self.fail_init {
            return Err(MockError);
        }
        self.initialized = true;
        Ok(())
    }

    fn enable(&mut self) {
        self.enables += 1;
    }

    fn deinit(&mut self) {
        self.deinits += 1;
        self.initialized = false;
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), MockError> {
        assert!(self.initialized, "write on uninitialized bus");
        self.write_attempts += 1;
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(MockError);
        }
        self.writes.push((address, data.to_vec()));
        self.issue();
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), MockError> {
        assert!(self.initialized, "read on uninitialized bus");
        self.reads.push((address, buf.len()));
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(MockError);
        }
        let raw = self.responses.pop_front().unwrap_or_default();
        buf.fill(0);
        let n = raw.len().min(buf.len());
        buf[..n].copy_from_slice(&raw[..n]);
        self.issue();
        Ok(())
    }
}

/// One scripted outcome of a UART read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rx {
    Byte(u8),
    Timeout,
    Error,
}

/// Scripted UART
#[derive(Debug, Default)]
pub struct MockUart {
    /// Outcomes for successive reads; an empty script times out
    pub script: VecDeque<Rx>,
    /// Timeout passed to every read
    pub read_timeouts: Vec<u32>,
    pub written: Vec<u8>,
    pub flushes: usize,
    pub fail_writes: bool,
    pub fail_init: bool,
    pub inits: Vec<UartConfig>,
    pub aborts: usize,
    pub drains: usize,
    pub deinits: usize,
    pub initialized: bool,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: &[Rx]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl UartTx for MockUart {
    type Error = MockError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), MockError> {
        assert!(self.initialized, "write on uninitialized uart");
        if self.fail_writes {
            return Err(MockError);
        }
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockError> {
        self.flushes += 1;
        Ok(())
    }
}

impl UartRx for MockUart {
    type Error = MockError;

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, MockError> {
        assert!(self.initialized, "read on uninitialized uart");
        self.read_timeouts.push(timeout_ms);
        match self.script.pop_front().unwrap_or(Rx::Timeout) {
            Rx::Byte(b) => {
                buf[0] = b;
                Ok(1)
            }
            Rx::Timeout => Ok(0),
            Rx::Error => Err(MockError),
        }
    }
}

impl UartDriver for MockUart {
    type InitError = MockError;

    fn init(&mut self, config: &UartConfig) -> Result<(), MockError> {
        assert!(!self.initialized, "init without deinit");
        self.inits.push(*config);
        if self.fail_init {
            return Err(MockError);
        }
        self.initialized = true;
        Ok(())
    }

    fn abort_tx(&mut self) {
        self.aborts += 1;
    }

    fn drain_rx(&mut self) {
        self.drains += 1;
    }

    fn deinit(&mut self) {
        self.deinits += 1;
        self.initialized = false;
    }
}
