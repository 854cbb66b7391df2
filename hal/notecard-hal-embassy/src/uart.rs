//! UART adapter over `embedded-io`
//!
//! Works with any buffered serial port that can report whether bytes are
//! waiting (`ReadReady`), e.g. embassy's `BufferedUart`.

use embassy_time::{Duration, Instant};
use embedded_io::{Error as _, ErrorKind, Read, ReadReady, Write};
use notecard_hal::{UartConfig, UartDriver, UartRx, UartTx};

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Driver reported malformed data (framing, parity, noise)
    InvalidData,
    /// Driver-level timeout
    Timeout,
    /// Write accepted zero bytes
    WriteZero,
    /// The `open` closure could not build the driver
    Open,
    /// Used before `init` or after `deinit`
    NotInitialized,
    /// Other error
    Other,
}

impl From<ErrorKind> for UartBusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidData => UartBusError::InvalidData,
            ErrorKind::TimedOut => UartBusError::Timeout,
            ErrorKind::WriteZero => UartBusError::WriteZero,
            _ => UartBusError::Other,
        }
    }
}

/// [`UartDriver`] over an `embedded-io` port
///
/// `open` builds a fresh driver from the transport's configuration, including
/// the RX pull-up when requested. It runs on every `init`.
pub struct IoUart<P, F> {
    open: F,
    port: Option<P>,
}

impl<P, F, E> IoUart<P, F>
where
    P: Read + Write + ReadReady,
    F: FnMut(&UartConfig) -> Result<P, E>,
{
    /// Create the adapter; the port is not opened until `init`
    pub fn new(open: F) -> Self {
        Self { open, port: None }
    }

    /// Whether a driver is currently open
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port(&mut self) -> Result<&mut P, UartBusError> {
        self.port.as_mut().ok_or(UartBusError::NotInitialized)
    }
}

impl<P, F, E> UartTx for IoUart<P, F>
where
    P: Read + Write + ReadReady,
    F: FnMut(&UartConfig) -> Result<P, E>,
{
    type Error = UartBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartBusError> {
        self.port()?
            .write_all(data)
            .map_err(|e| UartBusError::from(e.kind()))
    }

    fn flush(&mut self) -> Result<(), UartBusError> {
        self.port()?
            .flush()
            .map_err(|e| UartBusError::from(e.kind()))
    }
}

impl<P, F, E> UartRx for IoUart<P, F>
where
    P: Read + Write + ReadReady,
    F: FnMut(&UartConfig) -> Result<P, E>,
{
    type Error = UartBusError;

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, UartBusError> {
        let port = self.port()?;
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));

        loop {
            if port.read_ready().map_err(|e| UartBusError::from(e.kind()))? {
                return port.read(buf).map_err(|e| UartBusError::from(e.kind()));
            }
            if Instant::now() >= deadline {
                return Ok(0);
            }
        }
    }
}

impl<P, F, E> UartDriver for IoUart<P, F>
where
    P: Read + Write + ReadReady,
    F: FnMut(&UartConfig) -> Result<P, E>,
{
    type InitError = UartBusError;

    fn init(&mut self, config: &UartConfig) -> Result<(), UartBusError> {
        let port = (self.open)(config).map_err(|_| UartBusError::Open)?;
        self.port = Some(port);
        Ok(())
    }

    fn abort_tx(&mut self) {
        // embedded-io has no abort; queued TX bytes are dropped with the
        // driver in deinit()
    }

    fn drain_rx(&mut self) {
        let Some(port) = self.port.as_mut() else {
            return;
        };
        let mut junk = [0u8; 16];
        while let Ok(true) = port.read_ready() {
            if !matches!(port.read(&mut junk), Ok(n) if n > 0) {
                break;
            }
        }
    }

    fn deinit(&mut self) {
        self.port = None;
    }
}
