//! I2C adapter over `embedded-hal`
//!
//! `embedded_hal::i2c::I2c` calls return once the transfer is over, so
//! transports built on [`HalI2c`] use `Completion::Synchronous`.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use notecard_hal::{I2cBus, I2cConfig};

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// Address not acknowledged (card asleep or wrong address)
    AddressNack,
    /// Data byte not acknowledged
    DataNack,
    /// Overrun
    Overrun,
    /// The `open` closure could not build the driver
    Open,
    /// Used before `init` or after `deinit`
    NotInitialized,
    /// Other error
    Other,
}

impl From<ErrorKind> for I2cBusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Bus => I2cBusError::Bus,
            ErrorKind::ArbitrationLoss => I2cBusError::ArbitrationLost,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => I2cBusError::DataNack,
            ErrorKind::NoAcknowledge(_) => I2cBusError::AddressNack,
            ErrorKind::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}

/// [`I2cBus`] over an `embedded-hal` I2C master
///
/// `open` builds a fresh driver at the configured frequency; it runs on every
/// `init`, and `deinit` drops the driver.
pub struct HalI2c<B, F> {
    open: F,
    bus: Option<B>,
}

impl<B, F, E> HalI2c<B, F>
where
    B: I2c,
    F: FnMut(&I2cConfig) -> Result<B, E>,
{
    /// Create the adapter; the bus is not opened until `init`
    pub fn new(open: F) -> Self {
        Self { open, bus: None }
    }

    fn bus(&mut self) -> Result<&mut B, I2cBusError> {
        self.bus.as_mut().ok_or(I2cBusError::NotInitialized)
    }
}

impl<B, F, E> I2cBus for HalI2c<B, F>
where
    B: I2c,
    F: FnMut(&I2cConfig) -> Result<B, E>,
{
    type Error = I2cBusError;

    fn init(&mut self, config: &I2cConfig) -> Result<(), I2cBusError> {
        let bus = (self.open)(config).map_err(|_| I2cBusError::Open)?;
        self.bus = Some(bus);
        Ok(())
    }

    fn deinit(&mut self) {
        self.bus = None;
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cBusError> {
        self.bus()?
            .write(address, data)
            .map_err(|e| I2cBusError::from(e.kind()))
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cBusError> {
        self.bus()?
            .read(address, buf)
            .map_err(|e| I2cBusError::from(e.kind()))
    }
}
