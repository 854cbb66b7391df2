//! I2C bus abstractions
//!
//! Provides the I2C master operations the chunked Notecard transport needs,
//! including the driver lifecycle so a transport can tear the peripheral
//! down and bring it back after a bus fault.

/// I2C bus master
///
/// `write` and `read` *issue* a transaction. A polled driver returns once the
/// transfer is finished and never touches the completion signal.
///
/// An interrupt-driven driver reports the end of every transfer through the
/// completion signal its owner wired into the peripheral interrupt. The
/// slices are only borrowed for the duration of the call, so:
///
/// - `write` may return early only after copying `data` into a transfer
///   buffer the driver owns
/// - `read` must not return before the received bytes are in `buf`; it may
///   wait on the same completion signal itself, which leaves the signal set
///   for the caller's own wait
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Initialize (or re-initialize) the peripheral
    fn init(&mut self, config: &I2cConfig) -> Result<(), Self::Error>;

    /// Enable the peripheral after `init`
    fn enable(&mut self) {}

    /// Release the peripheral so `init` can be called again
    fn deinit(&mut self);

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz), what the Notecard is specified for
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}
