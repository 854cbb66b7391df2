//! Transport configuration
//!
//! Board bring-up picks one of these at compile time; all fields have
//! defaults matching the Notecard's documented interface.

use notecard_hal::{I2cConfig, UartConfig};

/// Period of the coarse I/O timeout clock
pub const TICK_MS: u32 = 100;

/// Default 7-bit I2C address of the Notecard
pub const NOTE_I2C_ADDR_DEFAULT: u8 = 0x17;

/// Default maximum payload per I2C chunk
pub const NOTE_I2C_MAX_DEFAULT: u8 = 30;

/// Largest chunk the one-byte size field can describe
pub const NOTE_I2C_MAX_MAX: usize = u8::MAX as usize;

/// Scratch capacity that fits any chunk plus the 2-byte read header
pub const DEFAULT_SCRATCH_CAPACITY: usize = NOTE_I2C_MAX_MAX + 2;

/// Serial transport settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialTransportConfig {
    /// Peripheral settings
    pub uart: UartConfig,
    /// Read timeout for the `available()` look-ahead; keep it short, the
    /// library polls in a tight loop
    pub poll_timeout_ms: u32,
    /// Read timeout per attempt inside the blocking `receive()`
    pub receive_timeout_ms: u32,
}

impl Default for SerialTransportConfig {
    fn default() -> Self {
        Self {
            uart: UartConfig::default(),
            poll_timeout_ms: 1,
            receive_timeout_ms: 1000,
        }
    }
}

/// I2C transport settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cTransportConfig {
    /// Peripheral settings
    pub bus: I2cConfig,
    /// Card address registered with the library
    pub address: u8,
    /// Maximum chunk size registered with the library
    pub max_chunk: u8,
    /// Attempts at the read-request write before giving up
    pub request_attempts: u8,
}

impl Default for I2cTransportConfig {
    fn default() -> Self {
        Self {
            bus: I2cConfig::STANDARD,
            address: NOTE_I2C_ADDR_DEFAULT,
            max_chunk: NOTE_I2C_MAX_DEFAULT,
            request_attempts: 3,
        }
    }
}
