//! UART serial communication abstractions
//!
//! Provides traits for the blocking, timeout-bounded serial access the
//! Notecard serial transport is built on.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until the driver has accepted all of `data`.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until the transmit FIFO has drained onto the wire
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read into `buf`, waiting at most `timeout_ms` for the first byte
    ///
    /// Returns the number of bytes read; `Ok(0)` means the timeout elapsed
    /// with nothing received.
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Read a single byte, or `None` on timeout
    fn read_byte_timeout(&mut self, timeout_ms: u32) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        match self.read_timeout(&mut buf, timeout_ms)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Full UART driver lifecycle
///
/// A transport that detected a link error tears the driver down completely
/// and rebuilds it, so implementations must support `deinit` followed by a
/// fresh `init`.
pub trait UartDriver: UartTx + UartRx {
    /// Error type for driver bring-up
    type InitError;

    /// Initialize (or re-initialize) the peripheral
    ///
    /// Must apply every field of `config`, including the receive-line
    /// pull-up when [`UartConfig::rx_pullup`] is set.
    fn init(&mut self, config: &UartConfig) -> Result<(), Self::InitError>;

    /// Abort any transmission in flight
    fn abort_tx(&mut self);

    /// Discard everything pending on the receive path
    fn drain_rx(&mut self);

    /// Release the peripheral so `init` can be called again
    fn deinit(&mut self);
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// RTS/CTS hardware flow control
    pub flow_control: bool,
    /// Enable the internal pull-up on RX (boards without an external one)
    pub rx_pullup: bool,
}

impl Default for UartConfig {
    /// The Notecard serial port runs at a fixed 9600 8N1 without flow control
    fn default() -> Self {
        Self {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: false,
            rx_pullup: false,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopBits {
    One,
    Two,
}
