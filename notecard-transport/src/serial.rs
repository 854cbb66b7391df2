//! Serial (UART) transport
//!
//! The Notecard speaks a raw byte stream over its UART; all framing is the
//! library's business. The library needs four primitives from us:
//!
//! - `reset` - hard re-initialization of the link
//! - `transmit` - blocking write, optionally waiting for the FIFO to drain
//! - `available` - cheap "is there a byte?" poll with a one-byte look-ahead
//! - `receive` - blocking single-byte read that never gives up
//!
//! `available` has to read a byte to answer the question, so the byte is
//! parked in the look-ahead slot until `receive` picks it up.

use notecard_hal::{UartDriver, UartRx, UartTx};

use crate::config::SerialTransportConfig;
use crate::error::{Link, TransportError};
use crate::LinkState;

/// Notecard serial transport over a [`UartDriver`]
#[derive(Debug)]
pub struct SerialTransport<U> {
    uart: U,
    config: SerialTransportConfig,
    state: LinkState,
    /// Byte read by `available()` and not yet handed out by `receive()`
    lookahead: Option<u8>,
}

impl<U: UartDriver> SerialTransport<U> {
    /// Wrap a UART driver; nothing touches the hardware until `reset()`
    pub fn new(uart: U, config: SerialTransportConfig) -> Self {
        Self {
            uart,
            config,
            state: LinkState::Uninitialized,
            lookahead: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Transport configuration
    pub fn config(&self) -> &SerialTransportConfig {
        &self.config
    }

    /// Underlying driver
    pub fn uart(&self) -> &U {
        &self.uart
    }

    /// Release the underlying driver
    pub fn into_inner(self) -> U {
        self.uart
    }

    /// (Re)initialize the link
    ///
    /// The first call just brings the UART up. Later calls are made after an
    /// I/O error, when the link may be in any state, so they abort the
    /// transmitter, drain the receiver and tear the driver down before
    /// bringing it up again. Any byte parked by `available()` is discarded.
    pub fn reset(&mut self) -> Result<(), TransportError> {
        if self.state == LinkState::Ready {
            #[cfg(feature = "defmt")]
            defmt::debug!("serial: tearing down link for reset");
            self.uart.abort_tx();
            self.uart.drain_rx();
            self.uart.deinit();
            self.state = LinkState::Uninitialized;
        }
        self.lookahead = None;

        if self.uart.init(&self.config.uart).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial: UART init failed");
            return Err(TransportError::Init(Link::Serial));
        }

        self.state = LinkState::Ready;
        #[cfg(feature = "defmt")]
        defmt::debug!("serial: ready at {} baud", self.config.uart.baudrate);
        Ok(())
    }

    /// Make sure the link is up before touching the driver
    fn ensure_ready(&mut self) -> bool {
        self.state == LinkState::Ready || self.reset().is_ok()
    }

    /// Write `data`, blocking until the driver has accepted it
    ///
    /// With `flush` set, also blocks until the transmit FIFO has drained.
    /// Driver errors are not reported; the library detects the resulting
    /// missing response through its own timeouts.
    pub fn transmit(&mut self, data: &[u8], flush: bool) {
        if !self.ensure_ready() {
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("serial tx: {=[u8]:x}", data);

        if self.uart.write_blocking(data).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial: write of {} bytes failed", data.len());
            return;
        }
        if flush && self.uart.flush().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial: flush failed");
        }
    }

    /// Whether a byte is ready for `receive()`
    ///
    /// Waits at most `poll_timeout_ms` for one, so it is safe to call in a
    /// tight loop.
    pub fn available(&mut self) -> bool {
        if self.lookahead.is_some() {
            return true;
        }
        if !self.ensure_ready() {
            return false;
        }

        if let Ok(Some(byte)) = self.uart.read_byte_timeout(self.config.poll_timeout_ms) {
            self.lookahead = Some(byte);
        }
        self.lookahead.is_some()
    }

    /// Return the next byte, blocking until one arrives
    ///
    /// Never times out; timeout policy lives in the library.
    pub fn receive(&mut self) -> u8 {
        if let Some(byte) = self.lookahead.take() {
            return byte;
        }

        loop {
            if !self.ensure_ready() {
                continue;
            }
            match self.uart.read_byte_timeout(self.config.receive_timeout_ms) {
                Ok(Some(byte)) => return byte,
                Ok(None) => {}
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("serial: read error while waiting for byte");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockUart, Rx};

    fn transport(uart: MockUart) -> SerialTransport<MockUart> {
        let mut transport = SerialTransport::new(uart, SerialTransportConfig::default());
        transport.reset().unwrap();
        transport
    }

    #[test]
    fn test_first_reset_only_initializes() {
        let mut transport = SerialTransport::new(MockUart::new(), SerialTransportConfig::default());
        assert_eq!(transport.state(), LinkState::Uninitialized);

        transport.reset().unwrap();

        let uart = transport.uart();
        assert_eq!(transport.state(), LinkState::Ready);
        assert_eq!(uart.inits.len(), 1);
        assert_eq!(uart.aborts, 0);
        assert_eq!(uart.drains, 0);
        assert_eq!(uart.deinits, 0);
    }

    #[test]
    fn test_second_reset_tears_down_and_stays_usable() {
        let mut transport = transport(MockUart::with_script(&[Rx::Byte(b'{')]));
        transport.reset().unwrap();

        {
            let uart = transport.uart();
            assert_eq!(transport.state(), LinkState::Ready);
            assert_eq!(uart.inits.len(), 2);
            assert_eq!(uart.aborts, 1);
            assert_eq!(uart.drains, 1);
            assert_eq!(uart.deinits, 1);
        }

        transport.transmit(b"{}\n", false);
        assert_eq!(transport.receive(), b'{');
        assert_eq!(transport.uart().written, b"{}\n");
    }

    #[test]
    fn test_reset_applies_rx_pullup_every_time() {
        let mut config = SerialTransportConfig::default();
        config.uart.rx_pullup = true;
        let mut transport = SerialTransport::new(MockUart::new(), config);

        transport.reset().unwrap();
        transport.reset().unwrap();

        assert!(transport.uart().inits.iter().all(|c| c.rx_pullup));
    }

    #[test]
    fn test_failed_init_leaves_uninitialized() {
        let mut uart = MockUart::new();
        uart.fail_init = true;
        let mut transport = SerialTransport::new(uart, SerialTransportConfig::default());

        assert_eq!(transport.reset(), Err(TransportError::Init(Link::Serial)));
        assert_eq!(transport.state(), LinkState::Uninitialized);
        assert!(!transport.available());
    }

    #[test]
    fn test_reset_discards_lookahead() {
        let mut transport = transport(MockUart::with_script(&[Rx::Byte(b'x')]));
        assert!(transport.available());

        transport.reset().unwrap();

        assert!(!transport.available());
    }

    #[test]
    fn test_transmit_flushes_only_when_asked() {
        let mut transport = transport(MockUart::new());

        transport.transmit(b"{\"req\":", false);
        assert_eq!(transport.uart().flushes, 0);

        transport.transmit(b"\"card.version\"}\n", true);
        assert_eq!(transport.uart().flushes, 1);
        assert_eq!(transport.uart().written, b"{\"req\":\"card.version\"}\n");
    }

    #[test]
    fn test_transmit_error_is_swallowed() {
        let mut uart = MockUart::new();
        uart.fail_writes = true;
        let mut transport = transport(uart);

        transport.transmit(b"lost", true);

        assert_eq!(transport.uart().flushes, 0);
        assert_eq!(transport.state(), LinkState::Ready);
    }

    #[test]
    fn test_available_twice_without_data() {
        let mut transport = transport(MockUart::new());

        assert!(!transport.available());
        assert!(!transport.available());

        let poll = transport.config().poll_timeout_ms;
        assert_eq!(transport.uart().read_timeouts, vec![poll, poll]);
    }

    #[test]
    fn test_available_buffers_single_byte() {
        let mut transport = transport(MockUart::with_script(&[Rx::Byte(b'a'), Rx::Byte(b'b')]));

        assert!(transport.available());
        // Already buffered, no second read
        assert!(transport.available());
        assert_eq!(transport.uart().read_timeouts.len(), 1);

        assert_eq!(transport.receive(), b'a');
        assert!(transport.available());
        assert_eq!(transport.receive(), b'b');
        assert!(!transport.available());
    }

    #[test]
    fn test_available_treats_error_as_nothing() {
        let mut transport = transport(MockUart::with_script(&[Rx::Error, Rx::Byte(b'z')]));

        assert!(!transport.available());
        assert!(transport.available());
        assert_eq!(transport.receive(), b'z');
    }

    #[test]
    fn test_receive_blocks_until_delayed_byte() {
        let mut transport = transport(MockUart::with_script(&[
            Rx::Timeout,
            Rx::Error,
            Rx::Timeout,
            Rx::Byte(b'\n'),
        ]));

        assert_eq!(transport.receive(), b'\n');

        let long = transport.config().receive_timeout_ms;
        assert_eq!(transport.uart().read_timeouts, vec![long; 4]);

        // Delivered exactly once
        assert!(!transport.available());
    }

    #[test]
    fn test_first_use_resets_lazily() {
        let mut transport =
            SerialTransport::new(MockUart::with_script(&[Rx::Byte(1)]), SerialTransportConfig::default());

        assert!(transport.available());
        assert_eq!(transport.state(), LinkState::Ready);
        assert_eq!(transport.uart().inits.len(), 1);
    }
}
