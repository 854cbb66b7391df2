//! Chunked I2C transport
//!
//! The Notecard exposes its serial request/response stream over I2C in
//! chunks of at most 255 bytes. Every transaction is length-prefixed:
//!
//! - **write**: `[size][payload]` in a single bus write
//! - **read**: a `[0x00, size]` request write, followed by a bus read of
//!   `size + 2` bytes: `[available][size][payload]`
//!
//! `available` is how many more bytes the card has queued, which tells the
//! library whether to come back for another chunk. The echoed `size` must
//! match what was asked for; anything else means host and card disagree on
//! where a frame starts, and only a reset fixes that.
//!
//! The request write is retried a few times because a NACKed request moved
//! no data and is harmless to repeat. Nothing else is retried here.

use heapless::Vec;
use notecard_hal::I2cBus;

use crate::config::{I2cTransportConfig, DEFAULT_SCRATCH_CAPACITY, NOTE_I2C_MAX_MAX};
use crate::error::{Link, Phase, TransportError};
use crate::signal::{Completion, Idle, SpinIdle};
use crate::LinkState;

/// Bytes preceding the payload in a read response
pub const READ_HEADER_LEN: usize = 2;

/// Notecard I2C transport over an [`I2cBus`]
///
/// `N` is the capacity of the scratch buffer used to frame writes and
/// receive responses; a chunk that does not fit fails with
/// [`TransportError::InsufficientMemory`] before anything is sent.
#[derive(Debug)]
pub struct I2cTransport<'a, B, I = SpinIdle, const N: usize = DEFAULT_SCRATCH_CAPACITY> {
    bus: B,
    config: I2cTransportConfig,
    state: LinkState,
    completion: Completion<'a>,
    idle: I,
    scratch: Vec<u8, N>,
}

impl<'a, B: I2cBus> I2cTransport<'a, B> {
    /// Transport over a polled driver whose calls complete synchronously
    pub fn new(bus: B, config: I2cTransportConfig) -> Self {
        Self::with_completion(bus, config, Completion::Synchronous, SpinIdle)
    }
}

impl<'a, B: I2cBus, I: Idle> I2cTransport<'a, B, I> {
    /// Transport with an explicit completion mode and idle strategy
    pub fn with_completion(
        bus: B,
        config: I2cTransportConfig,
        completion: Completion<'a>,
        idle: I,
    ) -> Self {
        Self::with_scratch(bus, config, completion, idle)
    }
}

impl<'a, B: I2cBus, I: Idle, const N: usize> I2cTransport<'a, B, I, N> {
    /// Transport with a scratch buffer of `N` bytes instead of the default
    pub fn with_scratch(
        bus: B,
        config: I2cTransportConfig,
        completion: Completion<'a>,
        idle: I,
    ) -> Self {
        Self {
            bus,
            config,
            state: LinkState::Uninitialized,
            completion,
            idle,
            scratch: Vec::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Transport configuration
    pub fn config(&self) -> &I2cTransportConfig {
        &self.config
    }

    /// Underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the underlying bus
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// (Re)initialize and enable the bus
    ///
    /// After the first call the peripheral is de-initialized before being
    /// brought up again, so this is the recovery path after any bus fault.
    pub fn reset(&mut self) -> Result<(), TransportError> {
        if self.state == LinkState::Ready {
            #[cfg(feature = "defmt")]
            defmt::debug!("i2c: tearing down bus for reset");
            self.bus.deinit();
            self.state = LinkState::Uninitialized;
        }

        if self.bus.init(&self.config.bus).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("i2c: bus init failed");
            return Err(TransportError::Init(Link::I2c));
        }
        self.bus.enable();

        self.state = LinkState::Ready;
        #[cfg(feature = "defmt")]
        defmt::debug!("i2c: ready at {} Hz", self.config.bus.frequency);
        Ok(())
    }

    fn ensure_ready(&mut self) -> Result<(), TransportError> {
        match self.state {
            LinkState::Ready => Ok(()),
            LinkState::Uninitialized => self.reset(),
        }
    }

    /// Send one chunk to the card at `address`
    ///
    /// Issues exactly one bus write of `1 + payload.len()` bytes. A failed
    /// write is reported, not retried.
    pub fn transmit(&mut self, address: u8, payload: &[u8]) -> Result<(), TransportError> {
        self.ensure_ready()?;
        let size = chunk_size(payload.len())?;

        self.scratch.clear();
        if self.scratch.push(size).is_err() || self.scratch.extend_from_slice(payload).is_err() {
            return Err(TransportError::InsufficientMemory(Phase::Write));
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("i2c tx: {=[u8]:x}", &self.scratch[..]);

        self.completion.arm();
        if self.bus.write(address, &self.scratch).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("i2c: write of {} bytes failed", self.scratch.len());
            return Err(TransportError::WriteError);
        }
        self.completion.wait(&mut self.idle)
    }

    /// Fetch one chunk of `buffer.len()` bytes from the card at `address`
    ///
    /// Returns the number of bytes the card still has queued after this
    /// chunk. `buffer` is only written when the whole exchange succeeds.
    /// An empty `buffer` is a pure "how much is queued?" query.
    pub fn receive(&mut self, address: u8, buffer: &mut [u8]) -> Result<u8, TransportError> {
        self.ensure_ready()?;
        let size = chunk_size(buffer.len())?;

        self.scratch.clear();
        if self
            .scratch
            .resize(buffer.len() + READ_HEADER_LEN, 0)
            .is_err()
        {
            return Err(TransportError::InsufficientMemory(Phase::Read));
        }

        self.request(address, size)?;

        self.completion.arm();
        if self.bus.read(address, &mut self.scratch).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("i2c: read of {} bytes failed", self.scratch.len());
            return Err(TransportError::ReadError);
        }
        self.completion.wait(&mut self.idle)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("i2c rx: {=[u8]:x}", &self.scratch[..]);

        let available = self.scratch[0];
        let echoed = self.scratch[1];
        if echoed != size {
            #[cfg(feature = "defmt")]
            defmt::warn!("i2c: asked for {} bytes, card answered {}", size, echoed);
            return Err(TransportError::IncorrectDataAmount {
                expected: size,
                received: echoed,
            });
        }

        buffer.copy_from_slice(&self.scratch[READ_HEADER_LEN..]);
        Ok(available)
    }

    /// Ask the card to stage `size` bytes for the next read
    fn request(&mut self, address: u8, size: u8) -> Result<(), TransportError> {
        let frame = [0x00, size];

        for _ in 0..self.config.request_attempts.max(1) {
            self.completion.arm();
            if self.bus.write(address, &frame).is_ok() {
                return self.completion.wait(&mut self.idle);
            }
            #[cfg(feature = "defmt")]
            defmt::warn!("i2c: read request to {=u8:#x} not acknowledged", address);
        }

        Err(TransportError::WriteError)
    }
}

/// Size byte for a chunk of `len` bytes
fn chunk_size(len: usize) -> Result<u8, TransportError> {
    if len > NOTE_I2C_MAX_MAX {
        return Err(TransportError::ChunkTooLarge(len));
    }
    Ok(len as u8)
}
