//! Transport error taxonomy
//!
//! The library reports transport failures to the application as strings, so
//! every error has a fixed human-readable message ([`TransportError::as_str`]).

use core::fmt;

/// Which half of an I2C exchange needed the scratch buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Write,
    Read,
}

/// Which transport failed to come up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Link {
    Serial,
    I2c,
}

/// Errors returned by the transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The scratch buffer cannot hold the frame; nothing was put on the bus
    InsufficientMemory(Phase),
    /// The bus rejected a write (NACK, arbitration loss, ...)
    WriteError,
    /// The bus rejected the read transaction
    ReadError,
    /// The card echoed a chunk size other than the one requested.
    /// The link is out of sync; callers should `reset()` rather than retry.
    IncorrectDataAmount { expected: u8, received: u8 },
    /// Chunk larger than the one-byte size field allows
    ChunkTooLarge(usize),
    /// A bounded completion wait expired before the interrupt arrived
    CompletionTimeout,
    /// Peripheral bring-up failed during `reset()`
    Init(Link),
}

impl TransportError {
    /// Message handed to the library
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientMemory(Phase::Write) => "i2c: insufficient memory (write)",
            Self::InsufficientMemory(Phase::Read) => "i2c: insufficient memory (read)",
            Self::WriteError => "i2c: write error",
            Self::ReadError => "i2c: read error",
            Self::IncorrectDataAmount { .. } => "i2c: incorrect amount of data",
            Self::ChunkTooLarge(_) => "i2c: chunk too large",
            Self::CompletionTimeout => "i2c: transfer completion timeout",
            Self::Init(Link::I2c) => "i2c: initialization error",
            Self::Init(Link::Serial) => "serial: initialization error",
        }
    }

    /// Whether the link should be reset before it is used again
    pub const fn needs_reset(&self) -> bool {
        matches!(
            self,
            Self::IncorrectDataAmount { .. } | Self::CompletionTimeout | Self::Init(_)
        )
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
