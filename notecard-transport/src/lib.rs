//! Notecard transports
//!
//! Byte delivery between a host MCU and a Notecard for the Notecard
//! request/response library. The library owns message framing, JSON and
//! protocol-level retries; this crate only moves bytes, over one of:
//!
//! - [`serial::SerialTransport`] - raw UART byte stream with a one-byte
//!   look-ahead
//! - [`i2c::I2cTransport`] - the Notecard chunked I2C protocol
//!
//! # I2C wire format
//!
//! ```text
//! write         ┌──────┬──────────────┐
//!               │ SIZE │ PAYLOAD      │
//!               └──────┴──────────────┘
//! read request  ┌──────┬──────┐
//!               │ 0x00 │ SIZE │
//!               └──────┴──────┘
//! read response ┌───────┬──────┬──────────────┐
//!               │ AVAIL │ SIZE │ PAYLOAD      │
//!               └───────┴──────┴──────────────┘
//! ```
//!
//! Supporting pieces:
//!
//! - [`clock::MillisClock`] - tick-driven millisecond counter for timeouts
//! - [`signal::CompletionSignal`] - turns a bus completion interrupt into a
//!   blocking wait
//! - [`registration`] - hands the platform hooks and exactly one transport to
//!   the library

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod error;
pub mod i2c;
pub mod registration;
pub mod serial;
pub mod signal;

#[cfg(test)]
mod mock;

pub use clock::MillisClock;
pub use config::{I2cTransportConfig, SerialTransportConfig};
pub use error::{Link, Phase, TransportError};
pub use i2c::I2cTransport;
pub use registration::{
    register, Binding, I2cBinding, I2cPrimitives, NoteLibrary, Platform, Registered, SerialBinding,
    SerialPrimitives,
};
pub use serial::SerialTransport;
pub use signal::{BusEvent, Completion, CompletionSignal, Idle, SpinIdle};

/// Lifecycle of a transport's underlying peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// `reset()` has not succeeded yet (or the last re-init failed)
    Uninitialized,
    /// Peripheral initialized and usable
    Ready,
}
