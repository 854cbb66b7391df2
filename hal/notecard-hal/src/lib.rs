//! Notecard Hardware Abstraction Layer
//!
//! This crate defines the peripheral traits the Notecard transports are
//! written against. Chip- or runtime-specific crates implement them, so the
//! same transport code runs on any host MCU (and against mocks on the host).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Notecard request/response library      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  notecard-transport (serial / i2c)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  notecard-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  notecard-hal-embassy (adapters)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`], [`uart::UartDriver`] - Serial link
//! - [`i2c::I2cBus`] - I2C master with explicit init/teardown

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use i2c::{I2cBus, I2cConfig};
pub use uart::{UartConfig, UartDriver, UartRx, UartTx};
