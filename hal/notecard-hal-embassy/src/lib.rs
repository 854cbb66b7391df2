//! Embassy-side adapters for the Notecard transports
//!
//! Binds the `notecard-hal` traits to any blocking driver implementing the
//! `embedded-hal` / `embedded-io` traits (embassy-rp, embassy-stm32,
//! embassy-nrf, ...), and provides the target-side pieces of the timing model:
//!
//! - [`uart::IoUart`] - `UartDriver` over an `embedded_io` serial port
//! - [`i2c::HalI2c`] - `I2cBus` over an `embedded_hal::i2c::I2c` bus
//! - [`idle::WaitForEvent`] - low-power completion wait (`wfe; sev; wfe`)
//! - [`time`] - clock tick loop, blocking delay and [`Platform`] assembly
//!
//! Drivers are rebuilt from an `open` closure on every transport reset, so
//! a reset really tears the peripheral down instead of clearing flags.
//!
//! [`Platform`]: notecard_transport::Platform

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod i2c;
pub mod idle;
pub mod time;
pub mod uart;

pub use i2c::{HalI2c, I2cBusError};
pub use idle::WaitForEvent;
pub use uart::{IoUart, UartBusError};
