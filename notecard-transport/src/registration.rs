//! Hooking the transports into the Notecard library
//!
//! The library needs, before its first exchange:
//!
//! - platform hooks: an allocator, a blocking delay and a millisecond clock
//! - exactly one transport, either the four serial primitives or the three
//!   I2C primitives plus the card address and maximum chunk size
//!
//! [`register`] does both in that order, then consumes the library and
//! hands back only its exchange surface ([`NoteLibrary::Exchange`]) wrapped
//! in [`Registered`]. The `set_*` methods are unreachable from there, so the
//! transport can be chosen once and never swapped. The transport is picked
//! by the [`Binding`] type, i.e. at compile time.

use core::alloc::GlobalAlloc;
use core::ops::{Deref, DerefMut};

use notecard_hal::{I2cBus, UartDriver};

use crate::clock::MillisClock;
use crate::config::{NOTE_I2C_ADDR_DEFAULT, NOTE_I2C_MAX_DEFAULT};
use crate::error::TransportError;
use crate::i2c::I2cTransport;
use crate::serial::SerialTransport;
use crate::signal::Idle;

/// Platform services the library calls back into
#[derive(Clone, Copy)]
pub struct Platform {
    /// Heap for request/response buffers
    pub allocator: &'static dyn GlobalAlloc,
    /// Block for the given number of milliseconds
    pub delay_ms: fn(u32),
    /// Clock behind the library's millisecond hook
    ///
    /// `'static` because its tick task has to be running, and keep running,
    /// before anything is registered.
    pub clock: &'static MillisClock,
    /// Optional sink for the library's debug trace
    pub debug_output: Option<fn(&str)>,
}

impl Platform {
    /// Monotonic, wrapping milliseconds
    pub fn millis(&self) -> u32 {
        self.clock.now()
    }
}

/// Serial-style transport as the library drives it
pub trait SerialPrimitives {
    /// Tear the port down and bring it back up
    fn reset(&mut self) -> Result<(), TransportError>;

    /// Send `data`, waiting for it to leave the port when `flush` is set
    fn transmit(&mut self, data: &[u8], flush: bool);

    /// Whether a byte is waiting; bounded by a short timeout
    fn available(&mut self) -> bool;

    /// Next received byte, blocking until one arrives
    fn receive(&mut self) -> u8;
}

/// I2C-style transport as the library drives it
pub trait I2cPrimitives {
    /// Tear the bus down and bring it back up
    fn reset(&mut self) -> Result<(), TransportError>;

    /// Send one chunk to the card at `address`
    fn transmit(&mut self, address: u8, data: &[u8]) -> Result<(), TransportError>;

    /// Fill `buffer` with one chunk from the card at `address`
    ///
    /// Returns the card's remaining queued byte count. An empty `buffer` only
    /// queries that count.
    fn receive(&mut self, address: u8, buffer: &mut [u8]) -> Result<u8, TransportError>;
}

impl<U: UartDriver> SerialPrimitives for SerialTransport<U> {
    fn reset(&mut self) -> Result<(), TransportError> {
        SerialTransport::reset(self)
    }

    fn transmit(&mut self, data: &[u8], flush: bool) {
        SerialTransport::transmit(self, data, flush)
    }

    fn available(&mut self) -> bool {
        SerialTransport::available(self)
    }

    fn receive(&mut self) -> u8 {
        SerialTransport::receive(self)
    }
}

impl<B: I2cBus, I: Idle, const N: usize> I2cPrimitives for I2cTransport<'_, B, I, N> {
    fn reset(&mut self) -> Result<(), TransportError> {
        I2cTransport::reset(self)
    }

    fn transmit(&mut self, address: u8, data: &[u8]) -> Result<(), TransportError> {
        I2cTransport::transmit(self, address, data)
    }

    fn receive(&mut self, address: u8, buffer: &mut [u8]) -> Result<u8, TransportError> {
        I2cTransport::receive(self, address, buffer)
    }
}

/// Registration surface of the Notecard request/response library
pub trait NoteLibrary {
    /// What the library offers once registration is closed
    ///
    /// Must not lead back to the `set_*` methods.
    type Exchange;

    /// Install allocator, delay and clock hooks
    fn set_platform(&mut self, platform: Platform);

    /// Use a serial transport
    fn set_serial<T: SerialPrimitives + 'static>(&mut self, transport: T);

    /// Use an I2C transport talking to `address` in chunks of at most
    /// `max_transfer` bytes
    fn set_i2c<T: I2cPrimitives + 'static>(&mut self, address: u8, max_transfer: u8, transport: T);

    /// Install a sink for debug output
    fn set_debug_output(&mut self, _sink: fn(&str)) {}

    /// Close registration
    fn into_exchange(self) -> Self::Exchange;
}

/// A transport ready to be handed to the library
pub trait Binding {
    /// Install the transport through the matching `set_*` call
    fn bind<L: NoteLibrary>(self, library: &mut L);
}

/// Register a serial transport
#[derive(Debug)]
pub struct SerialBinding<T>(pub T);

impl<T: SerialPrimitives + 'static> Binding for SerialBinding<T> {
    fn bind<L: NoteLibrary>(self, library: &mut L) {
        library.set_serial(self.0);
    }
}

/// Register an I2C transport
#[derive(Debug)]
pub struct I2cBinding<T> {
    pub address: u8,
    pub max_transfer: u8,
    pub transport: T,
}

impl<T> I2cBinding<T> {
    /// Default card address and chunk size
    pub fn new(transport: T) -> Self {
        Self {
            address: NOTE_I2C_ADDR_DEFAULT,
            max_transfer: NOTE_I2C_MAX_DEFAULT,
            transport,
        }
    }
}

impl<'a, B: I2cBus, I: Idle, const N: usize> From<I2cTransport<'a, B, I, N>>
    for I2cBinding<I2cTransport<'a, B, I, N>>
{
    /// Address and chunk size taken from the transport's configuration
    fn from(transport: I2cTransport<'a, B, I, N>) -> Self {
        let config = *transport.config();
        Self {
            address: config.address,
            max_transfer: config.max_chunk,
            transport,
        }
    }
}

impl<T: I2cPrimitives + 'static> Binding for I2cBinding<T> {
    fn bind<L: NoteLibrary>(self, library: &mut L) {
        library.set_i2c(self.address, self.max_transfer, self.transport);
    }
}

/// Exchange surface of a library whose registration is closed
///
/// Only the library's [`NoteLibrary::Exchange`] is reachable, never the
/// registration calls:
///
/// ```compile_fail
/// # use notecard_transport::{
/// #     register, I2cPrimitives, MillisClock, NoteLibrary, Platform, SerialBinding,
/// #     SerialPrimitives, TransportError,
/// # };
/// # static HEAP: std::alloc::System = std::alloc::System;
/// # static CLOCK: MillisClock = MillisClock::new(100);
/// # struct Port;
/// # impl SerialPrimitives for Port {
/// #     fn reset(&mut self) -> Result<(), TransportError> { Ok(()) }
/// #     fn transmit(&mut self, _: &[u8], _: bool) {}
/// #     fn available(&mut self) -> bool { false }
/// #     fn receive(&mut self) -> u8 { 0 }
/// # }
/// # struct Library;
/// # struct Session;
/// # impl NoteLibrary for Library {
/// #     type Exchange = Session;
/// #     fn set_platform(&mut self, _: Platform) {}
/// #     fn set_serial<T: SerialPrimitives + 'static>(&mut self, _: T) {}
/// #     fn set_i2c<T: I2cPrimitives + 'static>(&mut self, _: u8, _: u8, _: T) {}
/// #     fn into_exchange(self) -> Session { Session }
/// # }
/// # let platform = Platform { allocator: &HEAP, delay_ms: |_| {}, clock: &CLOCK, debug_output: None };
/// let mut library = register(Library, platform, SerialBinding(Port));
/// library.set_serial(Port);
/// ```
#[derive(Debug)]
pub struct Registered<E> {
    exchange: E,
}

impl<E> Registered<E> {
    /// Give the exchange surface back, e.g. for shutdown
    pub fn into_inner(self) -> E {
        self.exchange
    }
}

impl<E> Deref for Registered<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.exchange
    }
}

impl<E> DerefMut for Registered<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.exchange
    }
}

/// Hand platform hooks and one transport to the library
///
/// `platform.clock` must already be ticking.
///
/// ```
/// # use notecard_transport::{
/// #     register, I2cPrimitives, MillisClock, NoteLibrary, Platform, SerialBinding,
/// #     SerialPrimitives, TransportError,
/// # };
/// # static HEAP: std::alloc::System = std::alloc::System;
/// # struct Port;
/// # impl SerialPrimitives for Port {
/// #     fn reset(&mut self) -> Result<(), TransportError> { Ok(()) }
/// #     fn transmit(&mut self, _: &[u8], _: bool) {}
/// #     fn available(&mut self) -> bool { false }
/// #     fn receive(&mut self) -> u8 { 0 }
/// # }
/// # struct Library;
/// # struct Session;
/// # impl Session { fn request(&mut self, _: &str) {} }
/// # impl NoteLibrary for Library {
/// #     type Exchange = Session;
/// #     fn set_platform(&mut self, _: Platform) {}
/// #     fn set_serial<T: SerialPrimitives + 'static>(&mut self, _: T) {}
/// #     fn set_i2c<T: I2cPrimitives + 'static>(&mut self, _: u8, _: u8, _: T) {}
/// #     fn into_exchange(self) -> Session { Session }
/// # }
/// static CLOCK: MillisClock = MillisClock::new(100);
/// // ...spawn the task ticking CLOCK first
///
/// let platform = Platform {
///     allocator: &HEAP,
///     delay_ms: |_| {},
///     clock: &CLOCK,
///     debug_output: None,
/// };
/// let mut notecard = register(Library, platform, SerialBinding(Port));
/// notecard.request("{\"req\":\"card.version\"}");
/// ```
pub fn register<L: NoteLibrary, B: Binding>(
    mut library: L,
    platform: Platform,
    binding: B,
) -> Registered<L::Exchange> {
    library.set_platform(platform);
    if let Some(sink) = platform.debug_output {
        library.set_debug_output(sink);
    }
    binding.bind(&mut library);

    #[cfg(feature = "defmt")]
    defmt::info!("notecard transport registered at {} ms", platform.millis());

    Registered {
        exchange: library.into_exchange(),
    }
}
