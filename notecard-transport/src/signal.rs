//! Transfer-completion signalling
//!
//! Interrupt-driven bus peripherals return from `write`/`read` as soon as the
//! transfer is queued and report the end of it from their event handler. The
//! transports turn that into the blocking contract the library expects:
//!
//! 1. [`CompletionSignal::arm`] clears the flag *before* the transfer is issued
//! 2. the driver's event handler calls [`CompletionSignal::on_event`]
//! 3. the transport spins on the flag through an [`Idle`] strategy
//!
//! Arming before issuing guarantees a completion can never be observed from
//! a previous transfer, and that one raised between the issue and the first
//! check is not lost.

use portable_atomic::{AtomicBool, Ordering};

use crate::clock::MillisClock;
use crate::error::TransportError;

/// Events reported by a bus driver's interrupt handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Transfer finished
    Done,
    /// Address byte not acknowledged
    AddressNack,
    /// Data byte not acknowledged
    DataNack,
}

/// Single-writer (ISR) / single-reader (foreground) completion flag
#[derive(Debug)]
pub struct CompletionSignal {
    done: AtomicBool,
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionSignal {
    /// Create a signal in the not-completed state
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
        }
    }

    /// Clear the flag. Must happen before the next transfer is issued.
    pub fn arm(&self) {
        self.done.store(false, Ordering::Release);
    }

    /// Mark the current transfer complete (interrupt side)
    pub fn complete(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// Feed a driver event; anything but [`BusEvent::Done`] is ignored
    pub fn on_event(&self, event: BusEvent) {
        if event == BusEvent::Done {
            self.complete();
        }
    }

    /// Whether the current transfer has completed
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Block until the transfer completes
    ///
    /// `idle` runs between checks. Without a `limit` the wait is unbounded.
    pub fn wait<I: Idle>(
        &self,
        idle: &mut I,
        limit: Option<WaitLimit<'_>>,
    ) -> Result<(), TransportError> {
        let deadline = limit.map(|l| l.clock.deadline(l.timeout_ms));
        while !self.is_complete() {
            if deadline.as_ref().is_some_and(|d| d.expired()) {
                return Err(TransportError::CompletionTimeout);
            }
            idle.idle();
        }
        Ok(())
    }
}

/// What to do while waiting for a completion
pub trait Idle {
    /// Called once per unsuccessful check of the completion flag
    fn idle(&mut self);
}

/// Busy spin with a CPU relax hint
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinIdle;

impl Idle for SpinIdle {
    fn idle(&mut self) {
        core::hint::spin_loop();
    }
}

impl<F: FnMut()> Idle for F {
    fn idle(&mut self) {
        self()
    }
}

/// Upper bound on a completion wait
#[derive(Debug, Clone, Copy)]
pub struct WaitLimit<'a> {
    clock: &'a MillisClock,
    timeout_ms: u32,
}

/// How a transport learns that a bus transfer has finished
#[derive(Debug, Clone, Copy)]
pub enum Completion<'a> {
    /// Driver calls return once the transfer is done
    Synchronous,
    /// Driver calls return early; the interrupt handler sets `signal`
    Interrupt {
        signal: &'a CompletionSignal,
        limit: Option<WaitLimit<'a>>,
    },
}

impl Default for Completion<'_> {
    fn default() -> Self {
        Self::Synchronous
    }
}

impl<'a> Completion<'a> {
    /// Interrupt-driven completion with an unbounded wait
    pub const fn interrupt(signal: &'a CompletionSignal) -> Self {
        Self::Interrupt {
            signal,
            limit: None,
        }
    }

    /// Bound interrupt waits to `timeout_ms` on `clock`
    ///
    /// Has no effect on [`Completion::Synchronous`].
    pub fn with_timeout(self, clock: &'a MillisClock, timeout_ms: u32) -> Self {
        match self {
            Self::Synchronous => Self::Synchronous,
            Self::Interrupt { signal, .. } => Self::Interrupt {
                signal,
                limit: Some(WaitLimit { clock, timeout_ms }),
            },
        }
    }

    /// Prepare for a transfer that is about to be issued
    pub(crate) fn arm(&self) {
        if let Self::Interrupt { signal, .. } = self {
            signal.arm();
        }
    }

    /// Wait for the transfer issued after the last `arm`
    pub(crate) fn wait<I: Idle>(&self, idle: &mut I) -> Result<(), TransportError> {
        match self {
            Self::Synchronous => Ok(()),
            Self::Interrupt { signal, limit } => signal.wait(idle, *limit),
        }
    }
}
