//! Coarse millisecond clock used for Notecard I/O timeout detection
//!
//! A periodic timer interrupt calls [`MillisClock::tick`]; everything else
//! reads [`MillisClock::now`] and measures intervals as differences of two
//! reads. The counter is a `u32` and wraps after ~49.7 days, so callers must
//! never treat it as an absolute epoch.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::TICK_MS;

/// Tick-driven millisecond counter
///
/// Safe to share as a `static` between the tick interrupt and the
/// foreground loop: `tick` is a single lock-free atomic add.
#[derive(Debug)]
pub struct MillisClock {
    elapsed_ms: AtomicU32,
    period_ms: u32,
}

impl Default for MillisClock {
    fn default() -> Self {
        Self::new(TICK_MS)
    }
}

impl MillisClock {
    /// Create a clock advanced by `period_ms` per tick
    pub const fn new(period_ms: u32) -> Self {
        Self::starting_at(0, period_ms)
    }

    /// Create a clock whose counter starts at `offset_ms`
    ///
    /// Mostly useful for exercising wraparound.
    pub const fn starting_at(offset_ms: u32, period_ms: u32) -> Self {
        Self {
            elapsed_ms: AtomicU32::new(offset_ms),
            period_ms,
        }
    }

    /// Advance by one period. Called from the timer interrupt.
    pub fn tick(&self) {
        self.elapsed_ms.fetch_add(self.period_ms, Ordering::Release);
    }

    /// Milliseconds since start, wrapping
    pub fn now(&self) -> u32 {
        self.elapsed_ms.load(Ordering::Acquire)
    }

    /// Milliseconds elapsed since an earlier `now()` reading
    ///
    /// Correct across wraparound as long as the interval is shorter than
    /// the wrap period.
    pub fn since(&self, earlier: u32) -> u32 {
        self.now().wrapping_sub(earlier)
    }

    /// Tick period in milliseconds
    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Start a deadline `timeout_ms` from now
    pub fn deadline(&self, timeout_ms: u32) -> Deadline<'_> {
        Deadline {
            clock: self,
            start: self.now(),
            timeout_ms,
        }
    }
}

/// A timeout measured against a [`MillisClock`]
#[derive(Debug, Clone, Copy)]
pub struct Deadline<'a> {
    clock: &'a MillisClock,
    start: u32,
    timeout_ms: u32,
}

impl Deadline<'_> {
    /// Whether the timeout has fully elapsed
    pub fn expired(&self) -> bool {
        self.clock.since(self.start) >= self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_zero() {
        let clock = MillisClock::default();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.period_ms(), TICK_MS);
    }

    #[test]
    fn test_ticks_accumulate_period() {
        let clock = MillisClock::new(100);
        for _ in 0..25 {
            clock.tick();
        }
        assert_eq!(clock.now(), 2500);
    }

    #[test]
    fn test_elapsed_across_wraparound() {
        let clock = MillisClock::starting_at(u32::MAX - 150, 100);
        let start = clock.now();

        clock.tick();
        clock.tick();

        // Counter wrapped past zero
        assert!(clock.now() < start);
        assert_eq!(clock.now(), 49);
        assert_eq!(clock.since(start), 200);
    }

    #[test]
    fn test_deadline_expires_after_timeout() {
        let clock = MillisClock::new(100);
        let deadline = clock.deadline(250);

        clock.tick();
        clock.tick();
        assert!(!deadline.expired());

        clock.tick();
        assert!(deadline.expired());
    }

    #[test]
    fn test_tick_from_other_thread() {
        static CLOCK: MillisClock = MillisClock::new(TICK_MS);

        let handle = std::thread::spawn(|| {
            for _ in 0..10 {
                CLOCK.tick();
            }
        });
        handle.join().unwrap();

        assert_eq!(CLOCK.now(), 10 * TICK_MS);
    }

    proptest! {
        #[test]
        fn prop_now_is_ticks_times_period(n in 0u32..10_000, period in 1u32..1_000) {
            let clock = MillisClock::new(period);
            for _ in 0..n {
                clock.tick();
            }
            prop_assert_eq!(clock.now(), n.wrapping_mul(period));
        }

        #[test]
        fn prop_since_survives_wrap(offset: u32, ticks in 0u32..1_000) {
            let clock = MillisClock::starting_at(offset, TICK_MS);
            let start = clock.now();
            for _ in 0..ticks {
                clock.tick();
            }
            prop_assert_eq!(clock.since(start), ticks * TICK_MS);
        }
    }
}
