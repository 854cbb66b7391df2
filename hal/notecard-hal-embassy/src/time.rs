//! Timing glue: clock tick loop, blocking delay, platform hooks
//!
//! The library's millisecond clock is a [`MillisClock`] advanced every
//! `TICK_MS` by [`run_clock`]. Spawn it from an executor task before calling
//! `register`:
//!
//! ```ignore
//! static CLOCK: MillisClock = MillisClock::new(TICK_MS);
//!
//! #[embassy_executor::task]
//! async fn clock_task() {
//!     notecard_hal_embassy::time::run_clock(&CLOCK).await
//! }
//! ```

use core::alloc::GlobalAlloc;

use embassy_time::{block_for, Duration, Ticker};
use notecard_transport::{MillisClock, Platform};

/// Advance `clock` once per period, forever
pub async fn run_clock(clock: &MillisClock) -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("Clock tick every {} ms", clock.period_ms());

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(clock.period_ms())));
    loop {
        ticker.next().await;
        clock.tick();
    }
}

/// Busy-wait delay handed to the library
pub fn delay_ms(ms: u32) {
    block_for(Duration::from_millis(u64::from(ms)));
}

/// Platform hooks with the embassy delay
///
/// `clock` is the one [`run_clock`] is ticking.
pub fn platform(allocator: &'static dyn GlobalAlloc, clock: &'static MillisClock) -> Platform {
    Platform {
        allocator,
        delay_ms,
        clock,
        debug_output: None,
    }
}
