//! Low-power completion wait for Cortex-M

use notecard_transport::Idle;

/// Sleep until any event while a transfer is outstanding
///
/// `wfe; sev; wfe`: the first `wfe` sleeps (or consumes an event latched
/// before the check), `sev` + `wfe` clears the event register so the next
/// round starts clean. An interrupt that fires between the completion check
/// and the first `wfe` latches an event, so the wakeup is not lost.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaitForEvent;

impl Idle for WaitForEvent {
    fn idle(&mut self) {
        cortex_m::asm::wfe();
        cortex_m::asm::sev();
        cortex_m::asm::wfe();
    }
}
