//! Periodic wake-up through the one-shot timer.
//!
//! The power code sleeps with `WFI`; the tick interrupt wakes the core
//! every interval. [`on_wakeup`] re-arms itself as long as the interval is
//! nonzero, so setting the interval to 0 stops the cycle after the next
//! wake-up.

use core::sync::atomic::{AtomicU32, Ordering};

use timebase::TickService;
use tracer_hal::TickTimer;

static INTERVAL_MS: AtomicU32 = AtomicU32::new(0);

/// Set the wake-up period in milliseconds; 0 disables re-arming.
pub fn set_wakeup_interval(ms: u32) {
    INTERVAL_MS.store(ms, Ordering::SeqCst);
}

/// Current wake-up period in milliseconds.
pub fn wakeup_interval() -> u32 {
    INTERVAL_MS.load(Ordering::SeqCst)
}

/// Arm the first wake-up `ms` from now and keep re-arming every `ms`.
pub fn start_periodic_wakeup<T: TickTimer>(ticks: &TickService<T>, ms: u32) {
    set_wakeup_interval(ms);
    if ms > 0 {
        ticks.schedule_once(ms, on_wakeup::<T>);
    }
}

/// Tick callback: re-arm for the next period.
pub fn on_wakeup<T: TickTimer>(ticks: &TickService<T>) {
    let interval = wakeup_interval();
    if interval > 0 {
        ticks.schedule_once(interval, on_wakeup::<T>);
    }
    trace!("wakeup: next in {} ms", interval);
}
