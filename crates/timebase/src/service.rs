//! The tick service proper.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use tracer_hal::TickTimer;

use crate::{SOFTWARE_LOOPS_PER_MS, TICKS_PER_SECOND, WAIT_FOREVER};

/// One-shot callback run from the tick interrupt.
///
/// The callback receives the service so it can cancel a wait or re-arm
/// itself with [`TickService::schedule_once`].
pub type WakeCallback<T> = fn(&TickService<T>);

/// How a [`TickService::wait`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    /// The full duration passed.
    Elapsed,
    /// [`TickService::cancel`] was called before the duration passed.
    Cancelled,
}

/// Millisecond time base over a [`TickTimer`].
pub struct TickService<T> {
    timer: T,
    cancel_requested: AtomicBool,
    callback: Mutex<Cell<Option<WakeCallback<T>>>>,
    loops_per_ms: u32,
}

impl<T: TickTimer> TickService<T> {
    /// Wrap `timer`. The counter is not started; call [`Self::restart`]
    /// once the main clock is configured.
    pub const fn new(timer: T) -> Self {
        Self::with_software_calibration(timer, SOFTWARE_LOOPS_PER_MS)
    }

    /// Wrap `timer` with a custom busy-loop calibration, for parts running
    /// the core at something other than 72 MHz while the counter is off.
    pub const fn with_software_calibration(timer: T, loops_per_ms: u32) -> Self {
        Self {
            timer,
            cancel_requested: AtomicBool::new(false),
            callback: Mutex::new(Cell::new(None)),
            loops_per_ms,
        }
    }

    /// Re-base the counter to zero, prescaled for a main clock of
    /// `main_clock_hz` so that one count is one millisecond.
    ///
    /// Must be called after every main clock switch.
    pub fn restart(&self, main_clock_hz: u32) {
        let prescale = (main_clock_hz / TICKS_PER_SECOND).saturating_sub(1);
        self.timer.restart(prescale);
        debug!("tick: restarted at {} Hz, prescale {}", main_clock_hz, prescale);
    }

    /// Milliseconds since the last [`Self::restart`].
    ///
    /// Stale while the counter is stopped.
    pub fn now(&self) -> u32 {
        self.timer.counter()
    }

    /// Milliseconds since `start`, a value previously read from
    /// [`Self::now`]. Correct across a counter wrap.
    pub fn elapsed_since(&self, start: u32) -> u32 {
        self.now().wrapping_sub(start)
    }

    /// Block for `ms` milliseconds or until [`Self::cancel`] is called.
    ///
    /// A cancel issued before this call is forgotten. While the counter is
    /// stopped, or if it stops mid-wait, the remaining time is spent in a
    /// calibrated busy loop. [`WAIT_FOREVER`] only ends through a cancel.
    pub fn wait(&self, ms: u32) -> WaitOutcome {
        self.cancel_requested.store(false, Ordering::SeqCst);

        let mut remaining = ms;
        if self.timer.is_running() {
            let start = self.timer.counter();
            loop {
                if self.cancelled() {
                    return WaitOutcome::Cancelled;
                }
                let elapsed = self.timer.counter().wrapping_sub(start);
                if ms != WAIT_FOREVER && elapsed >= ms {
                    return WaitOutcome::Elapsed;
                }
                if !self.timer.is_running() {
                    if ms != WAIT_FOREVER {
                        remaining = ms.saturating_sub(elapsed);
                    }
                    trace!("tick: counter stopped mid-wait, {} ms left", remaining);
                    break;
                }
                core::hint::spin_loop();
            }
        }
        self.spin_wait(remaining)
    }

    /// End the wait in progress, if any. Safe from interrupt context.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Run `callback` from the tick interrupt `delay_ms` from now (at least
    /// one count). Replaces any callback not yet run.
    pub fn schedule_once(&self, delay_ms: u32, callback: WakeCallback<T>) {
        self.timer.set_irq_enabled(false);
        critical_section::with(|cs| self.callback.borrow(cs).set(Some(callback)));

        // Stale MR0 flag first, then the pending bit, so the new compare
        // cannot fire immediately
        self.timer.take_flags();
        let compare = self.timer.counter().wrapping_add(delay_ms.max(1));
        self.timer.arm_compare(compare);
        self.timer.clear_pending_irq();
        self.timer.set_irq_enabled(true);
        debug!("tick: wake-up armed at {}", compare);
    }

    /// `true` while a callback is registered and has not run yet.
    pub fn has_scheduled(&self) -> bool {
        critical_section::with(|cs| self.callback.borrow(cs).get().is_some())
    }

    /// Tick interrupt body.
    ///
    /// Disables the interrupt, clears the match flag and runs the
    /// registered callback once. The callback runs outside the critical
    /// section and may re-arm.
    pub fn on_interrupt(&self) {
        self.timer.set_irq_enabled(false);
        self.timer.take_flags();
        let callback = critical_section::with(|cs| self.callback.borrow(cs).take());
        if let Some(callback) = callback {
            callback(self);
        }
    }

    /// The underlying timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    fn cancelled(&self) -> bool {
        let cancelled = self.cancel_requested.load(Ordering::SeqCst);
        if cancelled {
            trace!("tick: wait cancelled");
        }
        cancelled
    }

    fn spin_wait(&self, ms: u32) -> WaitOutcome {
        let forever = ms == WAIT_FOREVER;
        let total = u64::from(ms).saturating_mul(u64::from(self.loops_per_ms));
        let mut spun: u64 = 0;
        while forever || spun < total {
            if self.cancelled() {
                return WaitOutcome::Cancelled;
            }
            busy_loop_step();
            spun = spun.wrapping_add(1);
        }
        WaitOutcome::Elapsed
    }
}

/// Ready-made callback that ends the current wait.
///
/// Pairs with [`WAIT_FOREVER`]: schedule it, then wait forever.
pub fn cancel_wait<T: TickTimer>(ticks: &TickService<T>) {
    ticks.cancel();
}

#[inline]
fn busy_loop_step() {
    #[cfg(feature = "hardware")]
    cortex_m::asm::nop();
    #[cfg(not(feature = "hardware"))]
    core::hint::spin_loop();
}
