//! Mock implementations for testing
//!
//! This module provides mock implementations of the HAL traits for use in
//! unit and integration tests of the time base, the melody sequencer and
//! the application collaborators.

#![cfg(any(test, feature = "std"))]

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::{ClockSource, MainClock, MatchChannel, MatchFlags, TickTimer, ToneTimer, ToneTimerSetup};

// ─── Tick timer ─────────────────────────────────────────────────────────────

/// Mock millisecond timer.
///
/// All state is atomic so a single instance can be shared between a test's
/// "foreground" thread and a thread playing the interrupt handler.
///
/// Every [`TickTimer::counter`] read while running returns the current value
/// and then advances it by the configured step (default 1), so a polling
/// loop sees time pass without a real clock.
pub struct MockTickTimer {
    counter: AtomicU32,
    step: AtomicU32,
    running: AtomicBool,
    prescale: AtomicU32,
    compare: AtomicU32,
    compare_armed: AtomicBool,
    flags: AtomicU8,
    irq_enabled: AtomicBool,
    pending_clears: AtomicU32,
    restarts: AtomicU32,
    halt_after_reads: AtomicU32,
}

impl MockTickTimer {
    /// Create a stopped timer that will advance by one count per read.
    pub const fn new() -> Self {
        Self::with_step(1)
    }

    /// Create a stopped timer that advances by `step` counts per read.
    ///
    /// A step of 0 freezes time.
    pub const fn with_step(step: u32) -> Self {
        Self {
            counter: AtomicU32::new(0),
            step: AtomicU32::new(step),
            running: AtomicBool::new(false),
            prescale: AtomicU32::new(0),
            compare: AtomicU32::new(0),
            compare_armed: AtomicBool::new(false),
            flags: AtomicU8::new(0),
            irq_enabled: AtomicBool::new(false),
            pending_clears: AtomicU32::new(0),
            restarts: AtomicU32::new(0),
            halt_after_reads: AtomicU32::new(0),
        }
    }

    /// Create a timer that is already running at `prescale`.
    pub fn running(step: u32, prescale: u32) -> Self {
        let timer = Self::with_step(step);
        timer.restart(prescale);
        timer
    }

    /// Change the per-read advance.
    pub fn set_step(&self, step: u32) {
        self.step.store(step, Ordering::SeqCst);
    }

    /// Move the counter forward by `counts`, as if time had passed.
    pub fn advance(&self, counts: u32) {
        let now = self.counter.load(Ordering::SeqCst);
        self.counter.store(now.wrapping_add(counts), Ordering::SeqCst);
    }

    /// Overwrite the counter.
    pub fn set_counter(&self, value: u32) {
        self.counter.store(value, Ordering::SeqCst);
    }

    /// Stop the counter, as the power code does before deep sleep.
    pub fn halt(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Stop the counter after `reads` more counter reads.
    pub fn halt_after_reads(&self, reads: u32) {
        self.halt_after_reads.store(reads, Ordering::SeqCst);
    }

    /// Latch the MR0 flag as the hardware would on a compare match.
    ///
    /// Returns `true` if the interrupt is enabled, i.e. if the handler
    /// should now run.
    pub fn fire_compare(&self) -> bool {
        self.flags.fetch_or(MatchFlags::MR0.bits(), Ordering::SeqCst);
        self.irq_enabled.load(Ordering::SeqCst)
    }

    /// Last value written to MR0, if any.
    pub fn compare(&self) -> Option<u32> {
        self.compare_armed
            .load(Ordering::SeqCst)
            .then(|| self.compare.load(Ordering::SeqCst))
    }

    /// Last prescale passed to [`TickTimer::restart`].
    pub fn prescale(&self) -> u32 {
        self.prescale.load(Ordering::SeqCst)
    }

    /// Number of [`TickTimer::restart`] calls.
    pub fn restarts(&self) -> u32 {
        self.restarts.load(Ordering::SeqCst)
    }

    /// Number of pending-interrupt clears.
    pub fn pending_clears(&self) -> u32 {
        self.pending_clears.load(Ordering::SeqCst)
    }

    /// `true` while the interrupt is enabled.
    pub fn irq_enabled(&self) -> bool {
        self.irq_enabled.load(Ordering::SeqCst)
    }

    /// Latched flags, without clearing them.
    pub fn peek_flags(&self) -> MatchFlags {
        MatchFlags::from_bits(self.flags.load(Ordering::SeqCst))
    }
}

impl Default for MockTickTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TickTimer for MockTickTimer {
    fn restart(&self, prescale: u32) {
        self.prescale.store(prescale, Ordering::SeqCst);
        self.counter.store(0, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        self.restarts.fetch_add(1, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn counter(&self) -> u32 {
        let now = self.counter.load(Ordering::SeqCst);
        if self.running.load(Ordering::SeqCst) {
            self.advance(self.step.load(Ordering::SeqCst));
            let left = self.halt_after_reads.load(Ordering::SeqCst);
            if left == 1 {
                self.halt();
            }
            self.halt_after_reads
                .store(left.saturating_sub(1), Ordering::SeqCst);
        }
        now
    }

    fn arm_compare(&self, compare: u32) {
        self.compare.store(compare, Ordering::SeqCst);
        self.compare_armed.store(true, Ordering::SeqCst);
    }

    fn take_flags(&self) -> MatchFlags {
        MatchFlags::from_bits(self.flags.swap(0, Ordering::SeqCst))
    }

    fn clear_pending_irq(&self) {
        self.pending_clears.fetch_add(1, Ordering::SeqCst);
    }

    fn set_irq_enabled(&self, enabled: bool) {
        self.irq_enabled.store(enabled, Ordering::SeqCst);
    }
}

// ─── Tone timer ─────────────────────────────────────────────────────────────

/// Mock tone counter/timer.
///
/// Records the last wiring, the four match registers and start/stop
/// activity. Tests latch match flags with [`MockToneTimer::latch`] and then
/// call the sequencer's interrupt entry point.
#[derive(Debug, Default)]
pub struct MockToneTimer {
    setup: Option<ToneTimerSetup>,
    matches: [u32; 4],
    running: bool,
    irq_enabled: bool,
    flags: MatchFlags,
    configures: u32,
    restarts: u32,
    halts: u32,
}

impl MockToneTimer {
    /// Create an unconfigured, stopped timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch `flags` into the interrupt register.
    pub fn latch(&mut self, flags: MatchFlags) {
        self.flags = self.flags | flags;
    }

    /// Last wiring applied with [`ToneTimer::configure`].
    pub fn setup(&self) -> Option<ToneTimerSetup> {
        self.setup
    }

    /// Number of [`ToneTimer::configure`] calls.
    pub fn configures(&self) -> u32 {
        self.configures
    }

    /// Number of [`ToneTimer::restart`] calls.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Number of [`ToneTimer::halt`] calls.
    pub fn halts(&self) -> u32 {
        self.halts
    }

    fn slot(&mut self, channel: MatchChannel) -> &mut u32 {
        match channel {
            MatchChannel::Mr0 => &mut self.matches[0],
            MatchChannel::Mr1 => &mut self.matches[1],
            MatchChannel::Mr2 => &mut self.matches[2],
            MatchChannel::Mr3 => &mut self.matches[3],
        }
    }
}

impl ToneTimer for MockToneTimer {
    fn configure(&mut self, setup: ToneTimerSetup) {
        self.setup = Some(setup);
        self.running = false;
        self.configures = self.configures.saturating_add(1);
    }

    fn set_match(&mut self, channel: MatchChannel, value: u32) {
        *self.slot(channel) = value;
    }

    fn match_value(&self, channel: MatchChannel) -> u32 {
        match channel {
            MatchChannel::Mr0 => self.matches[0],
            MatchChannel::Mr1 => self.matches[1],
            MatchChannel::Mr2 => self.matches[2],
            MatchChannel::Mr3 => self.matches[3],
        }
    }

    fn restart(&mut self) {
        self.running = true;
        self.restarts = self.restarts.saturating_add(1);
    }

    fn halt(&mut self) {
        self.running = false;
        self.halts = self.halts.saturating_add(1);
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn take_flags(&mut self) -> MatchFlags {
        core::mem::take(&mut self.flags)
    }

    fn set_irq_enabled(&mut self, enabled: bool) {
        self.irq_enabled = enabled;
    }

    fn irq_enabled(&self) -> bool {
        self.irq_enabled
    }
}

// ─── Buzzer pin ─────────────────────────────────────────────────────────────

/// Number of writes kept in [`MockPin::history`].
pub const PIN_HISTORY: usize = 256;

/// Mock output pin.
///
/// Counts every write and every level change; the first [`PIN_HISTORY`]
/// written levels are kept in order.
#[derive(Debug, Default)]
pub struct MockPin {
    high: bool,
    writes: u32,
    toggles: u32,
    history: heapless::Vec<bool, PIN_HISTORY>,
}

impl MockPin {
    /// Create a pin driven low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output level.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of level changes so far.
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    /// Number of writes so far.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Written levels, oldest first.
    pub fn history(&self) -> &[bool] {
        &self.history
    }

    /// Forget all recorded activity, keeping the level.
    pub fn clear_history(&mut self) {
        self.writes = 0;
        self.toggles = 0;
        self.history.clear();
    }

    fn drive(&mut self, high: bool) {
        if high != self.high {
            self.toggles = self.toggles.saturating_add(1);
        }
        self.high = high;
        self.writes = self.writes.saturating_add(1);
        // Keep the oldest entries once full
        let _ = self.history.push(high);
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

// ─── Main clock ─────────────────────────────────────────────────────────────

/// Mock main clock selector.
#[derive(Debug)]
pub struct MockMainClock {
    current: ClockSource,
    switches: u32,
}

impl MockMainClock {
    /// Start on `source`.
    pub fn new(source: ClockSource) -> Self {
        Self {
            current: source,
            switches: 0,
        }
    }

    /// Number of [`MainClock::select`] calls.
    pub fn switches(&self) -> u32 {
        self.switches
    }
}

impl Default for MockMainClock {
    fn default() -> Self {
        Self::new(ClockSource::IrcOsc)
    }
}

impl MainClock for MockMainClock {
    fn select(&mut self, source: ClockSource) {
        self.current = source;
        self.switches = self.switches.saturating_add(1);
    }

    fn current(&self) -> ClockSource {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_tick_timer_does_not_advance() {
        let timer = MockTickTimer::new();
        assert_eq!(timer.counter(), 0);
        assert_eq!(timer.counter(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn running_tick_timer_advances_per_read() {
        let timer = MockTickTimer::running(5, 71_999);
        assert_eq!(timer.counter(), 0);
        assert_eq!(timer.counter(), 5);
        assert_eq!(timer.prescale(), 71_999);
    }

    #[test]
    fn tick_timer_halts_after_reads() {
        let timer = MockTickTimer::running(1, 0);
        timer.halt_after_reads(2);
        assert_eq!(timer.counter(), 0);
        assert!(timer.is_running());
        assert_eq!(timer.counter(), 1);
        assert!(!timer.is_running(), "second read should halt the counter");
        assert_eq!(timer.counter(), 2);
        assert_eq!(timer.counter(), 2);
    }

    #[test]
    fn take_flags_clears_latched_compare() {
        let timer = MockTickTimer::new();
        timer.set_irq_enabled(true);
        assert!(timer.fire_compare());
        assert_eq!(timer.take_flags(), MatchFlags::MR0);
        assert!(timer.take_flags().is_empty());
    }

    #[test]
    fn tone_timer_records_match_registers() {
        let mut timer = MockToneTimer::new();
        timer.set_match(MatchChannel::Mr2, 10);
        timer.set_match(MatchChannel::Mr3, 20);
        assert_eq!(timer.match_value(MatchChannel::Mr2), 10);
        assert_eq!(timer.match_value(MatchChannel::Mr3), 20);
        assert_eq!(timer.match_value(MatchChannel::Mr0), 0);
    }

    #[test]
    fn pin_counts_level_changes_only() {
        let mut pin = MockPin::new();
        pin.set_low().ok();
        pin.set_high().ok();
        pin.set_high().ok();
        pin.set_low().ok();
        assert_eq!(pin.writes(), 4);
        assert_eq!(pin.toggles(), 2);
        assert_eq!(pin.history(), &[false, true, true, false]);
    }

    #[test]
    fn clock_counts_switches() {
        let mut clock = MockMainClock::default();
        clock.select(ClockSource::PllOut);
        assert_eq!(clock.current(), ClockSource::PllOut);
        assert_eq!(clock.switches(), 1);
    }
}
